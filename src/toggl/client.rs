use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument};

use crate::utils::time::date_to_query;

use super::{
    responses::{decode_current_entry, decode_report},
    ActiveEntries, ReportFilter, TimeReporting, TogglError, TogglSettings, WorkspaceSelector,
};

/// Upper bound for a single request, so a hanging backend can't stall the scheduler forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to the Toggl reports and time entry endpoints using basic authentication.
pub struct TogglClient {
    client: Client,
    settings: TogglSettings,
}

impl TogglClient {
    pub fn new(settings: TogglSettings) -> Result<Self, TogglError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TogglError::Setup(e.to_string()))?;
        Ok(Self { client, settings })
    }

    async fn get(&self, url: Url) -> Result<String, TogglError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Basic {}", self.settings.basic_auth))
            .send()
            .await
            .map_err(|e| TogglError::Network(e.to_string()))?;

        check_status(response.status())?;

        response
            .text()
            .await
            .map_err(|e| TogglError::Network(e.to_string()))
    }
}

fn check_status(status: StatusCode) -> Result<(), TogglError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(TogglError::Auth(status.as_u16()));
    }
    if status.is_server_error() {
        return Err(TogglError::Network(format!("server error {status}")));
    }
    if !status.is_success() {
        return Err(TogglError::Status(status.as_u16()));
    }
    Ok(())
}

/// Builds the weekly report query. A client filter wins over projects.
pub fn report_url(
    settings: &TogglSettings,
    selector: &WorkspaceSelector,
    since: NaiveDate,
) -> Result<Url, TogglError> {
    let mut params = vec![
        ("workspace_id", settings.workspace_id.to_string()),
        ("user_agent", settings.user_agent.clone()),
        ("since", date_to_query(since)),
    ];
    match selector.report_filter() {
        ReportFilter::Client(client) => params.push(("client_ids", client.to_string())),
        ReportFilter::Projects(projects) => params.push((
            "project_ids",
            projects
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )),
    }
    Url::parse_with_params(&settings.reports_url, &params)
        .map_err(|e| TogglError::Setup(format!("invalid reports url: {e}")))
}

#[async_trait]
impl TimeReporting for TogglClient {
    #[instrument(skip(self, selector))]
    async fn total_hours(
        &self,
        selector: &WorkspaceSelector,
        since: NaiveDate,
    ) -> Result<f64, TogglError> {
        let url = report_url(&self.settings, selector, since)?;
        let body = self.get(url).await?;
        let hours = decode_report(&body)?.total_hours();
        debug!(hours, "Fetched weekly report");
        Ok(hours)
    }
}

#[async_trait]
impl ActiveEntries for TogglClient {
    #[instrument(skip(self, selector))]
    async fn running_hours(
        &self,
        selector: &WorkspaceSelector,
        now: DateTime<FixedOffset>,
    ) -> Result<f64, TogglError> {
        let url = Url::parse(&self.settings.current_entry_url)
            .map_err(|e| TogglError::Setup(format!("invalid current entry url: {e}")))?;
        let body = self.get(url).await?;
        let hours = decode_current_entry(&body)?.live_hours(selector, now.timestamp());
        debug!(hours, "Fetched current time entry");
        Ok(hours)
    }
}
