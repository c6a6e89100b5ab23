//! Access to the Toggl backend. The scheduler only sees the [TimeReporting] and [ActiveEntries]
//! contracts, [client::TogglClient] is the HTTP implementation of both.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use thiserror::Error;

pub mod client;
pub mod responses;

pub const DEFAULT_REPORTS_URL: &str = "https://toggl.com/reports/api/v2/weekly";
pub const DEFAULT_CURRENT_ENTRY_URL: &str = "https://www.toggl.com/api/v8/time_entries/current";

#[derive(Debug, Error)]
pub enum TogglError {
    #[error("credentials rejected with status {0}")]
    Auth(u16),
    #[error("request failed: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to set up http client: {0}")]
    Setup(String),
}

impl TogglError {
    /// Rejected credentials and a broken client won't fix themselves, everything else is worth
    /// another poll.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TogglError::Auth(_) | TogglError::Setup(_))
    }
}

/// Connection settings shared by both endpoints.
#[derive(Debug, Clone)]
pub struct TogglSettings {
    pub basic_auth: String,
    pub workspace_id: u64,
    pub user_agent: String,
    pub reports_url: String,
    pub current_entry_url: String,
}

/// Identifies which entries count toward a goal. The client id, when present, is what the report
/// is filtered by. Projects are always the set a running entry is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSelector {
    pub client: Option<u64>,
    pub projects: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFilter {
    Client(u64),
    Projects(Vec<u64>),
}

impl WorkspaceSelector {
    pub fn report_filter(&self) -> ReportFilter {
        match self.client {
            Some(client) => ReportFilter::Client(client),
            None => ReportFilter::Projects(self.projects.clone()),
        }
    }

    pub fn monitors(&self, project: u64) -> bool {
        self.projects.contains(&project)
    }

    pub fn is_empty(&self) -> bool {
        self.client.is_none() && self.projects.is_empty()
    }
}

/// Cumulative tracked time for the reporting period.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeReporting: Send + Sync {
    async fn total_hours(
        &self,
        selector: &WorkspaceSelector,
        since: NaiveDate,
    ) -> Result<f64, TogglError>;
}

/// Time contributed by the entry that is running right now, projected to `now`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActiveEntries: Send + Sync {
    async fn running_hours(
        &self,
        selector: &WorkspaceSelector,
        now: DateTime<FixedOffset>,
    ) -> Result<f64, TogglError>;
}

#[cfg(test)]
mod tests {
    use super::{ReportFilter, TogglError, WorkspaceSelector};

    #[test]
    fn test_client_takes_precedence() {
        let selector = WorkspaceSelector {
            client: Some(42),
            projects: vec![1, 2],
        };
        assert_eq!(selector.report_filter(), ReportFilter::Client(42));
        assert!(selector.monitors(2));
        assert!(!selector.monitors(42));
    }

    #[test]
    fn test_projects_filter() {
        let selector = WorkspaceSelector {
            client: None,
            projects: vec![3],
        };
        assert_eq!(selector.report_filter(), ReportFilter::Projects(vec![3]));
        assert!(!selector.is_empty());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(!TogglError::Auth(401).is_recoverable());
        assert!(TogglError::Network("connection reset".into()).is_recoverable());
        assert!(TogglError::Status(404).is_recoverable());
    }
}
