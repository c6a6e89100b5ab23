//! Shapes of the payloads returned by Toggl. Fields the scheduler depends on are required, so a
//! changed payload surfaces as [TogglError::Decode] instead of silently reading as zero.

use serde::Deserialize;

use super::{TogglError, WorkspaceSelector};

const MILLIS_PER_HOUR: f64 = 1000. * 60. * 60.;
const SECONDS_PER_HOUR: f64 = 60. * 60.;

/// Weekly report summary. `total_grand` is in milliseconds and is `null` for an empty week, but
/// the key itself has to be present.
#[derive(Debug, Deserialize)]
pub struct WeeklyReport {
    #[serde(deserialize_with = "Option::deserialize")]
    pub total_grand: Option<f64>,
}

impl WeeklyReport {
    pub fn total_hours(&self) -> f64 {
        self.total_grand.unwrap_or(0.) / MILLIS_PER_HOUR
    }
}

#[derive(Debug, Deserialize)]
pub struct CurrentEntryResponse {
    #[serde(default)]
    pub data: Option<TimeEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TimeEntry {
    #[serde(default)]
    pub pid: Option<u64>,
    /// Seconds. Negative while running, in which case it is `-start` as a unix timestamp.
    pub duration: i64,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.duration < 0
    }

    /// Hours elapsed since the entry started, as of `now_timestamp`. Stopped entries are already
    /// part of the report and contribute nothing.
    pub fn running_hours(&self, now_timestamp: i64) -> f64 {
        if !self.is_running() {
            return 0.;
        }
        ((now_timestamp + self.duration) as f64 / SECONDS_PER_HOUR).max(0.)
    }
}

impl CurrentEntryResponse {
    /// Live hours that count for `selector`. Entries without a project or on a project that isn't
    /// watched render as zero.
    pub fn live_hours(&self, selector: &WorkspaceSelector, now_timestamp: i64) -> f64 {
        match &self.data {
            Some(entry) if entry.pid.is_some_and(|pid| selector.monitors(pid)) => {
                entry.running_hours(now_timestamp)
            }
            _ => 0.,
        }
    }
}

pub fn decode_report(body: &str) -> Result<WeeklyReport, TogglError> {
    serde_json::from_str(body).map_err(|source| TogglError::Decode {
        what: "weekly report",
        source,
    })
}

pub fn decode_current_entry(body: &str) -> Result<CurrentEntryResponse, TogglError> {
    serde_json::from_str(body).map_err(|source| TogglError::Decode {
        what: "current time entry",
        source,
    })
}
