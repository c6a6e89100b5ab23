//! Configuration file handling. The file is YAML with camelCase keys and names a set of
//! workspaces, each pointing at a Toggl client or a set of projects together with a default goal.
//! [Config::resolve] combines the file with command line overrides into [RunSettings].

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    scheduler::goal::GoalSpec,
    toggl::{TogglSettings, WorkspaceSelector, DEFAULT_CURRENT_ENTRY_URL, DEFAULT_REPORTS_URL},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("no workspace selected and no defaultWorkspace configured")]
    NoWorkspace,
    #[error("workspace '{0}' is not defined in the configuration")]
    UnknownWorkspace(String),
    #[error("workspace '{0}' has neither a client nor any projects")]
    EmptyWorkspace(String),
    #[error("basicAuth is empty")]
    MissingCredential,
    #[error("{field} must be a finite number of hours not below 0, got {value}")]
    InvalidHours { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub default_timeout: f64,
    #[serde(default)]
    pub default_workspace: Option<String>,
    pub basic_auth: String,
    pub workspace_id: u64,
    pub user_agent: String,
    #[serde(default)]
    pub reports_url: Option<String>,
    #[serde(default)]
    pub current_entry_url: Option<String>,
    #[serde(default)]
    pub workspaces: BTreeMap<String, WorkspaceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub client: Option<u64>,
    #[serde(default)]
    pub project: Option<u64>,
    #[serde(default)]
    pub projects: Vec<u64>,
    #[serde(default)]
    pub default_goal: f64,
}

/// Values coming from the command line. Anything left as `None` falls back to the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub goal: Option<f64>,
    pub timeout: Option<f64>,
    pub workspace: Option<String>,
    pub split: bool,
}

/// Everything a single run needs. Immutable once resolved.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub workspace_name: String,
    pub goal: GoalSpec,
    pub selector: WorkspaceSelector,
    pub toggl: TogglSettings,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        debug!(?path, workspaces = config.workspaces.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Config, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn resolve(&self, overrides: Overrides) -> Result<RunSettings, ConfigError> {
        let workspace_name = overrides
            .workspace
            .or_else(|| self.default_workspace.clone())
            .ok_or(ConfigError::NoWorkspace)?;
        let workspace = self
            .workspaces
            .get(&workspace_name)
            .ok_or_else(|| ConfigError::UnknownWorkspace(workspace_name.clone()))?;

        let selector = workspace.selector();
        if selector.is_empty() {
            return Err(ConfigError::EmptyWorkspace(workspace_name));
        }

        if self.basic_auth.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }

        let target_hours = overrides.goal.unwrap_or(workspace.default_goal);
        let timeout_hours = overrides.timeout.unwrap_or(self.default_timeout);
        non_negative("goal", target_hours)?;
        non_negative("timeout", timeout_hours)?;

        Ok(RunSettings {
            workspace_name,
            goal: GoalSpec {
                target_hours,
                timeout_hours,
                split: overrides.split,
            },
            selector,
            toggl: TogglSettings {
                basic_auth: self.basic_auth.clone(),
                workspace_id: self.workspace_id,
                user_agent: self.user_agent.clone(),
                reports_url: self
                    .reports_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REPORTS_URL.into()),
                current_entry_url: self
                    .current_entry_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CURRENT_ENTRY_URL.into()),
            },
        })
    }
}

impl WorkspaceConfig {
    /// A single `project` and a `projects` list end up in the same set.
    pub fn selector(&self) -> WorkspaceSelector {
        let mut projects = self.projects.clone();
        if let Some(project) = self.project {
            if !projects.contains(&project) {
                projects.insert(0, project);
            }
        }
        WorkspaceSelector {
            client: self.client,
            projects,
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0. {
        Err(ConfigError::InvalidHours { field, value })
    } else {
        Ok(())
    }
}
