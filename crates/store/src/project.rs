//! Project override loader — reads `.codeward.json` fresh on every call.

use std::path::Path;

use codeward_core::io::{self, RetryPolicy};
use codeward_core::{PROJECT_CONFIG_FILE, ProjectConfig, Result, ValidationError};
use serde::Serialize;
use tracing::debug;

/// Outcome of looking for a project override file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProjectConfigLookup {
    Found { config: ProjectConfig },
    Absent { usage_example: String },
}

impl ProjectConfigLookup {
    pub fn into_config(self) -> Option<ProjectConfig> {
        match self {
            Self::Found { config } => Some(config),
            Self::Absent { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectConfigLoader {
    retry: RetryPolicy,
}

impl ProjectConfigLoader {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Read and validate the override file in `project_dir`, if any.
    pub async fn load(&self, project_dir: &Path) -> Result<Option<ProjectConfig>> {
        let path = project_dir.join(PROJECT_CONFIG_FILE);
        let Some(text) = io::read_optional(&self.retry, &path).await? else {
            debug!(dir = %project_dir.display(), "No project config");
            return Ok(None);
        };

        let config: ProjectConfig = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
        config.validate().map_err(invalid)?;
        debug!(
            profile = config.profile.as_deref().unwrap_or("-"),
            "Project config loaded"
        );
        Ok(Some(config))
    }

    /// Like [`load`](Self::load), but an absent file carries a usage example.
    pub async fn lookup(&self, project_dir: &Path) -> Result<ProjectConfigLookup> {
        Ok(match self.load(project_dir).await? {
            Some(config) => ProjectConfigLookup::Found { config },
            None => ProjectConfigLookup::Absent {
                usage_example: ProjectConfig::usage_example(),
            },
        })
    }
}

fn invalid(reason: String) -> ValidationError {
    ValidationError::ProjectConfig {
        file: PROJECT_CONFIG_FILE.to_string(),
        reason,
    }
}
