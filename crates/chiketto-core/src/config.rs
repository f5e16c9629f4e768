//! Configuration management for chiketto
//!
//! The config file is optional JSON. Anything it sets can be overridden on
//! the command line. The API token is deliberately not a config field.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::jira::{DEFAULT_TIMEOUT, MAX_PAGE_SIZE};
use crate::output::OutputFormat;
use crate::workflow::Workflow;

/// chiketto configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Jira Cloud host, without `.atlassian.net`
    #[serde(default)]
    pub jira_host: Option<String>,

    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Issues requested per search page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Seconds allowed for each Jira request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Status to category mapping
    #[serde(default)]
    pub workflow: Workflow,
}

fn default_page_size() -> u32 {
    50
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jira_host: None,
            format: OutputFormat::default(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            workflow: Workflow::default(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config.normalized())
    }

    fn normalized(self) -> Self {
        Self {
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
            timeout_secs: self.timeout_secs.max(1),
            workflow: self.workflow.normalized(),
            ..self
        }
    }
}
