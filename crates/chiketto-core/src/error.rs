//! Errors raised while extracting and enriching Jira data

use thiserror::Error;

/// Chiketto errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jira API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed issue {key}: {reason}")]
    Parse { key: String, reason: String },

    #[error("Invalid timestamp '{0}'")]
    Timestamp(String),

    #[error("Invalid config {path}: {reason}")]
    Config { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
