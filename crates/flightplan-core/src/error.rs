use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a backend round trip
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("could not read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("background task ended unexpectedly: {0}")]
    TaskFailed(String),
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }
}
