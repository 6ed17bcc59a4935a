// error.rs

use std::time::Duration;
use thiserror::Error;

/// Failure talking to the remote metrics feed. Always caught at the
/// session boundary and turned into a user-visible notice; never
/// reaches the deriver, report, or chart layers.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("server returned status {status}")]
    HttpStatus { status: u16, body: Option<String> },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Maps a reqwest failure into the taxonomy. Timeouts normally come
    /// from the outer `tokio::time::timeout`, but reqwest's own connect
    /// timeout lands here too.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else if err.is_connect() {
            FetchError::NetworkUnreachable(err.to_string())
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::NetworkUnreachable(err.to_string())
        }
    }

    /// True when a plain user-triggered retry has a chance of working.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::NetworkUnreachable(_) => true,
            Self::HttpStatus { status, .. } => matches!(status, 502 | 503 | 504),
            Self::Malformed(_) => false,
            Self::InvalidRequest(_) => false,
        }
    }
}

/// The user has not picked enough of a scope to fetch anything yet.
/// Surfaced as a disabled action, not an exception.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("select a network and an asset before requesting data")]
    MissingSelection,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer error: {0}")]
    CsvBuffer(String),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
