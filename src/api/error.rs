//! Errors surfaced by the backend API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Every way a backend call can fail.
///
/// The client never retries or classifies failures further; callers decide
/// what a rejected call means for them.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout or a broken response stream.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Invalid multipart field: {0}")]
    InvalidPart(String),

    #[error("Failed to read upload {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// True when the per-request deadline expired before a response arrived.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }

    /// Status code of a rejected response, if the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}
