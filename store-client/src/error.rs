//! Store client error types

use reqwest::StatusCode;
use shared::SyncError;
use shared::error::truncate_body;
use thiserror::Error;

/// Store client error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a status outside the allowlist
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),

    /// URL could not be built from the configured base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Operation not offered by this platform
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl StoreError {
    pub fn status(status: StatusCode, body: &str) -> Self {
        Self::Status {
            status,
            body: truncate_body(body),
        }
    }

    pub fn decode(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode(format!("{context}: {err}"))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(status.as_u16()),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Classify a failure that happened while checking existence
    pub fn into_lookup_error(self) -> SyncError {
        match self {
            Self::Decode(msg) => SyncError::decode(msg),
            other => SyncError::lookup(other.status_code(), other.to_string()),
        }
    }

    /// Classify a failure that happened during create/update
    pub fn into_call_error(self) -> SyncError {
        match self {
            Self::Decode(msg) => SyncError::decode(msg),
            other => SyncError::remote_call(other.status_code(), other.to_string()),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
