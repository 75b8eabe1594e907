//! Sync error taxonomy
//!
//! Every record-level failure is classified into one of four kinds:
//!
//! - [`ErrorKind::MappingFailure`]: the source data could not be shaped into a record
//! - [`ErrorKind::LookupError`]: the existence check against the remote failed
//! - [`ErrorKind::RemoteCallError`]: create/update was rejected or the transport failed
//! - [`ErrorKind::DecodeError`]: a remote response body could not be parsed
//!
//! Failures never cross record boundaries: one failing record does not
//! abort its siblings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of characters of a remote response body kept for diagnostics
pub const MAX_BODY_CHARS: usize = 512;

/// Failure classification surfaced in a [`crate::SyncOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MappingFailure,
    LookupError,
    RemoteCallError,
    DecodeError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MappingFailure => "mapping_failure",
            Self::LookupError => "lookup_error",
            Self::RemoteCallError => "remote_call_error",
            Self::DecodeError => "decode_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record-level sync error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Source data could not be mapped into a record (never retried)
    #[error("mapping failed: {0}")]
    Mapping(String),

    /// Existence check failed (transport error or unexpected status)
    #[error("existence lookup failed{}: {message}", status_suffix(.status))]
    Lookup {
        status: Option<u16>,
        message: String,
    },

    /// Create/update rejected or transport failure
    #[error("remote call failed{}: {message}", status_suffix(.status))]
    RemoteCall {
        status: Option<u16>,
        message: String,
    },

    /// Remote response body did not have the expected shape
    #[error("failed to decode remote response: {0}")]
    Decode(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}

impl SyncError {
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::Mapping(msg.into())
    }

    pub fn lookup(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Lookup {
            status,
            message: msg.into(),
        }
    }

    pub fn remote_call(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::RemoteCall {
            status,
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Mapping(_) => ErrorKind::MappingFailure,
            Self::Lookup { .. } => ErrorKind::LookupError,
            Self::RemoteCall { .. } => ErrorKind::RemoteCallError,
            Self::Decode(_) => ErrorKind::DecodeError,
        }
    }

    /// HTTP status carried by the error, if the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Lookup { status, .. } | Self::RemoteCall { status, .. } => *status,
            _ => None,
        }
    }
}

/// Truncate a response body to [`MAX_BODY_CHARS`] characters on a char boundary
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
