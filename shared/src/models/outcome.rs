//! Existence verdicts and aggregated sync results

use crate::error::{ErrorKind, SyncError};
use serde::{Deserialize, Serialize};

/// Whether a remote resource matching a record key already exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceVerdict {
    pub exists: bool,
    /// Remote identity to update, when the remote uses its own ids
    pub remote_id: Option<String>,
}

impl ExistenceVerdict {
    pub fn found(remote_id: impl Into<String>) -> Self {
        Self {
            exists: true,
            remote_id: Some(remote_id.into()),
        }
    }

    pub fn missing() -> Self {
        Self {
            exists: false,
            remote_id: None,
        }
    }
}

/// A single record that did not make it to the remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub key: String,
    pub error_kind: ErrorKind,
    pub message: String,
}

/// Overall classification of an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// No failures (including nothing attempted)
    Ok,
    /// Some records succeeded, some failed
    Partial,
    /// At least one record attempted, none succeeded
    Failed,
}

/// Aggregate result of one sync attempt
///
/// `attempted == succeeded + failures.len()` always holds. Failure order is
/// unspecified when records ran concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, key: impl Into<String>, error: &SyncError) {
        self.attempted += 1;
        self.failures.push(SyncFailure {
            key: key.into(),
            error_kind: error.kind(),
            message: error.to_string(),
        });
    }

    pub fn record<T>(&mut self, key: impl Into<String>, result: &Result<T, SyncError>) {
        match result {
            Ok(_) => self.record_success(),
            Err(e) => self.record_failure(key, e),
        }
    }

    /// Fold another outcome into this one
    pub fn merge(&mut self, other: SyncOutcome) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failures.extend(other.failures);
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn status(&self) -> OutcomeStatus {
        if self.failures.is_empty() {
            OutcomeStatus::Ok
        } else if self.succeeded > 0 {
            OutcomeStatus::Partial
        } else {
            OutcomeStatus::Failed
        }
    }

    /// Zero successes with at least one attempted record
    pub fn is_total_failure(&self) -> bool {
        self.attempted > 0 && self.succeeded == 0
    }

    pub fn failures_of(&self, kind: ErrorKind) -> impl Iterator<Item = &SyncFailure> {
        self.failures.iter().filter(move |f| f.error_kind == kind)
    }
}
