//! Partial results for multi-target operations.

use serde::{Deserialize, Serialize};

use storyhub_core::error::{AppError, ErrorKind};
use storyhub_core::result::AppResult;

/// Why one target of a batch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The target as supplied by the caller (author id or email).
    pub target: String,
    /// Failure kind.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub message: String,
}

/// Per-target outcome of a batch operation.
///
/// A failing target never prevents the others from succeeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult<T> {
    /// Targets that were applied.
    pub succeeded: Vec<T>,
    /// Targets that were rejected.
    pub failed: Vec<BatchFailure>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchResult<T> {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rejected target.
    pub fn fail(&mut self, target: impl Into<String>, error: AppError) {
        self.failed.push(BatchFailure {
            target: target.into(),
            kind: error.kind,
            message: error.message,
        });
    }

    /// Record the outcome of one target.
    ///
    /// Domain rejections become per-target failures; infrastructure errors
    /// abort the whole batch.
    pub fn record(&mut self, target: impl Into<String>, outcome: AppResult<T>) -> AppResult<()> {
        match outcome {
            Ok(value) => {
                self.succeeded.push(value);
                Ok(())
            }
            Err(err) if is_target_failure(err.kind) => {
                self.fail(target, err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Whether every target succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

fn is_target_failure(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::BadRequest
            | ErrorKind::NotFound
            | ErrorKind::UnprocessableEntity
            | ErrorKind::AlreadyCollaborator
            | ErrorKind::InvalidSelfOperation
    )
}
