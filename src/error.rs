//! Error taxonomy for the environment.
//!
//! Errors fall into two groups:
//! - **Caller errors** (`Validation`, `InvalidAction`, `Env`, `Io`, `Json`):
//!   the caller can fix the input and retry. State is untouched.
//! - **Consistency errors** (`InvalidAssignment`, `Deadlock`): the engine
//!   broke one of its own invariants. The episode must be discarded.

use thiserror::Error;

use crate::env::EnvStatus;
use crate::models::{OpId, Time};
use crate::validation::ValidationError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("instance validation failed with {} error(s): {}", .0.len(), join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("action index {index} is out of range for {len} legal action(s)")]
    InvalidAction { index: usize, len: usize },

    #[error("invalid assignment of {op}: {reason}")]
    InvalidAssignment { op: OpId, reason: String },

    #[error("deadlock at t={clock}: {unscheduled} operation(s) unscheduled but none eligible")]
    Deadlock { clock: Time, unscheduled: usize },

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),
}

/// Errors related to the environment lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("environment is not running (status: {0:?}); call reset() first")]
    NotRunning(EnvStatus),
}

impl Error {
    /// Whether the caller can recover by fixing its input.
    ///
    /// Consistency errors are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidAssignment { .. } | Self::Deadlock { .. }
        )
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
