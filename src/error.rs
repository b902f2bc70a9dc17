//! Error types surfaced through store tasks.

use thiserror::Error;

/// Errors observed by a caller awaiting a [`StoreTask`](crate::store::StoreTask).
///
/// Failures are local to the task that produced them: the state owner keeps
/// processing later messages regardless of what a single task reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The reducer returned an error while processing an action.
    #[error("Reducer failed: {message}")]
    ReducerFailure { message: String },

    /// A scheduled effect unit failed or panicked.
    #[error("Effect failed: {message}")]
    EffectFailure { message: String },

    /// The task was cancelled before it completed.
    #[error("Task canceled")]
    Canceled,

    /// The state owner stopped before the task could complete.
    #[error("State owner is no longer running")]
    Disconnected,
}

impl StoreError {
    pub(crate) fn reducer(err: &anyhow::Error) -> Self {
        StoreError::ReducerFailure {
            message: format!("{err:#}"),
        }
    }

    pub(crate) fn effect(message: impl Into<String>) -> Self {
        StoreError::EffectFailure {
            message: message.into(),
        }
    }

    /// Cancellation is expected control flow, not a fault.
    pub fn is_canceled(&self) -> bool {
        matches!(self, StoreError::Canceled)
    }
}
