//! Error types for cycle creation and tracker transitions

use thiserror::Error;

use super::model::{CycleId, MAX_MINUTES, MIN_MINUTES};

/// Rejected input to cycle creation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The task label was empty or only whitespace
    #[error("task name cannot be empty")]
    EmptyTask,

    /// The duration fell outside the allowed range
    #[error(
        "minutes amount {minutes} is out of range ({min}..={max})",
        min = MIN_MINUTES,
        max = MAX_MINUTES
    )]
    MinutesOutOfRange {
        /// The rejected value
        minutes: u32,
    },
}

/// Errors returned by [`CycleTracker`](super::tracker::CycleTracker) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// The new cycle request failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A cycle is still counting down
    #[error("cycle {id} is still active; interrupt it before starting another")]
    CycleAlreadyActive {
        /// Id of the cycle that is still running
        id: CycleId,
    },
}
