//! Cycle data model
//!
//! A [`Cycle`] is one timed work session. It starts out running and moves
//! exactly once to either interrupted or finished.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Shortest allowed cycle, in minutes
pub const MIN_MINUTES: u32 = 5;

/// Longest allowed cycle, in minutes
pub const MAX_MINUTES: u32 = 60;

/// Unique cycle identifier, derived from the creation time in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(i64);

impl CycleId {
    /// Wrap a raw millisecond value
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw millisecond value
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a cycle is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    /// Counting down
    Running,
    /// Stopped early by the user
    Interrupted,
    /// Countdown reached zero
    Finished,
}

impl CycleStatus {
    /// Whether no further transition can happen
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Interrupted => "interrupted",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// A validated request to start a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCycle {
    task: String,
    minutes_amount: u32,
}

impl NewCycle {
    /// Validate a task label and duration.
    ///
    /// The label is trimmed; it must be non-empty afterwards. The duration
    /// must lie in `MIN_MINUTES..=MAX_MINUTES`.
    pub fn new(task: &str, minutes_amount: u32) -> Result<Self, ValidationError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(ValidationError::EmptyTask);
        }
        if !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes_amount) {
            return Err(ValidationError::MinutesOutOfRange {
                minutes: minutes_amount,
            });
        }
        Ok(Self {
            task: task.to_string(),
            minutes_amount,
        })
    }

    /// The trimmed task label
    #[must_use]
    pub fn task(&self) -> &str {
        &self.task
    }

    /// The requested duration in minutes
    #[must_use]
    pub const fn minutes_amount(&self) -> u32 {
        self.minutes_amount
    }
}

/// One work session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    /// Unique, monotonically increasing id
    pub id: CycleId,
    /// What the user is working on
    pub task: String,
    /// Duration in minutes, within `MIN_MINUTES..=MAX_MINUTES`
    pub minutes_amount: u32,
    /// When the countdown started
    pub start_date: DateTime<Utc>,
    /// Set when the user stopped the cycle early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupted_date: Option<DateTime<Utc>>,
    /// Set when the countdown reached zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_date: Option<DateTime<Utc>>,
}

impl Cycle {
    pub(crate) fn start(id: CycleId, request: NewCycle, now: DateTime<Utc>) -> Self {
        Self {
            id,
            task: request.task,
            minutes_amount: request.minutes_amount,
            start_date: now,
            interrupted_date: None,
            finished_date: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn status(&self) -> CycleStatus {
        if self.finished_date.is_some() {
            CycleStatus::Finished
        } else if self.interrupted_date.is_some() {
            CycleStatus::Interrupted
        } else {
            CycleStatus::Running
        }
    }

    /// Length of the countdown in seconds
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes_amount) * 60
    }

    /// Whole seconds between the start and `now`, floored and never negative
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        let millis = (now - self.start_date).num_milliseconds();
        u64::try_from(millis / 1000).unwrap_or(0)
    }

    /// When the cycle ended, if it has
    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.finished_date.or(self.interrupted_date)
    }

    /// Seconds spent on the cycle, capped at its planned length; 0 while it
    /// is still running
    #[must_use]
    pub fn focused_seconds(&self) -> u64 {
        self.ended_at()
            .map_or(0, |end| self.elapsed_seconds(end).min(self.total_seconds()))
    }

    /// Record the early stop. Returns false if the cycle already ended.
    pub(crate) fn interrupt(&mut self, now: DateTime<Utc>) -> bool {
        if self.status().is_terminal() {
            return false;
        }
        self.interrupted_date = Some(now);
        true
    }

    /// Record natural completion. Returns false if the cycle already ended.
    pub(crate) fn finish(&mut self, now: DateTime<Utc>) -> bool {
        if self.status().is_terminal() {
            return false;
        }
        self.finished_date = Some(now);
        true
    }
}
