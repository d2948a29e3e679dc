//! Cycle management
//!
//! This module holds the cycle model, the countdown display, and the tracker
//! state machine that ties them together.

pub mod countdown;
pub mod error;
pub mod model;
pub mod tracker;

pub use countdown::Countdown;
pub use error::{TrackerError, ValidationError};
pub use model::{Cycle, CycleId, CycleStatus, NewCycle, MAX_MINUTES, MIN_MINUTES};
pub use tracker::{CycleTracker, TickOutcome, TrackerSnapshot};
