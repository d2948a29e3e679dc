//! Ignite - Pomodoro work-cycle tracker
//!
//! Ignite tracks named work cycles: each one counts down from a chosen
//! duration and ends either finished or interrupted. The tracker keeps every
//! cycle in memory and drives the active one from a one-second tick.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod cli;
pub mod config;
pub mod cycle;
pub mod log;
pub mod session;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use cli::{CycleDisplay, SessionInput};
pub use config::IgniteConfig;
pub use cycle::{
    Countdown, Cycle, CycleId, CycleStatus, CycleTracker, TickOutcome, TrackerError,
    TrackerSnapshot, ValidationError,
};
pub use log::{CycleRecord, JsonlLogger};
pub use session::{Session, SessionError, SessionEvent, SessionHandle};
