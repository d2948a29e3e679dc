//! Logging and observability
//!
//! This module provides the JSONL journal of ended cycles.

pub mod jsonl;

pub use jsonl::{CycleRecord, JsonlLogger};
