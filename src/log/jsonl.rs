//! JSONL (JSON Lines) journal of ended cycles
//!
//! Provides append-only logging of finished and interrupted cycles to
//! `.ignite/log.jsonl`. The journal is write-only from the tracker's point of
//! view; it is never used to restore state.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use crate::cycle::{Cycle, CycleId, CycleStatus};

/// One ended cycle as written to the journal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleRecord {
    /// Id of the cycle
    pub id: CycleId,
    /// The task label
    pub task: String,
    /// Planned length in minutes
    pub minutes_amount: u32,
    /// When the countdown started
    pub started_at: DateTime<Utc>,
    /// When the cycle was finished or interrupted
    pub ended_at: DateTime<Utc>,
    /// How the cycle ended
    pub status: CycleStatus,
    /// Whole seconds between start and end, capped at the planned length
    pub elapsed_secs: u64,
}

impl CycleRecord {
    /// Build a record from a cycle that has ended.
    ///
    /// # Errors
    /// Returns an error if the cycle is still running.
    pub fn from_cycle(cycle: &Cycle) -> Result<Self> {
        let Some(ended_at) = cycle.ended_at() else {
            bail!("Cycle {} is still running", cycle.id);
        };

        Ok(Self {
            id: cycle.id,
            task: cycle.task.clone(),
            minutes_amount: cycle.minutes_amount,
            started_at: cycle.start_date,
            ended_at,
            status: cycle.status(),
            elapsed_secs: cycle.focused_seconds(),
        })
    }
}

/// JSONL logger for ended cycles
///
/// Provides append-only logging to `.ignite/log.jsonl`.
/// Each line is a JSON object representing a single ended cycle.
pub struct JsonlLogger {
    log_path: PathBuf,
}

impl JsonlLogger {
    /// Create a new JSONL logger
    ///
    /// # Arguments
    /// * `log_dir` - Directory where log.jsonl will be stored (typically `.ignite`)
    ///
    /// # Errors
    /// Returns an error if the log directory cannot be created
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Result<Self> {
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let log_path = log_dir.join("log.jsonl");

        Ok(Self { log_path })
    }

    /// Append an ended cycle to the log
    ///
    /// # Errors
    /// Returns an error if:
    /// - The log file cannot be opened or created
    /// - The record cannot be serialized to JSON
    /// - Writing to the file fails
    pub fn append(&self, record: &CycleRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open log file: {}", self.log_path.display()))?;

        let json =
            serde_json::to_string(record).context("Failed to serialize cycle record to JSON")?;

        writeln!(file, "{json}").context("Failed to write to log file")?;

        Ok(())
    }

    /// Read all records from the log, oldest first
    ///
    /// # Errors
    /// Returns an error if:
    /// - The log file cannot be read
    /// - Any line cannot be parsed as valid JSON
    pub fn read_all(&self) -> Result<Vec<CycleRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.log_path)
            .with_context(|| format!("Failed to read log file: {}", self.log_path.display()))?;

        let mut records = Vec::new();

        for (line_num, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let record: CycleRecord = serde_json::from_str(line)
                .with_context(|| format!("Failed to parse line {} as JSON", line_num + 1))?;

            records.push(record);
        }

        Ok(records)
    }

    /// Get the path to the log file
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
