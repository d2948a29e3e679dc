//! Timer configuration parser
//!
//! Parses `ignite.toml` into the defaults used by the CLI. Every key is
//! optional; a missing file means all defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::cycle::{MAX_MINUTES, MIN_MINUTES};

/// Top-level configuration parsed from ignite.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct IgniteConfig {
    /// Cycle length used when `--minutes` is not given (default: 25)
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    /// Period between countdown ticks in milliseconds (default: 1000)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Directory for the cycle journal (default: `.ignite`)
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Ring the terminal bell when a cycle finishes (default: true)
    #[serde(default = "default_bell")]
    pub bell: bool,
}

const fn default_minutes() -> u32 {
    25
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".ignite")
}

const fn default_bell() -> bool {
    true
}

impl Default for IgniteConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
            log_dir: default_log_dir(),
            bell: default_bell(),
        }
    }
}

impl IgniteConfig {
    /// Parse an ignite.toml file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Like [`from_path`](Self::from_path), but a missing file yields defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_path(path)
    }

    /// Parse ignite.toml content from a string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse ignite.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Period between countdown ticks
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if !(MIN_MINUTES..=MAX_MINUTES).contains(&self.default_minutes) {
            bail!(
                "default_minutes must be between {MIN_MINUTES} and {MAX_MINUTES}, got {}",
                self.default_minutes
            );
        }

        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than 0");
        }

        if self.log_dir.as_os_str().is_empty() {
            bail!("log_dir cannot be empty");
        }

        Ok(())
    }
}
