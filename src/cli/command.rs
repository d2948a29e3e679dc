//! Interactive session commands
//!
//! Parses the lines typed during `ignite run` (and `stop` during
//! `ignite start`).

use anyhow::{bail, Result};

/// A command typed at the session prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// `start [minutes] <task>`
    Start {
        /// Explicit duration; `None` uses the configured default
        minutes: Option<u32>,
        /// Task label, possibly several words
        task: String,
    },
    /// `stop`: interrupt the active cycle
    Stop,
    /// `list`: show every cycle of this session
    List,
    /// `status`: show the active cycle and its countdown
    Status,
    /// `help`
    Help,
    /// `quit`: interrupt anything active and leave
    Quit,
}

/// Usage text printed by `help`
pub const HELP: &str = "\
commands:
  start [minutes] <task>   start a cycle (5-60 minutes)
  stop                     interrupt the active cycle
  list                     show this session's cycles
  status                   show the active countdown
  help                     show this help
  quit                     leave the session";

impl SessionInput {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(None);
        };

        let input = match word.to_ascii_lowercase().as_str() {
            "start" | "s" => parse_start(rest)?,
            "stop" | "x" => Self::Stop,
            "list" | "ls" => Self::List,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => bail!("Unknown command '{other}'. Type 'help' for a list of commands."),
        };
        Ok(Some(input))
    }
}

/// Split off the first whitespace-delimited word
fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some((&text[..end], text[end..].trim()))
}

fn parse_start(rest: &str) -> Result<SessionInput> {
    let (minutes, task) = match split_word(rest) {
        Some((first, remainder)) => match first.parse::<u32>() {
            Ok(minutes) => (Some(minutes), remainder),
            Err(_) => (None, rest),
        },
        None => (None, rest),
    };

    if task.is_empty() {
        bail!("Usage: start [minutes] <task>");
    }

    Ok(SessionInput::Start {
        minutes,
        task: task.to_string(),
    })
}
