//! Ignite - Pomodoro work-cycle tracker
//!
//! CLI entry point for the Ignite timer.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use ignite::cli::command::HELP;
use ignite::session::SystemClock;
use ignite::{
    Countdown, Cycle, CycleDisplay, CycleRecord, CycleStatus, IgniteConfig, JsonlLogger, Session,
    SessionEvent, SessionHandle, SessionInput, TrackerSnapshot,
};

/// Pomodoro work-cycle tracker
///
/// Name a task, pick a duration between 5 and 60 minutes, and count it down.
/// Every finished or interrupted cycle is appended to a JSONL journal.
#[derive(Parser, Debug)]
#[command(name = "ignite", version, about)]
struct Cli {
    /// Path to the ignite.toml configuration file
    #[arg(long, global = true, default_value = "ignite.toml")]
    config: PathBuf,

    /// Directory for the cycle journal (overrides `log_dir` from ignite.toml)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count down a single cycle; Ctrl-C or typing `stop` interrupts it
    Start {
        /// What you are working on
        #[arg(long, short)]
        task: String,

        /// Cycle length in minutes (5-60, defaults to `default_minutes`)
        #[arg(long, short)]
        minutes: Option<u32>,
    },
    /// Interactive session: start, stop and list cycles from a prompt
    Run,
    /// Show the journal of ended cycles
    History {
        /// Only show the most recent N cycles
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = IgniteConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from '{}'", cli.config.display()))?;
    let log_dir = cli.log_dir.unwrap_or_else(|| config.log_dir.clone());
    let logger = JsonlLogger::new(&log_dir).context("Failed to initialize JSONL logger")?;
    let display = CycleDisplay::new(config.bell);

    match cli.command {
        Command::Start { task, minutes } => {
            let minutes = minutes.unwrap_or(config.default_minutes);
            let status = run_single(&config, &logger, &display, &task, minutes).await?;
            if status == CycleStatus::Interrupted {
                std::process::exit(130);
            }
            Ok(())
        }
        Command::Run => run_interactive(&config, &logger, &display).await,
        Command::History { limit } => {
            let records = logger
                .read_all()
                .context("Failed to read the cycle journal")?;
            display.render_history(select_recent(&records, limit));
            Ok(())
        }
    }
}

/// Start the session loop with the configured tick
fn start_session(config: &IgniteConfig) -> SessionHandle {
    let (handle, _join) = Session::new(Arc::new(SystemClock))
        .with_tick_interval(config.tick_interval())
        .start();
    handle
}

/// Count down one cycle until it finishes or is interrupted.
async fn run_single(
    config: &IgniteConfig,
    logger: &JsonlLogger,
    display: &CycleDisplay,
    task: &str,
    minutes: u32,
) -> Result<CycleStatus> {
    let handle = start_session(config);
    let mut events = handle.events();
    let mut snapshots = handle.subscribe();
    let mut input = spawn_stdin_reader();

    handle
        .create_cycle(task, minutes)
        .await
        .context("Failed to start cycle")?;

    let status = loop {
        tokio::select! {
            event = events.recv() => {
                if let Some(status) = handle_event(display, logger, next_event(event)?)? {
                    break status;
                }
            }
            Ok(()) = snapshots.changed() => {
                render_live(display, &snapshots.borrow_and_update(), true);
            }
            _ = tokio::signal::ctrl_c() => {
                handle.interrupt_active_cycle().await?;
            }
            Some(line) = input.recv() => {
                if matches!(
                    SessionInput::parse(&line),
                    Ok(Some(SessionInput::Stop | SessionInput::Quit))
                ) {
                    handle.interrupt_active_cycle().await?;
                }
            }
        }
    };

    handle.shutdown().await?;
    Ok(status)
}

/// Prompt-driven session; runs until `quit`, end of input, or Ctrl-C while idle.
async fn run_interactive(
    config: &IgniteConfig,
    logger: &JsonlLogger,
    display: &CycleDisplay,
) -> Result<()> {
    let handle = start_session(config);
    let mut events = handle.events();
    let mut snapshots = handle.subscribe();
    let mut input = spawn_stdin_reader();

    eprintln!("{HELP}");

    loop {
        tokio::select! {
            event = events.recv() => {
                handle_event(display, logger, next_event(event)?)?;
            }
            Ok(()) = snapshots.changed() => {
                render_live(display, &snapshots.borrow_and_update(), false);
            }
            _ = tokio::signal::ctrl_c() => {
                if handle.interrupt_active_cycle().await?.is_none() {
                    break;
                }
            }
            line = input.recv() => {
                let Some(line) = line else {
                    break;
                };
                match SessionInput::parse(&line) {
                    Ok(Some(SessionInput::Quit)) => break,
                    Ok(Some(command)) => {
                        apply_input(config, display, &handle, command).await?;
                    }
                    Ok(None) => {}
                    Err(e) => display.render_error(&e.to_string()),
                }
            }
        }
    }

    handle.interrupt_active_cycle().await?;
    handle.shutdown().await?;
    while let Ok(event) = events.try_recv() {
        handle_event(display, logger, event)?;
    }
    Ok(())
}

/// Carry out one prompt command against the session
async fn apply_input(
    config: &IgniteConfig,
    display: &CycleDisplay,
    handle: &SessionHandle,
    command: SessionInput,
) -> Result<()> {
    match command {
        SessionInput::Start { minutes, task } => {
            if !handle.can_start_new_cycle(&task) {
                display.render_error("A cycle is already running; type 'stop' first.");
                return Ok(());
            }
            let minutes = minutes.unwrap_or(config.default_minutes);
            if let Err(e) = handle.create_cycle(&task, minutes).await {
                display.render_error(&e.to_string());
            }
        }
        SessionInput::Stop => {
            if handle.interrupt_active_cycle().await?.is_none() {
                display.render_error("No active cycle.");
            }
        }
        SessionInput::List => display.render_cycle_list(&handle.snapshot().cycles),
        SessionInput::Status => {
            let snapshot = handle.snapshot();
            match snapshot.active_cycle() {
                Some(cycle) => eprintln!("  {}", snapshot.countdown.title(&cycle.task)),
                None => eprintln!("  No active cycle."),
            }
        }
        SessionInput::Help => eprintln!("{HELP}"),
        SessionInput::Quit => {}
    }
    Ok(())
}

/// Unwrap a broadcast receive, skipping over lag
fn next_event(received: Result<SessionEvent, RecvError>) -> Result<SessionEvent> {
    match received {
        Ok(event) => Ok(event),
        Err(RecvError::Lagged(skipped)) => {
            bail!("Missed {skipped} session event(s); the display fell behind")
        }
        Err(RecvError::Closed) => bail!("Session ended unexpectedly"),
    }
}

/// Render a transition and journal ended cycles. Returns the terminal status
/// when the event ends a cycle.
fn handle_event(
    display: &CycleDisplay,
    logger: &JsonlLogger,
    event: SessionEvent,
) -> Result<Option<CycleStatus>> {
    let cycle = event.cycle();
    if matches!(event, SessionEvent::Started(_)) {
        display.print_header(cycle);
        display.render_countdown(cycle_countdown(cycle), &cycle.task);
        return Ok(None);
    }

    display.render_outcome(cycle);
    let record = CycleRecord::from_cycle(cycle)?;
    logger
        .append(&record)
        .context("Failed to write to JSONL log")?;
    Ok(Some(cycle.status()))
}

/// Countdown shown right after a cycle starts
fn cycle_countdown(cycle: &Cycle) -> Countdown {
    Countdown::from_seconds(cycle.total_seconds())
}

/// Update the countdown line (when `inline`) and the terminal title
fn render_live(display: &CycleDisplay, snapshot: &TrackerSnapshot, inline: bool) {
    let Some(cycle) = snapshot.active_cycle() else {
        return;
    };
    display.set_title(&snapshot.countdown.title(&cycle.task));
    if inline {
        display.render_countdown(snapshot.countdown, &cycle.task);
    }
}

/// Forward stdin lines from a plain thread so a pending read never holds up exit
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// The last `limit` records, or all of them
fn select_recent(records: &[CycleRecord], limit: Option<usize>) -> &[CycleRecord] {
    match limit {
        Some(limit) if limit < records.len() => &records[records.len() - limit..],
        _ => records,
    }
}
