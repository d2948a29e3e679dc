//! Terminal display for cycles
//!
//! Renders the countdown, cycle transitions, and history lists.
//! All output goes to stderr so stdout remains clean for piping.

use std::io::Write as IoWrite;

use colored::{ColoredString, Colorize};

use crate::cycle::{Countdown, Cycle, CycleStatus};
use crate::log::CycleRecord;

/// Display handler for a timer session
pub struct CycleDisplay {
    bell: bool,
}

impl CycleDisplay {
    /// Create a display; `bell` rings the terminal bell when a cycle finishes
    #[must_use]
    pub const fn new(bell: bool) -> Self {
        Self { bell }
    }

    /// Print the header when a cycle starts
    pub fn print_header(&self, cycle: &Cycle) {
        eprintln!(
            "\n{} {}",
            "===".bold().red(),
            format!("Cycle: {} ({} min)", cycle.task, cycle.minutes_amount)
                .bold()
                .red()
        );
        eprintln!("{}", "─".repeat(50).dimmed());
    }

    /// Redraw the live countdown line in place
    pub fn render_countdown(&self, countdown: Countdown, task: &str) {
        eprint!("\r  {} {}   ", countdown.to_string().bold(), task.dimmed());
        let _ = std::io::stderr().flush();
    }

    /// Set the terminal window title, e.g. to `24:59 - Write report`
    pub fn set_title(&self, title: &str) {
        eprint!("\x1b]0;{title}\x07");
        let _ = std::io::stderr().flush();
    }

    /// Print how a cycle ended
    pub fn render_outcome(&self, cycle: &Cycle) {
        eprintln!();
        eprintln!("{}", "─".repeat(50).dimmed());
        eprintln!(
            "  {} {} {}",
            status_label(cycle.status()),
            cycle.task.bold(),
            format!("after {}", format_duration(cycle.focused_seconds())).dimmed()
        );
        if self.bell && cycle.status() == CycleStatus::Finished {
            eprint!("\x07");
        }
        eprintln!();
    }

    /// Print a validation or command error without ending the session
    pub fn render_error(&self, message: &str) {
        eprintln!("  {} {}", "✗".red().bold(), message.red());
    }

    /// Print the cycles of the current session, oldest first
    pub fn render_cycle_list(&self, cycles: &[Cycle]) {
        if cycles.is_empty() {
            eprintln!("  {}", "No cycles yet.".dimmed());
            return;
        }
        for cycle in cycles {
            eprintln!(
                "  {} {}",
                status_label(cycle.status()),
                format_cycle_line(cycle)
            );
        }
    }

    /// Print journal records, oldest first
    pub fn render_history(&self, records: &[CycleRecord]) {
        if records.is_empty() {
            eprintln!("  {}", "No cycles logged yet.".dimmed());
            return;
        }
        for record in records {
            eprintln!(
                "  {} {}",
                status_label(record.status),
                format_record_line(record)
            );
        }
        eprintln!("{}", "─".repeat(50).dimmed());
        eprintln!("  {}", format_history_summary(records).dimmed());
    }
}

/// Colored, fixed-width label for a cycle status
fn status_label(status: CycleStatus) -> ColoredString {
    let text = format!("{:<11}", status.to_string().to_uppercase());
    match status {
        CycleStatus::Running => text.cyan().bold(),
        CycleStatus::Finished => text.green().bold(),
        CycleStatus::Interrupted => text.yellow().bold(),
    }
}

/// Format seconds as `Xm Ys`
fn format_duration(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Totals line printed under the history list
fn format_history_summary(records: &[CycleRecord]) -> String {
    let finished = records
        .iter()
        .filter(|r| r.status == CycleStatus::Finished)
        .count();
    let interrupted = records
        .iter()
        .filter(|r| r.status == CycleStatus::Interrupted)
        .count();
    let focused: u64 = records.iter().map(|r| r.elapsed_secs).sum();
    format!(
        "{finished} finished | {interrupted} interrupted | {} focused",
        format_duration(focused)
    )
}

/// One line describing a cycle of the current session
fn format_cycle_line(cycle: &Cycle) -> String {
    format!(
        "{} | {} min | started {}",
        cycle.task,
        cycle.minutes_amount,
        cycle.start_date.format("%H:%M:%S")
    )
}

/// One line describing a journal record
fn format_record_line(record: &CycleRecord) -> String {
    format!(
        "{} | {} min | {} | {}",
        record.task,
        record.minutes_amount,
        record.started_at.format("%Y-%m-%d %H:%M"),
        format_duration(record.elapsed_secs)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleTracker;
    use crate::testutil::{at, t0};

    fn ended_cycles() -> Vec<Cycle> {
        let mut tracker = CycleTracker::new();
        tracker.create_cycle_at("Write report", 5, t0()).unwrap();
        tracker.tick(at(300));
        tracker.create_cycle_at("Review", 25, at(400)).unwrap();
        tracker.interrupt_active_cycle_at(at(475));
        tracker.cycles().to_vec()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m 0s");
        assert_eq!(format_duration(75), "1m 15s");
        assert_eq!(format_duration(1500), "25m 0s");
    }

    #[test]
    fn test_format_cycle_line() {
        let cycles = ended_cycles();
        assert_eq!(
            format_cycle_line(&cycles[0]),
            "Write report | 5 min | started 10:00:00"
        );
    }

    #[test]
    fn test_format_record_line() {
        let cycles = ended_cycles();
        let record = CycleRecord::from_cycle(&cycles[1]).unwrap();
        assert_eq!(
            format_record_line(&record),
            "Review | 25 min | 2026-01-15 10:06 | 1m 15s"
        );
    }

    #[test]
    fn test_format_history_summary() {
        let records: Vec<_> = ended_cycles()
            .iter()
            .map(|c| CycleRecord::from_cycle(c).unwrap())
            .collect();
        assert_eq!(
            format_history_summary(&records),
            "1 finished | 1 interrupted | 6m 15s focused"
        );
    }

    #[test]
    fn test_status_label_is_padded() {
        colored::control::set_override(false);
        assert_eq!(status_label(CycleStatus::Finished).to_string(), "FINISHED   ");
        assert_eq!(
            status_label(CycleStatus::Interrupted).to_string(),
            "INTERRUPTED"
        );
    }

    // Rendering only writes to stderr; make sure no path panics
    #[test]
    fn test_render_all_paths_no_panic() {
        let display = CycleDisplay::new(false);
        let cycles = ended_cycles();

        display.print_header(&cycles[0]);
        display.render_countdown(Countdown::from_seconds(61), "Write report");
        display.set_title("01:01 - Write report");
        display.render_outcome(&cycles[0]);
        display.render_outcome(&cycles[1]);
        display.render_error("task name cannot be empty");
        display.render_cycle_list(&cycles);
        display.render_cycle_list(&[]);

        let records: Vec<_> = cycles
            .iter()
            .map(|c| CycleRecord::from_cycle(c).unwrap())
            .collect();
        display.render_history(&records);
        display.render_history(&[]);
    }
}
