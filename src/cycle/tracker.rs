//! Cycle tracker
//!
//! Owns the append-only list of cycles and the id of the one currently
//! counting down. All time-dependent operations take `now` explicitly so the
//! state machine can be driven by any clock; `create_cycle` and
//! `interrupt_active_cycle` read the system clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::countdown::Countdown;
use super::error::TrackerError;
use super::model::{Cycle, CycleId, NewCycle};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No cycle was active; nothing changed
    Idle,
    /// The active cycle is still counting down
    Running {
        /// Whole seconds since the cycle started
        elapsed: u64,
        /// Time left on the countdown
        remaining: Countdown,
    },
    /// The active cycle reached zero and is now finished
    Finished {
        /// Id of the cycle that finished
        id: CycleId,
    },
}

/// Point-in-time copy of the tracker state, handed to observers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    /// Every cycle so far, oldest first
    pub cycles: Vec<Cycle>,
    /// The cycle counting down, if any
    pub active_cycle_id: Option<CycleId>,
    /// Seconds elapsed on the active cycle as of the last tick
    pub amount_seconds_passed: u64,
    /// Remaining time on the active cycle, `00:00` when idle
    pub countdown: Countdown,
}

impl TrackerSnapshot {
    /// The active cycle, if any
    #[must_use]
    pub fn active_cycle(&self) -> Option<&Cycle> {
        let id = self.active_cycle_id?;
        self.cycles.iter().rev().find(|c| c.id == id)
    }

    /// Whether a new cycle may be started for the given task input
    #[must_use]
    pub fn can_start_new_cycle(&self, task_input: &str) -> bool {
        self.active_cycle_id.is_none() && !task_input.trim().is_empty()
    }
}

/// State owner for work cycles
#[derive(Debug, Clone, Default)]
pub struct CycleTracker {
    cycles: Vec<Cycle>,
    active_cycle_id: Option<CycleId>,
    amount_seconds_passed: u64,
    last_seen: Option<DateTime<Utc>>,
}

impl CycleTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All cycles, oldest first
    #[must_use]
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Id of the cycle currently counting down
    #[must_use]
    pub const fn active_cycle_id(&self) -> Option<CycleId> {
        self.active_cycle_id
    }

    /// The cycle currently counting down
    #[must_use]
    pub fn active_cycle(&self) -> Option<&Cycle> {
        self.active_index().map(|i| &self.cycles[i])
    }

    /// Seconds elapsed on the active cycle as of the last tick
    #[must_use]
    pub const fn amount_seconds_passed(&self) -> u64 {
        self.amount_seconds_passed
    }

    /// Whether a new cycle may be started for the given task input
    #[must_use]
    pub fn can_start_new_cycle(&self, task_input: &str) -> bool {
        self.active_cycle_id.is_none() && !task_input.trim().is_empty()
    }

    /// Start a cycle at the current system time
    pub fn create_cycle(
        &mut self,
        task: &str,
        minutes_amount: u32,
    ) -> Result<CycleId, TrackerError> {
        self.create_cycle_at(task, minutes_amount, Utc::now())
    }

    /// Start a cycle at `now` and make it the active one.
    ///
    /// Fails if the input is invalid or another cycle is still counting down.
    pub fn create_cycle_at(
        &mut self,
        task: &str,
        minutes_amount: u32,
        now: DateTime<Utc>,
    ) -> Result<CycleId, TrackerError> {
        if let Some(id) = self.active_cycle_id {
            return Err(TrackerError::CycleAlreadyActive { id });
        }
        let request = NewCycle::new(task, minutes_amount)?;
        let now = self.observe(now);
        let id = self.next_id(now);

        self.cycles.push(Cycle::start(id, request, now));
        self.active_cycle_id = Some(id);
        self.amount_seconds_passed = 0;
        Ok(id)
    }

    /// Interrupt the active cycle at the current system time
    pub fn interrupt_active_cycle(&mut self) -> Option<CycleId> {
        self.interrupt_active_cycle_at(Utc::now())
    }

    /// Stop the active cycle early. Returns the interrupted id, or `None`
    /// when nothing was active.
    pub fn interrupt_active_cycle_at(&mut self, now: DateTime<Utc>) -> Option<CycleId> {
        let index = self.active_index()?;
        let now = self.observe(now);
        let cycle = &mut self.cycles[index];
        cycle.interrupt(now);
        let id = cycle.id;
        self.clear_active();
        Some(id)
    }

    /// Mark the active cycle finished. Returns the finished id, or `None`
    /// when nothing was active.
    pub fn mark_active_cycle_finished(&mut self, now: DateTime<Utc>) -> Option<CycleId> {
        let index = self.active_index()?;
        let now = self.observe(now);
        let cycle = &mut self.cycles[index];
        cycle.finish(now);
        let id = cycle.id;
        self.clear_active();
        Some(id)
    }

    /// Evaluate elapsed time against the active cycle's duration.
    ///
    /// Finishes the cycle once the elapsed time reaches its length; the
    /// elapsed value then stays at the full length until the next cycle
    /// starts. A `now` earlier than any previously observed time is treated
    /// as that time.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let Some(index) = self.active_index() else {
            return TickOutcome::Idle;
        };
        let now = self.observe(now);
        let cycle = &self.cycles[index];
        let total = cycle.total_seconds();
        let elapsed = cycle.elapsed_seconds(now);

        if elapsed >= total {
            let id = cycle.id;
            self.cycles[index].finish(now);
            self.active_cycle_id = None;
            self.amount_seconds_passed = total;
            return TickOutcome::Finished { id };
        }

        self.amount_seconds_passed = elapsed;
        TickOutcome::Running {
            elapsed,
            remaining: Countdown::remaining(total, elapsed),
        }
    }

    /// Remaining time on the active cycle, `00:00` when nothing is active
    #[must_use]
    pub fn remaining_display(&self) -> Countdown {
        self.active_cycle().map_or(Countdown::ZERO, |cycle| {
            Countdown::remaining(cycle.total_seconds(), self.amount_seconds_passed)
        })
    }

    /// Copy the current state for observers
    #[must_use]
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            cycles: self.cycles.clone(),
            active_cycle_id: self.active_cycle_id,
            amount_seconds_passed: self.amount_seconds_passed,
            countdown: self.remaining_display(),
        }
    }

    fn active_index(&self) -> Option<usize> {
        let id = self.active_cycle_id?;
        self.cycles
            .iter()
            .rposition(|c| c.id == id && !c.status().is_terminal())
    }

    fn clear_active(&mut self) {
        self.active_cycle_id = None;
        self.amount_seconds_passed = 0;
    }

    /// Clamp `now` so observed time never runs backwards
    fn observe(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.last_seen.map_or(now, |last| last.max(now));
        self.last_seen = Some(now);
        now
    }

    /// Millisecond timestamp, bumped past the newest existing id
    fn next_id(&self, now: DateTime<Utc>) -> CycleId {
        let candidate = now.timestamp_millis();
        let id = self
            .cycles
            .last()
            .map_or(candidate, |last| candidate.max(last.id.as_i64() + 1));
        CycleId::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::error::ValidationError;
    use crate::cycle::model::CycleStatus;
    use crate::testutil::{at, t0};

    fn tracker_with_active(minutes: u32) -> (CycleTracker, CycleId) {
        let mut tracker = CycleTracker::new();
        let id = tracker.create_cycle_at("Write report", minutes, t0()).unwrap();
        (tracker, id)
    }

    #[test]
    fn test_create_cycle_makes_it_active_with_zero_elapsed() {
        let (tracker, id) = tracker_with_active(25);

        assert_eq!(tracker.active_cycle_id(), Some(id));
        assert_eq!(tracker.amount_seconds_passed(), 0);
        let active = tracker.active_cycle().unwrap();
        assert_eq!(active.task, "Write report");
        assert_eq!(active.start_date, t0());
        assert_eq!(active.status(), CycleStatus::Running);
        assert_eq!(tracker.remaining_display().to_string(), "25:00");
    }

    #[test]
    fn test_create_cycle_rejects_out_of_range_minutes() {
        let mut tracker = CycleTracker::new();
        assert_eq!(
            tracker.create_cycle_at("task", 4, t0()),
            Err(TrackerError::Validation(ValidationError::MinutesOutOfRange {
                minutes: 4
            }))
        );
        assert_eq!(
            tracker.create_cycle_at("task", 61, t0()),
            Err(TrackerError::Validation(ValidationError::MinutesOutOfRange {
                minutes: 61
            }))
        );
        assert!(tracker.cycles().is_empty());
        assert_eq!(tracker.active_cycle_id(), None);
    }

    #[test]
    fn test_create_cycle_rejects_empty_task() {
        let mut tracker = CycleTracker::new();
        assert_eq!(
            tracker.create_cycle_at("  ", 25, t0()),
            Err(TrackerError::Validation(ValidationError::EmptyTask))
        );
    }

    #[test]
    fn test_create_cycle_while_active_is_rejected() {
        let (mut tracker, id) = tracker_with_active(25);
        assert_eq!(
            tracker.create_cycle_at("Another", 25, at(10)),
            Err(TrackerError::CycleAlreadyActive { id })
        );
        assert_eq!(tracker.cycles().len(), 1);
    }

    #[test]
    fn test_tick_one_second_before_end_shows_one_second() {
        let (mut tracker, _) = tracker_with_active(5);

        let outcome = tracker.tick(at(299));

        assert_eq!(
            outcome,
            TickOutcome::Running {
                elapsed: 299,
                remaining: Countdown::from_seconds(1),
            }
        );
        assert_eq!(tracker.remaining_display().to_string(), "00:01");
    }

    #[test]
    fn test_tick_at_end_finishes_cycle() {
        let (mut tracker, id) = tracker_with_active(5);
        tracker.tick(at(299));

        let outcome = tracker.tick(at(300));

        assert_eq!(outcome, TickOutcome::Finished { id });
        assert_eq!(tracker.active_cycle_id(), None);
        let cycle = &tracker.cycles()[0];
        assert_eq!(cycle.finished_date, Some(at(300)));
        assert_eq!(cycle.interrupted_date, None);
        assert_eq!(tracker.remaining_display().to_string(), "00:00");
    }

    #[test]
    fn test_finish_holds_elapsed_at_full_length() {
        let (mut tracker, _) = tracker_with_active(5);
        tracker.tick(at(299));
        assert_eq!(tracker.amount_seconds_passed(), 299);

        tracker.tick(at(300));

        assert_eq!(tracker.amount_seconds_passed(), 300);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.amount_seconds_passed, 300);
        assert_eq!(snapshot.countdown, Countdown::ZERO);

        tracker.create_cycle_at("Next", 5, at(310)).unwrap();
        assert_eq!(tracker.amount_seconds_passed(), 0);
    }

    #[test]
    fn test_late_tick_still_finishes() {
        let (mut tracker, id) = tracker_with_active(5);
        assert_eq!(tracker.tick(at(1000)), TickOutcome::Finished { id });
        assert_eq!(tracker.cycles()[0].status(), CycleStatus::Finished);
        assert_eq!(tracker.amount_seconds_passed(), 300);
    }

    #[test]
    fn test_wall_clock_create_and_interrupt() {
        let mut tracker = CycleTracker::new();

        let before = Utc::now();
        let id = tracker.create_cycle("Write report", 25).unwrap();
        let interrupted = tracker.interrupt_active_cycle();
        let after = Utc::now();

        assert_eq!(interrupted, Some(id));
        let cycle = &tracker.cycles()[0];
        assert!(cycle.start_date >= before && cycle.start_date <= after);
        let ended = cycle.interrupted_date.unwrap();
        assert!(ended >= cycle.start_date && ended <= after);
        assert!(id.as_i64() >= before.timestamp_millis());
        assert_eq!(tracker.interrupt_active_cycle(), None);
    }

    #[test]
    fn test_interrupt_clears_active_and_later_ticks_are_noops() {
        let (mut tracker, id) = tracker_with_active(5);
        tracker.tick(at(99));

        assert_eq!(tracker.interrupt_active_cycle_at(at(100)), Some(id));
        assert_eq!(tracker.active_cycle_id(), None);
        assert_eq!(tracker.cycles()[0].interrupted_date, Some(at(100)));

        let before = tracker.cycles().to_vec();
        assert_eq!(tracker.tick(at(101)), TickOutcome::Idle);
        assert_eq!(tracker.tick(at(400)), TickOutcome::Idle);
        assert_eq!(tracker.cycles(), before.as_slice());
        assert_eq!(tracker.remaining_display(), Countdown::ZERO);
    }

    #[test]
    fn test_interrupt_without_active_is_noop() {
        let mut tracker = CycleTracker::new();
        assert_eq!(tracker.interrupt_active_cycle_at(t0()), None);
        assert_eq!(tracker.mark_active_cycle_finished(t0()), None);
        assert_eq!(tracker.tick(t0()), TickOutcome::Idle);
    }

    #[test]
    fn test_mark_finished_sets_finished_date() {
        let (mut tracker, id) = tracker_with_active(25);
        assert_eq!(tracker.mark_active_cycle_finished(at(60)), Some(id));
        assert_eq!(tracker.cycles()[0].status(), CycleStatus::Finished);
        assert_eq!(tracker.interrupt_active_cycle_at(at(61)), None);
        assert_eq!(tracker.cycles()[0].interrupted_date, None);
    }

    #[test]
    fn test_backwards_time_is_clamped() {
        let (mut tracker, _) = tracker_with_active(5);
        tracker.tick(at(120));

        let outcome = tracker.tick(at(30));

        assert_eq!(
            outcome,
            TickOutcome::Running {
                elapsed: 120,
                remaining: Countdown::from_seconds(180),
            }
        );
    }

    #[test]
    fn test_ids_are_strictly_increasing_within_same_millisecond() {
        let mut tracker = CycleTracker::new();
        let first = tracker.create_cycle_at("one", 5, t0()).unwrap();
        tracker.interrupt_active_cycle_at(t0());
        let second = tracker.create_cycle_at("two", 5, t0()).unwrap();

        assert!(second > first);
        assert_eq!(second.as_i64(), first.as_i64() + 1);
    }

    #[test]
    fn test_cycle_list_is_append_only() {
        let mut tracker = CycleTracker::new();
        let mut last_len = 0;

        for (offset, minutes) in [(0, 5), (400, 10), (1100, 60)] {
            tracker.create_cycle_at("task", minutes, at(offset)).unwrap();
            assert!(tracker.cycles().len() > last_len);
            last_len = tracker.cycles().len();

            tracker.tick(at(offset + 30));
            let _ = tracker.create_cycle_at("", 5, at(offset + 31));
            tracker.interrupt_active_cycle_at(at(offset + 60));
            tracker.tick(at(offset + 90));
            assert_eq!(tracker.cycles().len(), last_len);
        }

        let statuses: Vec<_> = tracker.cycles().iter().map(Cycle::status).collect();
        assert_eq!(statuses, vec![CycleStatus::Interrupted; 3]);
    }

    #[test]
    fn test_can_start_new_cycle() {
        let mut tracker = CycleTracker::new();
        assert!(!tracker.can_start_new_cycle(""));
        assert!(!tracker.can_start_new_cycle("   "));
        assert!(tracker.can_start_new_cycle("Write report"));

        tracker.create_cycle_at("Write report", 5, t0()).unwrap();
        assert!(!tracker.can_start_new_cycle("Next task"));

        tracker.interrupt_active_cycle_at(at(1));
        assert!(tracker.can_start_new_cycle("Next task"));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let (mut tracker, id) = tracker_with_active(5);
        tracker.tick(at(61));

        let snapshot = tracker.snapshot();

        assert_eq!(snapshot.active_cycle_id, Some(id));
        assert_eq!(snapshot.amount_seconds_passed, 61);
        assert_eq!(snapshot.countdown.to_string(), "03:59");
        assert_eq!(snapshot.active_cycle().unwrap().id, id);
        assert_eq!(snapshot.cycles.len(), 1);
    }
}
