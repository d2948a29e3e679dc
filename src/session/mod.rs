//! Session event loop.
//!
//! A [`Session`] owns a [`CycleTracker`] together with the one-second tick
//! that drives it. Commands arrive through a [`SessionHandle`]; state changes
//! are published on a `watch` channel and cycle transitions on a `broadcast`
//! channel. The tick interval exists only while a cycle is active and is
//! dropped in the same loop iteration that ends the cycle, so no tick can be
//! evaluated against a finished or interrupted cycle.

pub mod clock;
pub mod handle;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::cycle::{Cycle, CycleId, CycleTracker, TickOutcome, TrackerError, TrackerSnapshot};

pub use clock::{Clock, ManualClock, SystemClock};
pub use handle::{SessionError, SessionEvent, SessionHandle};

use handle::{SessionCommand, COMMAND_CHANNEL_BUFFER};

/// Capacity of the transition broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Single-writer owner of the tracker and its tick.
pub struct Session {
    tracker: CycleTracker,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    ticker: Option<Interval>,
    snapshot_tx: watch::Sender<TrackerSnapshot>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create a session reading the given clock, ticking once per second.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let tracker = CycleTracker::new();
        let (snapshot_tx, _) = watch::channel(tracker.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tracker,
            clock,
            tick_interval: Duration::from_secs(1),
            ticker: None,
            snapshot_tx,
            event_tx,
        }
    }

    /// Set the tick interval.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Spawn the session loop on the current runtime.
    ///
    /// The loop ends on shutdown or once every handle has been dropped; the
    /// join handle yields the tracker in its final state.
    #[must_use]
    pub fn start(self) -> (SessionHandle, JoinHandle<CycleTracker>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_BUFFER);
        let handle = SessionHandle {
            command_tx,
            snapshot_rx: self.snapshot_tx.subscribe(),
            event_tx: self.event_tx.clone(),
        };
        let join = tokio::spawn(self.run(command_rx));
        (handle, join)
    }

    /// Main session loop.
    async fn run(mut self, mut command_rx: mpsc::Receiver<SessionCommand>) -> CycleTracker {
        loop {
            tokio::select! {
                () = next_tick(&mut self.ticker) => {
                    self.handle_tick();
                }

                command = command_rx.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    match command {
                        SessionCommand::Create { task, minutes_amount, response } => {
                            let result = self.create_cycle(&task, minutes_amount);
                            let _ = response.send(result);
                        }
                        SessionCommand::Interrupt { response } => {
                            let result = self.interrupt_active_cycle();
                            let _ = response.send(result);
                        }
                        SessionCommand::Shutdown { response } => {
                            self.ticker = None;
                            let _ = response.send(self.tracker.snapshot());
                            break;
                        }
                    }
                }
            }
        }
        self.tracker
    }

    fn create_cycle(&mut self, task: &str, minutes_amount: u32) -> Result<CycleId, TrackerError> {
        let id = self
            .tracker
            .create_cycle_at(task, minutes_amount, self.clock.now())?;
        self.arm_ticker();
        self.publish();
        self.emit(id, SessionEvent::Started);
        Ok(id)
    }

    fn interrupt_active_cycle(&mut self) -> Option<CycleId> {
        let id = self.tracker.interrupt_active_cycle_at(self.clock.now())?;
        self.ticker = None;
        self.publish();
        self.emit(id, SessionEvent::Interrupted);
        Some(id)
    }

    fn handle_tick(&mut self) {
        match self.tracker.tick(self.clock.now()) {
            TickOutcome::Running { .. } => self.publish(),
            TickOutcome::Finished { id } => {
                self.ticker = None;
                self.publish();
                self.emit(id, SessionEvent::Finished);
            }
            TickOutcome::Idle => self.ticker = None,
        }
    }

    /// Replace any previous tick with a fresh one whose first fire is one
    /// period from now.
    fn arm_ticker(&mut self) {
        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.tracker.snapshot());
    }

    fn emit(&self, id: CycleId, event: fn(Cycle) -> SessionEvent) {
        if let Some(cycle) = self.tracker.cycles().iter().rev().find(|c| c.id == id) {
            // No subscribers is fine.
            let _ = self.event_tx.send(event(cycle.clone()));
        }
    }
}

/// Resolve on the next tick, or never when no cycle is armed.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
