//! Session handle for driving a running session.
//!
//! Cloneable front end that forwards commands to the session loop and
//! exposes its snapshot and event channels.

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::cycle::{Cycle, CycleId, TrackerError, TrackerSnapshot};

/// Buffer size for the command channel between `SessionHandle` and `Session`.
pub(crate) const COMMAND_CHANNEL_BUFFER: usize = 32;

/// Errors returned through a [`SessionHandle`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The tracker rejected the request.
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// The session loop is gone.
    #[error("session closed: {0}")]
    Closed(String),
}

/// Cycle transitions published by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new cycle became active.
    Started(Cycle),
    /// The active cycle counted down to zero.
    Finished(Cycle),
    /// The active cycle was stopped early.
    Interrupted(Cycle),
}

impl SessionEvent {
    /// The cycle the event is about.
    #[must_use]
    pub const fn cycle(&self) -> &Cycle {
        match self {
            Self::Started(cycle) | Self::Finished(cycle) | Self::Interrupted(cycle) => cycle,
        }
    }
}

/// Commands that can be sent to the session loop.
pub(crate) enum SessionCommand {
    /// Start a new cycle.
    Create {
        task: String,
        minutes_amount: u32,
        response: oneshot::Sender<Result<CycleId, TrackerError>>,
    },
    /// Interrupt the active cycle.
    Interrupt {
        response: oneshot::Sender<Option<CycleId>>,
    },
    /// Stop the loop and hand back the final state.
    Shutdown {
        response: oneshot::Sender<TrackerSnapshot>,
    },
}

/// Handle for controlling a session.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) command_tx: mpsc::Sender<SessionCommand>,
    pub(crate) snapshot_rx: watch::Receiver<TrackerSnapshot>,
    pub(crate) event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Helper to send a command and wait for its response.
    async fn request<T>(
        &self,
        build_command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
        operation: &str,
    ) -> Result<T, SessionError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(build_command(response_tx))
            .await
            .map_err(|_| SessionError::Closed(format!("failed to send {operation} command")))?;

        response_rx
            .await
            .map_err(|_| SessionError::Closed(format!("failed to receive {operation} response")))
    }

    /// Start a cycle and arm its countdown.
    pub async fn create_cycle(
        &self,
        task: &str,
        minutes_amount: u32,
    ) -> Result<CycleId, SessionError> {
        let task = task.to_string();
        let result = self
            .request(
                |response| SessionCommand::Create {
                    task,
                    minutes_amount,
                    response,
                },
                "create",
            )
            .await?;
        Ok(result?)
    }

    /// Interrupt the active cycle. `Ok(None)` when nothing was active.
    pub async fn interrupt_active_cycle(&self) -> Result<Option<CycleId>, SessionError> {
        self.request(|response| SessionCommand::Interrupt { response }, "interrupt")
            .await
    }

    /// Stop the session loop, returning the final state.
    pub async fn shutdown(&self) -> Result<TrackerSnapshot, SessionError> {
        self.request(|response| SessionCommand::Shutdown { response }, "shutdown")
            .await
    }

    /// The most recently published state.
    #[must_use]
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Whether a cycle can be started for the given task input right now.
    #[must_use]
    pub fn can_start_new_cycle(&self, task_input: &str) -> bool {
        self.snapshot_rx.borrow().can_start_new_cycle(task_input)
    }

    /// Receive every published state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Receive cycle transitions from now on.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }
}
