use std::sync::{Mutex, PoisonError};

use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::config::InflightPolicy;

/// Tracks the request a controller currently has in flight.
pub(crate) struct InflightSlot {
    policy: InflightPolicy,
    state: Mutex<SlotState>,
}

#[derive(Default)]
struct SlotState {
    generation: u64,
    abort: Option<AbortHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

impl InflightSlot {
    pub(crate) fn new(policy: InflightPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(SlotState::default()),
        }
    }

    /// Starts a new request generation. Under `CancelPrevious` the request
    /// holding the slot is aborted.
    pub(crate) fn begin(&self) -> Ticket {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        if self.policy == InflightPolicy::CancelPrevious {
            if let Some(previous) = state.abort.take() {
                previous.abort();
            }
        }
        Ticket(state.generation)
    }

    pub(crate) fn track(&self, ticket: Ticket, abort: AbortHandle) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation == ticket.0 {
            state.abort = Some(abort);
        } else if self.policy == InflightPolicy::CancelPrevious {
            abort.abort();
        }
    }

    /// Whether a finished request may still write its result.
    pub(crate) fn may_apply(&self, ticket: Ticket) -> bool {
        match self.policy {
            InflightPolicy::LastResponseWins => true,
            InflightPolicy::CancelPrevious => {
                let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                state.generation == ticket.0
            }
        }
    }

    pub(crate) fn finish(&self, ticket: Ticket) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation == ticket.0 {
            state.abort = None;
        }
    }
}

/// Waits for a spawned request. An aborted request resolves quietly; a
/// panicking one re-raises on the caller.
pub(crate) async fn join_request(task: JoinHandle<()>) {
    if let Err(err) = task.await {
        if err.is_panic() {
            std::panic::resume_unwind(err.into_panic());
        }
        debug!("request cancelled before completion");
    }
}
