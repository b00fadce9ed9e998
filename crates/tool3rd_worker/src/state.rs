use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use context_logging::ctx_warn;
use tool3rd_protocol::{Channel, Payload, WorkerState};

use crate::outbox::Outbox;

/// Busy/idle state of the worker. Every transition is reported to the
/// renderer.
#[derive(Debug, Clone)]
pub struct StateMachine {
    busy: Arc<AtomicBool>,
    outbox: Outbox,
}

impl StateMachine {
    pub fn new(outbox: Outbox) -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            outbox,
        }
    }

    pub fn state(&self) -> WorkerState {
        if self.busy.load(Ordering::Acquire) {
            WorkerState::Busy
        } else {
            WorkerState::Idle
        }
    }

    /// Re-sends the current state without changing it.
    pub fn report(&self) {
        self.outbox.post(Payload::WorkerStateReport {
            state: self.state(),
        });
    }

    /// Enters `busy` for `channel`. Returns `None`, after re-reporting the
    /// current state, when another request still holds the worker.
    pub fn try_enter(&self, channel: Channel) -> Option<BusyGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            ctx_warn!("rejecting {} while busy", channel);
            self.report();
            return None;
        }
        self.outbox.post(Payload::WorkerStateReport {
            state: WorkerState::Busy,
        });
        Some(BusyGuard {
            busy: self.busy.clone(),
            outbox: self.outbox.clone(),
        })
    }
}

/// Holds the worker in `busy`. Dropping it returns to `idle` and reports it,
/// whichever path the handler took.
#[must_use = "the worker returns to idle as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
    outbox: Outbox,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        self.outbox.post(Payload::WorkerStateReport {
            state: WorkerState::Idle,
        });
    }
}
