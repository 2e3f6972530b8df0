use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const IN_FLIGHT: u8 = 1;
const DONE: u8 = 2;

/// One-shot lock around finalize.
///
/// The first `try_acquire` wins and receives a `SubmissionTicket`; every later call
/// returns `None`, including after the ticket is released. The ticket stays alive
/// until the remote report resolves, so `is_in_flight` tells whether that report is
/// still outstanding.
#[derive(Clone, Default)]
pub struct SubmissionGuard {
    state: Arc<AtomicU8>,
}

impl SubmissionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the finalize slot. Synchronous so racing triggers are resolved before
    /// any asynchronous work starts.
    #[must_use]
    pub fn try_acquire(&self) -> Option<SubmissionTicket> {
        self.state
            .compare_exchange(IDLE, IN_FLIGHT, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionTicket {
                state: Arc::clone(&self.state),
            })
    }

    /// True once finalize has been claimed.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.state.load(Ordering::Acquire) != IDLE
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.state.load(Ordering::Acquire) == IN_FLIGHT
    }
}

impl fmt::Debug for SubmissionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionGuard")
            .field("spent", &self.is_spent())
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}

/// Proof of a won finalize. Dropping it marks the submission as done.
#[must_use = "dropping the ticket ends the submission"]
pub struct SubmissionTicket {
    state: Arc<AtomicU8>,
}

impl SubmissionTicket {
    pub fn release(self) {}
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.state.store(DONE, Ordering::Release);
    }
}

impl fmt::Debug for SubmissionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionTicket").finish_non_exhaustive()
    }
}
