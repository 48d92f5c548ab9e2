//! Last-request-wins bookkeeping for overlapping fetches.
//!
//! Fetches are never cancelled. Instead every request takes a [`Ticket`]
//! and its result is only accepted if no newer ticket has been issued in the
//! meantime.

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use tracing::warn;

/// Generation number handed out by [`RequestGate::issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestGate {
    latest: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Pass `value` through if `ticket` is still the newest, else drop it.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            counter!("anomaly_stale_results_total").increment(1);
            warn!(
                ticket = ticket.0,
                latest = self.latest.load(Ordering::Acquire),
                "Discarding stale result"
            );
            None
        }
    }
}
