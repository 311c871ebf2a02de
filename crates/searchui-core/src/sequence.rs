//! Last-request-wins sequencing for overlapping user actions.
//!
//! Every action takes a [`Ticket`] before it calls the search API. When the
//! response arrives the action checks [`RequestSequencer::is_current`]; a
//! response whose ticket has been superseded is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every earlier one.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
