//! Sequence gating for overlapping async requests
//!
//! Every request takes a [`Ticket`] from the gate. Issuing a new ticket
//! cancels the previous one's token and bumps the sequence, so a completion
//! is applied only while `is_current` still holds for its ticket. Network
//! completion order therefore never leaks into the visible state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Handle for one issued request
#[derive(Debug, Clone)]
pub struct Ticket {
    pub sequence: u64,
    pub cancel: CancellationToken,
}

/// Monotonic request counter plus the cancellation token of the live request
#[derive(Debug)]
pub struct RequestGate {
    current: AtomicU64,
    live: Mutex<CancellationToken>,
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestGate {
    pub fn new() -> Self {
        Self {
            current: AtomicU64::new(0),
            live: Mutex::new(CancellationToken::new()),
        }
    }

    /// Supersede whatever is in flight and hand out the next ticket
    pub fn issue(&self) -> Ticket {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        live.cancel();
        *live = CancellationToken::new();
        let sequence = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            sequence,
            cancel: live.clone(),
        }
    }

    /// Cancel the live request without starting a new one
    pub fn invalidate(&self) -> u64 {
        let live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        live.cancel();
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, sequence: u64) -> bool {
        self.current.load(Ordering::SeqCst) == sequence
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_is_monotonic_and_cancels_previous() {
        let gate = RequestGate::new();
        let first = gate.issue();
        let second = gate.issue();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        assert!(!gate.is_current(first.sequence));
        assert!(gate.is_current(second.sequence));
    }

    #[test]
    fn test_invalidate() {
        let gate = RequestGate::new();
        let ticket = gate.issue();
        let next = gate.invalidate();

        assert!(ticket.cancel.is_cancelled());
        assert!(!gate.is_current(ticket.sequence));
        assert_eq!(next, 2);
        assert_eq!(gate.current(), 2);

        // a fresh ticket after invalidation is live again
        let fresh = gate.issue();
        assert_eq!(fresh.sequence, 3);
        assert!(!fresh.cancel.is_cancelled());
    }
}
