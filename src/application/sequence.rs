//! Monotonic request tickets so that only the latest navigation is applied.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Ticket numbered by the browser and echoed back in a request field.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .map(Ticket)
    }
}

/// Issues tickets in increasing order. A response may be applied only while
/// its ticket is still the most recently issued one.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn latest(&self) -> Option<Ticket> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            value => Some(Ticket(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_ticket_is_latest() {
        let sequence = RequestSequence::new();
        assert_eq!(sequence.latest(), None);

        let first = sequence.issue();
        assert!(sequence.is_latest(first));

        let second = sequence.issue();
        assert!(!sequence.is_latest(first));
        assert!(sequence.is_latest(second));
        assert!(second > first);
    }

    #[test]
    fn client_tickets_must_be_positive_numbers() {
        assert_eq!(Ticket::parse(" 12 ").map(Ticket::value), Some(12));
        assert_eq!(Ticket::parse("0"), None);
        assert_eq!(Ticket::parse("-3"), None);
        assert_eq!(Ticket::parse("abc"), None);
        assert_eq!(Ticket::parse(""), None);
    }
}
