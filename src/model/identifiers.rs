//! Identifier newtypes for asynchronous steps and lifecycle operations.
//!
//! All identifiers are opaque, monotonically allocated integers. They carry no
//! meaning beyond identity, which is exactly what the stale-completion guard
//! needs: a completion is acted on only if its identifier is the one the
//! machine is currently waiting for.

use serde::Serialize;
use std::fmt;

/// Identity of one suspension point (activation, deactivation, autofocus
/// settle, dimension wait, or animation).
///
/// Completions and safety timeouts for a step carry the same ticket. A ticket
/// that is no longer outstanding is stale and its completion is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Ticket(u64);

impl Ticket {
    /// Create a ticket from a raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Identity of one logical lifecycle operation (an open, a close, a specific
/// snap, a specific resize).
///
/// Start, cancel and end notifications for the same operation share the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OperationId(u64);

impl OperationId {
    /// Create an operation id from a raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// Handle returned by a resize-observation primitive for one observed region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservationId(u64);

impl ObservationId {
    /// Create an observation id from a raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Monotonic allocator shared by tickets and operation ids.
///
/// Starts at 1 so that a zero value never appears in logs as a real id.
#[derive(Debug, Clone)]
pub struct Sequence {
    next: u64,
}

impl Default for Sequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl Sequence {
    /// Allocate the next ticket.
    pub fn ticket(&mut self) -> Ticket {
        Ticket(self.bump())
    }

    /// Allocate the next operation id.
    pub fn operation(&mut self) -> OperationId {
        OperationId(self.bump())
    }

    fn bump(&mut self) -> u64 {
        let value = self.next;
        self.next = self.next.saturating_add(1);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_starts_at_one() {
        let mut seq = Sequence::default();
        assert_eq!(seq.ticket().get(), 1);
    }

    #[test]
    fn tickets_and_operations_share_one_counter() {
        let mut seq = Sequence::default();
        let a = seq.ticket();
        let b = seq.operation();
        let c = seq.ticket();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(c.get(), 3);
    }

    #[test]
    fn display_prefixes_kind() {
        assert_eq!(Ticket::new(7).to_string(), "t7");
        assert_eq!(OperationId::new(3).to_string(), "op3");
    }
}
