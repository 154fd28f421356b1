use std::cell::Cell;

/// Monotonic request tickets. Only the most recently issued ticket may
/// publish, so a slow response for an older request is discarded instead
/// of overwriting a newer one.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: Cell<u64>,
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every earlier ticket.
    pub fn issue(&self) -> Ticket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        Ticket(next)
    }

    /// The newest ticket without superseding it.
    pub fn current(&self) -> Ticket {
        Ticket(self.latest.get())
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.get() == ticket.0
    }
}
