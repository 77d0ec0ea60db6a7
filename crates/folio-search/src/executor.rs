#![forbid(unsafe_code)]

//! Query tickets.
//!
//! Every query the overlay issues gets a [`QueryTicket`]. Query results and
//! per-result payloads come back tagged with the ticket that asked for them;
//! anything carrying a ticket other than the latest is stale and dropped.

/// Identifies one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryTicket(u64);

impl QueryTicket {
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Issues tickets and decides which completions are still wanted.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    generation: u64,
    issued: u64,
}

impl QueryExecutor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: 0,
            issued: 0,
        }
    }

    /// Start a new query, superseding every earlier ticket.
    pub fn begin(&mut self) -> QueryTicket {
        self.generation += 1;
        self.issued += 1;
        QueryTicket(self.generation)
    }

    /// Supersede every ticket without issuing a new one.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Whether a completion for `ticket` should still be applied.
    #[must_use]
    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Number of queries issued so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.issued
    }
}
