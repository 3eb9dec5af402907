//! Request generations for discarding late responses.
//!
//! A page issues a [`RequestTicket`] before each fetch. Navigation (or a
//! newer fetch from the same view) advances the generation; a response whose
//! ticket no longer matches is dropped instead of overwriting the state of
//! whatever view is current now.

#[cfg(test)]
#[path = "generation_test.rs"]
mod generation_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counter. Clones observe the same generation.
#[derive(Clone, Debug, Default)]
pub struct RequestGeneration {
    counter: Arc<AtomicU64>,
}

/// Proof that a request was issued during a given generation.
#[derive(Clone, Debug)]
pub struct RequestTicket {
    generation: u64,
    counter: Arc<AtomicU64>,
}

impl RequestGeneration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the generation and return a ticket for it. Tickets issued
    /// earlier become stale.
    #[must_use]
    pub fn begin(&self) -> RequestTicket {
        let generation = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket { generation, counter: Arc::clone(&self.counter) }
    }

    /// Make every outstanding ticket stale (e.g. on navigation).
    pub fn invalidate(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl RequestTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while no newer request or navigation has happened.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}
