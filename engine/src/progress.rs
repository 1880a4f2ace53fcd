//! Shared completion counter for a batch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts completed items out of a fixed total.
///
/// Cloning shares the counter. Writers only ever increment, and readers
/// only need to see the value eventually, so relaxed ordering is enough.
#[derive(Debug, Clone)]
pub struct Progress {
    done: Arc<AtomicUsize>,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            done: Arc::new(AtomicUsize::new(0)),
            total,
        }
    }

    /// Record one more completed item.
    pub fn incr(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.done() >= self.total
    }
}
