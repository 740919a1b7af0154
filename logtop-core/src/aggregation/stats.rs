use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct LoopCounters {
    pub(crate) observed: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) flushes: AtomicU64,
    pub(crate) increment_failures: AtomicU64,
}

impl LoopCounters {
    pub(crate) fn bump(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn snapshot(&self) -> LoopStats {
        LoopStats {
            observed: self.observed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            increment_failures: self.increment_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the loop counters. Intended for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    /// Observations handed to the loop.
    pub observed: u64,
    /// Observations refused because the loop was not running.
    pub dropped: u64,
    pub flushes: u64,
    pub increment_failures: u64,
}
