// src/search/backoff.rs
// =============================================================================
// Rate-limit coordination between search workers.
//
// When one worker gets an HTTP 429 it claims the backoff; every other worker
// then idles until the claimant gets a normal answer and releases it. The
// owner lives in an atomic cell so waiting workers can poll it without
// taking the lock. Claiming and releasing always go through the mutex.
//
// Rust concepts:
// - AtomicUsize: a number several tasks can read/write without a lock
// - NonZeroUsize: lets 0 mean "nobody" without an Option in the cell
// =============================================================================

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Delays double until they reach this many units...
pub const DOUBLING_LIMIT: u64 = 512;
/// ...and then grow by this much per attempt
pub const LINEAR_STEP: u64 = 60;

// Identity of one search worker (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(NonZeroUsize);

impl WorkerId {
    pub fn from_index(index: usize) -> Self {
        WorkerId(NonZeroUsize::MIN.saturating_add(index))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

// Shared by reference between every worker of one batch run
#[derive(Debug, Default)]
pub struct BackoffState {
    lock: Mutex<()>,
    owner: AtomicUsize,
}

impl BackoffState {
    pub fn new() -> Self {
        Self::default()
    }

    // Lock-free read; may be stale by one poll
    pub fn owner(&self) -> Option<WorkerId> {
        NonZeroUsize::new(self.owner.load(Ordering::Acquire)).map(WorkerId)
    }

    // True when some other worker is backing off
    //
    // Reads the cell once, so "someone owns it" and "it isn't me" are
    // judged on the same value.
    pub fn blocks(&self, me: WorkerId) -> bool {
        matches!(self.owner(), Some(owner) if owner != me)
    }

    pub fn claim(&self, me: WorkerId) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.owner.store(me.get(), Ordering::Release);
    }

    // Clears the flag if `me` holds it; returns whether it did
    pub fn release(&self, me: WorkerId) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.owner.load(Ordering::Acquire) == me.get() {
            self.owner.store(0, Ordering::Release);
            true
        } else {
            false
        }
    }
}

// The delay that follows `delay` after another 429
pub fn next_delay(delay: u64) -> u64 {
    if delay >= DOUBLING_LIMIT {
        delay + LINEAR_STEP
    } else {
        delay * 2
    }
}

// The first `attempts` delays, starting from 1 unit
#[cfg(test)]
pub fn schedule(attempts: usize) -> Vec<u64> {
    std::iter::successors(Some(1u64), |&d| Some(next_delay(d)))
        .take(attempts)
        .collect()
}
