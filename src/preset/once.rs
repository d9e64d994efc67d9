//! Process-wide one-time setup guard.

use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Runs a setup effect at most once per process.
///
/// Safe to call repeatedly and from many threads at once: concurrent first
/// callers block until the single execution finishes, later callers return
/// immediately. Intended to live in a `static`.
#[derive(Debug)]
pub struct RunOnce {
    once: Once,
    executions: AtomicUsize,
}

impl RunOnce {
    pub const fn new() -> Self {
        Self {
            once: Once::new(),
            executions: AtomicUsize::new(0),
        }
    }

    /// Execute `effect` unless some caller already has.
    pub fn run(&self, effect: impl FnOnce()) {
        self.once.call_once(|| {
            self.executions.fetch_add(1, Ordering::SeqCst);
            effect();
        });
    }

    /// Whether the effect has completed.
    pub fn is_completed(&self) -> bool {
        self.once.is_completed()
    }

    /// Number of times the guarded effect started. Never exceeds one.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl Default for RunOnce {
    fn default() -> Self {
        Self::new()
    }
}
