//! Time sources for the id allocator.

use std::sync::atomic::{AtomicI64, Ordering};

/// A millisecond wall clock.
pub trait Clock: Send + Sync + std::fmt::Debug + 'static {
    /// Current Unix time in milliseconds.
    fn now_ms(&self) -> i64;
}

/// The operating system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A settable clock for deterministic tests.
///
/// Every read returns the current value and then advances it by the
/// configured step (zero by default), which lets tests model a clock
/// that catches up while the allocator waits.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
    step: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start_ms`.
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
            step: AtomicI64::new(0),
        }
    }

    /// Jump to an absolute time, backward or forward.
    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Advance by `step_ms` after every read.
    pub fn set_auto_advance(&self, step_ms: i64) {
        self.step.store(step_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        let step = self.step.load(Ordering::SeqCst);
        self.now.fetch_add(step, Ordering::SeqCst)
    }
}
