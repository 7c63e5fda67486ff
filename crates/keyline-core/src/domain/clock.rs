//! Millisecond clocks used to stamp input events and drive the render window.
//!
//! All timeline timestamps are signed milliseconds on a monotonic clock.  The
//! absolute origin is irrelevant; only differences are ever displayed.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Timestamp in milliseconds on a monotonic, non-decreasing clock.
pub type Millis = i64;

/// Source of "now" for both execution contexts.
///
/// The capture context stamps events on arrival; the render context reads the
/// same clock once per frame.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds.
    fn now_ms(&self) -> Millis;
}

/// Wall-clock driven monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Clock that only moves when told to.
///
/// Used by tests and deterministic previews.  Reads and writes are relaxed:
/// a test sets the time and then drives the code under test on the same thread.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock reading `start_ms`.
    pub fn new(start_ms: Millis) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now_ms: Millis) {
        self.now.store(now_ms, Ordering::Relaxed);
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: Millis) {
        self.now.fetch_add(delta_ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::Relaxed)
    }
}
