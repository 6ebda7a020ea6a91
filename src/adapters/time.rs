//! Monotonic time for the host build.
//!
//! The switch debouncer works on a wrapping `u32` millisecond clock, the
//! same width a board's tick counter would give it.

use std::time::Instant;

pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since start, truncated to `u32` (wraps after ~49 days).
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
