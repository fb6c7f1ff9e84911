//! Auto-save timer.
//!
//! Polled from the event loop tick rather than run on its own thread, so a
//! save never overlaps an edit. The timer only says *when*; the caller
//! decides whether there is anything to save.

use std::time::{Duration, Instant};

/// Interval between automatic saves.
pub const AUTO_SAVE_INTERVAL: Duration = Duration::from_secs(60);

/// Fires once per interval.
#[derive(Debug, Clone)]
pub struct AutoSave {
    interval: Duration,
    last: Instant,
}

impl AutoSave {
    /// A timer starting at `now` with the default interval.
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self::with_interval(AUTO_SAVE_INTERVAL, now)
    }

    #[must_use]
    pub const fn with_interval(interval: Duration, now: Instant) -> Self {
        Self { interval, last: now }
    }

    /// `true` once the interval has elapsed since the last fire; the timer
    /// then restarts from `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}
