//! Inter-frame gate
//!
//! Clockless chips latch a frame once the line has been low for the reset
//! time. A new frame started earlier would be appended to the previous one,
//! so every transmission waits here first.

use embassy_time::{Duration, Instant};

use crate::hal::SystemClock;

/// Minimum time between the end of one frame and the start of the next
#[derive(Debug, Clone, Copy)]
pub struct MinWait {
    wait: Duration,
    last: Option<Instant>,
}

impl MinWait {
    pub const fn new(wait: Duration) -> Self {
        Self { wait, last: None }
    }

    /// Configured gap
    pub const fn gap(&self) -> Duration {
        self.wait
    }

    /// Time still to wait at `now`
    pub fn remaining(&self, now: Instant) -> Duration {
        let Some(last) = self.last else {
            return Duration::from_ticks(0);
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.wait {
            Duration::from_ticks(0)
        } else {
            self.wait - elapsed
        }
    }

    /// Spin until the gap since the last [`mark`](Self::mark) has passed
    pub fn wait<C: SystemClock>(&self, clock: &C) {
        while self.remaining(clock.now()) > Duration::from_ticks(0) {
            core::hint::spin_loop();
        }
    }

    /// Record the end of a frame
    pub fn mark<C: SystemClock>(&mut self, clock: &C) {
        self.last = Some(clock.now());
    }

    /// Forget the last frame
    pub fn clear(&mut self) {
        self.last = None;
    }
}
