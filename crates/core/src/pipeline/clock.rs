use std::time::{Duration, Instant};

/// Monotonic time source used to measure per-frame processing time.
pub trait Clock: Send {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&mut self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}
