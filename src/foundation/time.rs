use std::time::Instant;

/// Monotonic seconds since the clock was created.
///
/// Effects and emitters work in plain `f64` seconds so they can be driven by tests without
/// sleeping; the render loop reads this clock once per tick.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    epoch: Instant,
}

impl Clock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Seconds elapsed since [`Clock::new`].
    pub fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
