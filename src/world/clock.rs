//! Settable simulation clock.

use std::cell::Cell;

use super::Clock;

/// Clock driven by the simulation loop.
///
/// Interior mutability lets the loop advance time while components hold a
/// shared reference to it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f32>,
}

impl ManualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at `time` seconds.
    pub fn starting_at(time: f32) -> Self {
        Self {
            now: Cell::new(time),
        }
    }

    /// Advance by `dt` seconds and return the new time.
    pub fn advance(&self, dt: f32) -> f32 {
        let next = self.now.get() + dt.max(0.0);
        self.now.set(next);
        next
    }

    /// Jump to an absolute time (ignored if it would run backwards).
    pub fn set(&self, time: f32) {
        if time >= self.now.get() {
            self.now.set(time);
        }
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f32 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let clock = ManualClock::new();
        assert_eq!(clock.elapsed(), 0.0);
        clock.advance(0.5);
        clock.advance(-1.0);
        assert_eq!(clock.elapsed(), 0.5);
        clock.set(0.1);
        assert_eq!(clock.elapsed(), 0.5);
        clock.set(2.0);
        assert_eq!(clock.elapsed(), 2.0);
    }
}
