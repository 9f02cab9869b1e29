//! Fixed-interval re-check counter.

/// Fires every `interval_ticks` calls to [`RecheckSchedule::tick`].
#[derive(Clone, Debug)]
pub struct RecheckSchedule {
    interval_ticks: u32,
    counter: u32,
}

impl RecheckSchedule {
    /// An interval of 0 is treated as 1 (fire every tick).
    pub fn new(interval_ticks: u32) -> Self {
        Self {
            interval_ticks: interval_ticks.max(1),
            counter: 0,
        }
    }

    pub fn interval_ticks(&self) -> u32 {
        self.interval_ticks
    }

    /// Advance one tick; `true` when a re-check is due.
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.interval_ticks {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    /// Restart the interval, e.g. after an out-of-band check.
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_interval() {
        let mut schedule = RecheckSchedule::new(3);
        let fired: Vec<bool> = (0..7).map(|_| schedule.tick()).collect();
        assert_eq!(fired, [false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_zero_interval_fires_every_tick() {
        let mut schedule = RecheckSchedule::new(0);
        assert!(schedule.tick());
        assert!(schedule.tick());
    }
}
