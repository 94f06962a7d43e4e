//! Deterministic simulation clock.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deterministic simulation clock.
///
/// One tick per kernel sync pass; simulated time advances by a fixed
/// duration per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Logical tick counter (increments once per sync pass).
    pub tick: u64,
    /// Simulated time.
    pub time: Duration,
    /// Duration advanced per tick.
    pub tick_duration: Duration,
}

impl SimClock {
    /// Create a new clock starting at tick 0/time 0.
    #[must_use]
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick: 0,
            time: Duration::from_secs(0),
            tick_duration,
        }
    }

    /// Advance the clock by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.time += self.tick_duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates_time() {
        let mut clock = SimClock::new(Duration::from_millis(2));
        clock.advance();
        clock.advance();
        assert_eq!(clock.tick, 2);
        assert_eq!(clock.time, Duration::from_millis(4));
    }
}
