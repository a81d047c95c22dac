//! Simulation Timestamps
//!
//! Converts raw tick counters into day/hour coordinates for reporting.

use serde::{Deserialize, Serialize};

/// A point in simulated time.
///
/// A day is a fixed number of ticks (configured by the engine); the hour is
/// the tick offset within the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTimestamp {
    /// Absolute tick count since the start of the run.
    pub tick: u64,
    /// Day number, starting at 1.
    pub day: u64,
    /// Tick offset within the day, starting at 0.
    pub hour: u64,
}

impl SimTimestamp {
    /// Build a timestamp from a raw tick counter and the day length.
    pub fn from_tick(tick: u64, ticks_per_day: u64) -> Self {
        let ticks_per_day = ticks_per_day.max(1);
        Self {
            tick,
            day: tick / ticks_per_day + 1,
            hour: tick % ticks_per_day,
        }
    }

    /// Formatted date string for logs and report filenames.
    pub fn format(&self) -> String {
        format!("day_{}.hour_{:02}", self.day, self.hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tick() {
        let ts = SimTimestamp::from_tick(0, 24);
        assert_eq!(ts.day, 1);
        assert_eq!(ts.hour, 0);

        let ts = SimTimestamp::from_tick(23, 24);
        assert_eq!(ts.day, 1);
        assert_eq!(ts.hour, 23);

        let ts = SimTimestamp::from_tick(24, 24);
        assert_eq!(ts.day, 2);
        assert_eq!(ts.hour, 0);
    }

    #[test]
    fn test_format() {
        let ts = SimTimestamp::from_tick(30, 24);
        assert_eq!(ts.format(), "day_2.hour_06");
    }

    #[test]
    fn test_zero_day_length_does_not_divide_by_zero() {
        let ts = SimTimestamp::from_tick(5, 0);
        assert_eq!(ts.day, 6);
    }
}
