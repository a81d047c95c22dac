//! World Components
//!
//! The simulation clock and its termination state.

use bevy_ecs::prelude::*;

/// Resource: tick counter and run lifetime.
///
/// The run moves from running to terminated exactly once, when the tick
/// counter exceeds the configured budget.
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    /// Completed ticks.
    pub tick: u64,
    /// Ticks per simulated day.
    pub ticks_per_day: u64,
    /// Tick budget for the run.
    pub max_ticks: u64,
    /// False once the budget is exhausted.
    pub running: bool,
}

impl SimClock {
    pub fn new(ticks_per_day: u64, max_days: u64) -> Self {
        let ticks_per_day = ticks_per_day.max(1);
        Self {
            tick: 0,
            ticks_per_day,
            max_ticks: max_days * ticks_per_day,
            running: true,
        }
    }

    /// Count the tick that just finished; terminate on budget exhaustion.
    pub fn advance(&mut self) {
        self.tick += 1;
        if self.tick > self.max_ticks {
            self.running = false;
        }
    }

    /// True exactly when a full day has just completed.
    pub fn is_day_boundary(&self) -> bool {
        self.tick > 0 && self.tick % self.ticks_per_day == 0
    }

    /// Current day number, starting at 1.
    pub fn day(&self) -> u64 {
        self.tick / self.ticks_per_day + 1
    }
}
