//! Test fixtures for downstream consumers.
//!
//! Enabled with the `test-fixtures` feature so dashboard code can exercise
//! its rendering against realistic report shapes.

use crate::report::{CitizenStateCounts, TickReport};
use crate::timestamp::SimTimestamp;

/// A plausible mid-run tick report.
pub fn sample_tick_report(tick: u64) -> TickReport {
    TickReport {
        timestamp: SimTimestamp::from_tick(tick, 24),
        states: CitizenStateCounts {
            quiet: 90,
            active: 6,
            violent: 3,
            fighting: 1,
        },
        arrested: 2,
        pictures: 14,
        enforcers: 7,
        enforcers_engaged: 2,
        mean_legitimacy: 0.61,
        mean_grievance: 0.24,
        mean_risk_aversion: 0.55,
        total_fights: 5,
        total_arrests: 3,
        calm_streak: 0,
        lull_streak: 4,
        terminated: false,
    }
}
