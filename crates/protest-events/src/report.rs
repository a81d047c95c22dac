//! Report Types
//!
//! Per-tick and per-run aggregates published by the engine. These match the
//! query surface the front end charts against: citizen state counts, arrest
//! and picture totals, population averages, and quiet-streak counters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timestamp::SimTimestamp;

/// Citizen headcount by behavioral state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenStateCounts {
    pub quiet: usize,
    pub active: usize,
    pub violent: usize,
    pub fighting: usize,
}

impl CitizenStateCounts {
    /// Total citizens currently on the grid (excludes the jailed).
    pub fn total(&self) -> usize {
        self.quiet + self.active + self.violent + self.fighting
    }

    /// Citizens visibly protesting in any form.
    pub fn protest_size(&self) -> usize {
        self.active + self.violent + self.fighting
    }
}

/// Aggregate state of the simulation at the start of one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub timestamp: SimTimestamp,
    /// Citizen counts by state.
    pub states: CitizenStateCounts,
    /// Citizens currently in custody (off the grid).
    pub arrested: usize,
    /// Pictures taken by media agents so far today.
    pub pictures: u64,
    /// Enforcers deployed on the grid.
    pub enforcers: usize,
    /// Enforcers currently restraining a citizen.
    pub enforcers_engaged: usize,
    /// Mean perceived legitimacy across all citizens.
    pub mean_legitimacy: f64,
    /// Mean perceived gain from protesting across all citizens.
    pub mean_grievance: f64,
    /// Mean risk aversion (1 - risk tolerance) across all citizens.
    pub mean_risk_aversion: f64,
    /// Fights started since the beginning of the run.
    pub total_fights: u64,
    /// Arrests completed since the beginning of the run.
    pub total_arrests: u64,
    /// Consecutive ticks without a significant protest.
    pub calm_streak: u64,
    /// Consecutive ticks without significant open conflict.
    pub lull_streak: u64,
    /// Whether the run has exhausted its tick budget.
    pub terminated: bool,
}

/// Full output of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// RNG seed the run was started with.
    pub seed: u64,
    /// Ticks actually executed.
    pub ticks: u64,
    /// One report per executed tick, in order.
    pub history: Vec<TickReport>,
}

impl RunReport {
    /// Start an empty report for a new run.
    pub fn new(seed: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            seed,
            ticks: 0,
            history: Vec::new(),
        }
    }

    /// The most recent tick report, if any tick has run.
    pub fn latest(&self) -> Option<&TickReport> {
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_state_counts_totals() {
        let counts = CitizenStateCounts {
            quiet: 10,
            active: 4,
            violent: 2,
            fighting: 1,
        };
        assert_eq!(counts.total(), 17);
        assert_eq!(counts.protest_size(), 7);
    }

    #[test]
    fn test_run_report_round_trip() {
        let mut report = RunReport::new(42);
        report.history.push(fixtures::sample_tick_report(0));
        report.ticks = 1;

        let json = serde_json::to_string(&report).unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seed, 42);
        assert_eq!(parsed.ticks, 1);
        assert_eq!(parsed.latest().unwrap().states.quiet, 90);
    }
}
