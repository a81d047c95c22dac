//! Statistics Output
//!
//! Collects the per-tick aggregates the reporting surface exposes and
//! writes the final run report for analysis.

use bevy_ecs::prelude::*;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use protest_events::{CitizenStateCounts, RunReport, SimTimestamp, TickReport};

use crate::components::agent::{Citizen, CitizenState, Enforcer, Media};
use crate::components::world::SimClock;
use crate::config::SimParams;
use crate::events::{EventKind, TickEvents};

/// Run report output path.
pub const REPORT_OUTPUT_PATH: &str = "output/report.json";

/// Resource accumulating run-level statistics.
#[derive(Resource, Debug)]
pub struct ProtestStats {
    pub run_id: Uuid,
    pub seed: u64,
    /// Engagements started since the beginning of the run.
    pub total_fights: u64,
    /// Arrests completed since the beginning of the run.
    pub total_arrests: u64,
    /// Consecutive ticks in which the protest stayed below the configured
    /// population fraction.
    pub calm_streak: u64,
    /// Consecutive ticks in which open conflict stayed below the
    /// configured population fraction.
    pub lull_streak: u64,
    /// One report per tick, recorded at tick start.
    pub history: Vec<TickReport>,
}

impl ProtestStats {
    pub fn new(seed: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            seed,
            total_fights: 0,
            total_arrests: 0,
            calm_streak: 0,
            lull_streak: 0,
            history: Vec::new(),
        }
    }

    /// The most recent tick report.
    pub fn latest(&self) -> Option<&TickReport> {
        self.history.last()
    }
}

/// System: snapshot aggregate statistics at the start of each tick.
///
/// Runs first in the tick, so every report describes the committed state
/// the decision phase is about to read. The previous tick's events fold
/// into the cumulative fight/arrest totals here.
pub fn record_stats(
    clock: Res<SimClock>,
    params: Res<SimParams>,
    mut stats: ResMut<ProtestStats>,
    mut events: ResMut<TickEvents>,
    citizens: Query<&Citizen>,
    enforcers: Query<&Enforcer>,
    media: Query<&Media>,
) {
    for event in events.drain() {
        match event.kind {
            EventKind::Engagement => stats.total_fights += 1,
            EventKind::Arrest => stats.total_arrests += 1,
            EventKind::StateChange | EventKind::Release => {}
        }
    }

    let mut states = CitizenStateCounts::default();
    let mut arrested = 0usize;
    let mut citizen_total = 0usize;
    let mut legitimacy_sum = 0.0f64;
    let mut grievance_sum = 0.0f64;
    let mut aversion_sum = 0.0f64;

    for citizen in citizens.iter() {
        citizen_total += 1;
        legitimacy_sum += citizen.perceived_legitimacy as f64;
        grievance_sum += citizen.perceived_gain() as f64;
        aversion_sum += (1.0 - citizen.risk_tolerance) as f64;

        if citizen.arrested {
            arrested += 1;
            continue;
        }
        match citizen.state {
            CitizenState::Quiet => states.quiet += 1,
            CitizenState::Active => states.active += 1,
            CitizenState::Violent => states.violent += 1,
            CitizenState::Fighting => states.fighting += 1,
        }
    }

    let population = citizen_total.max(1) as f32;
    if (states.protest_size() as f32) / population < params.protest_fraction {
        stats.calm_streak += 1;
    } else {
        stats.calm_streak = 0;
    }
    if (states.fighting as f32) / population < params.conflict_fraction {
        stats.lull_streak += 1;
    } else {
        stats.lull_streak = 0;
    }

    let divisor = citizen_total.max(1) as f64;
    let report = TickReport {
        timestamp: SimTimestamp::from_tick(clock.tick, clock.ticks_per_day),
        states,
        arrested,
        pictures: media.iter().map(|m| m.picture_count as u64).sum(),
        enforcers: enforcers.iter().count(),
        enforcers_engaged: enforcers.iter().filter(|e| e.engaged).count(),
        mean_legitimacy: legitimacy_sum / divisor,
        mean_grievance: grievance_sum / divisor,
        mean_risk_aversion: aversion_sum / divisor,
        total_fights: stats.total_fights,
        total_arrests: stats.total_arrests,
        calm_streak: stats.calm_streak,
        lull_streak: stats.lull_streak,
        terminated: !clock.running,
    };
    stats.history.push(report);
}

/// Assemble the final run report from the accumulated statistics.
pub fn collect_run_report(world: &World) -> RunReport {
    let stats = world.resource::<ProtestStats>();
    let clock = world.resource::<SimClock>();
    RunReport {
        run_id: stats.run_id,
        seed: stats.seed,
        ticks: clock.tick,
        history: stats.history.clone(),
    }
}

/// Write the run report to the output directory.
pub fn write_report(report: &RunReport) -> std::io::Result<()> {
    let output_dir = Path::new("output");
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    fs::write(REPORT_OUTPUT_PATH, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::CitizenKind;
    use crate::config::Config;

    fn stats_world() -> World {
        let mut world = World::new();
        world.insert_resource(SimClock::new(24, 10));
        world.insert_resource(SimParams::from_config(&Config::default()));
        world.insert_resource(ProtestStats::new(7));
        world.insert_resource(TickEvents::new());
        world
    }

    fn run_stats(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(record_stats);
        schedule.run(world);
    }

    #[test]
    fn test_counts_split_by_state_and_custody() {
        let mut world = stats_world();
        world.spawn(Citizen::new(CitizenKind::HangerOn, 0.5, 0.5, 0.5, 0.1, 5));
        let mut active = Citizen::new(CitizenKind::Hardcore, 0.8, 0.2, 0.8, 0.1, 5);
        active.state = CitizenState::Active;
        world.spawn(active);
        let mut jailed = Citizen::new(CitizenKind::Hardcore, 0.8, 0.2, 0.8, 0.1, 5);
        jailed.arrested = true;
        world.spawn(jailed);

        run_stats(&mut world);

        let stats = world.resource::<ProtestStats>();
        let report = stats.latest().unwrap();
        assert_eq!(report.states.quiet, 1);
        assert_eq!(report.states.active, 1);
        assert_eq!(report.arrested, 1);
        assert_eq!(report.states.total(), 2);
    }

    #[test]
    fn test_streaks_reset_on_significant_protest() {
        let mut world = stats_world();
        // A lone quiet citizen: below both thresholds.
        let entity = world
            .spawn(Citizen::new(CitizenKind::HangerOn, 0.5, 0.5, 0.5, 0.1, 5))
            .id();

        run_stats(&mut world);
        run_stats(&mut world);
        assert_eq!(world.resource::<ProtestStats>().calm_streak, 2);

        // The whole (one-citizen) population turns violent.
        world.get_mut::<Citizen>(entity).unwrap().state = CitizenState::Violent;
        run_stats(&mut world);
        let stats = world.resource::<ProtestStats>();
        assert_eq!(stats.calm_streak, 0);
        // Violence without a fight still counts as a conflict lull.
        assert_eq!(stats.lull_streak, 3);
    }

    #[test]
    fn test_events_fold_into_cumulative_totals() {
        let mut world = stats_world();
        world
            .resource_mut::<TickEvents>()
            .record(0, EventKind::Engagement, "cit_0001", Vec::new(), "");
        world
            .resource_mut::<TickEvents>()
            .record(0, EventKind::Arrest, "cit_0001", Vec::new(), "");

        run_stats(&mut world);

        let stats = world.resource::<ProtestStats>();
        assert_eq!(stats.total_fights, 1);
        assert_eq!(stats.total_arrests, 1);
        assert!(world.resource::<TickEvents>().is_empty());
    }
}
