//! Scenario setup: grid construction and agent spawning.

pub mod agents;
pub mod world;

use bevy_ecs::prelude::World as EcsWorld;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::components::world::SimClock;
use crate::config::{Config, SimParams};
use crate::events::TickEvents;
use crate::output::ProtestStats;
use crate::systems::{ArrestPairings, DailyLedger, GridView};
use crate::SimRng;

pub use agents::{spawn_all_agents, SpawnSummary};
pub use world::build_grid;

/// Build a fully-populated world for a validated configuration.
///
/// Inserts every engine resource and spawns the scenario's agents; the
/// result is ready to be driven by `schedule::build_tick_schedule`.
pub fn build_world(config: &Config, seed: u64) -> (EcsWorld, SpawnSummary) {
    let mut world = EcsWorld::new();

    let grid = build_grid(config);
    world.insert_resource(GridView::empty(grid.extent()));
    world.insert_resource(grid);
    world.insert_resource(SimClock::new(
        config.schedule.ticks_per_day,
        config.schedule.max_days,
    ));
    world.insert_resource(SimParams::from_config(config));
    world.insert_resource(ArrestPairings::new());
    world.insert_resource(TickEvents::new());
    world.insert_resource(DailyLedger::new(config.enforcer_count()));
    world.insert_resource(ProtestStats::new(seed));

    let mut rng = SmallRng::seed_from_u64(seed);
    let summary = spawn_all_agents(&mut world, config, &mut rng);
    world.insert_resource(SimRng(rng));

    (world, summary)
}
