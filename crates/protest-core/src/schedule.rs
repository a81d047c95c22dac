//! Tick Schedule
//!
//! The canonical phase ordering for one tick. Everything before
//! `commit_plans` reads the frozen snapshot; everything after it works on
//! the committed grid.

use bevy_ecs::prelude::*;

use crate::components::world::SimClock;
use crate::output::stats::record_stats;
use crate::systems::{
    build_grid_view, commit_plans, daily_legitimacy_update, initiate_arrests, photograph_fights,
    plan_agents, resolve_fights, tick_jail_terms,
};

/// System: count the finished tick and terminate on budget exhaustion.
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

/// Build the schedule that advances the simulation by exactly one tick.
///
/// Phases, in order:
/// 1. snapshot aggregate statistics for reporting,
/// 2. freeze the grid into the decision view,
/// 3. plan every agent's move and state in randomized order,
/// 4. media photograph visible fights,
/// 5. enforcers initiate arrests (forcing targets to `fighting`),
/// 6. commit planned states and positions,
/// 7. count down fights into custody,
/// 8. count down jail terms into releases,
/// 9. advance the clock,
/// 10. run the daily legitimacy feedback on day boundaries.
pub fn build_tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            record_stats,
            build_grid_view,
            plan_agents,
            photograph_fights,
            initiate_arrests,
            commit_plans,
            resolve_fights,
            tick_jail_terms,
            advance_clock,
            daily_legitimacy_update,
        )
            .chain(),
    );
    schedule
}

/// Run ticks until the clock's budget is exhausted.
pub fn run_to_completion(world: &mut World, schedule: &mut Schedule) {
    while world.resource::<SimClock>().running {
        schedule.run(world);
    }
}
