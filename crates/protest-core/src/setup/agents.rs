//! Agent Spawning
//!
//! Enforcers deploy one per cell of their cordon regions; citizens and
//! media scatter at random over the free cells of the agent region.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::agent::{
    AgentId, Citizen, CitizenKind, DesireVector, Enforcer, Media, PlannedMove, PlannedState,
    Position, VisionRadius,
};
use crate::components::grid::{Occupant, OccupancyGrid};
use crate::config::Config;

/// Kind-dependent risk-tolerance ranges for citizen creation.
pub mod spawn_ranges {
    /// Hardcore protesters shrug off most arrest risk.
    pub const HARDCORE_RISK_TOLERANCE: (f32, f32) = (0.6, 1.0);
    /// Hangers-on take moderate risks when the crowd does.
    pub const HANGER_ON_RISK_TOLERANCE: (f32, f32) = (0.3, 0.7);
    /// Observers keep themselves out of trouble.
    pub const OBSERVER_RISK_TOLERANCE: (f32, f32) = (0.0, 0.4);
}

/// Headcount of a finished spawn pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnSummary {
    pub enforcers: usize,
    pub media: usize,
    pub hardcore: usize,
    pub hangers_on: usize,
    pub observers: usize,
}

impl SpawnSummary {
    pub fn total_agents(&self) -> usize {
        self.enforcers + self.media + self.citizens()
    }

    pub fn citizens(&self) -> usize {
        self.hardcore + self.hangers_on + self.observers
    }
}

/// Spawn every agent of the scenario and register it on the grid.
///
/// The caller owns the RNG so placement shares the run's single seeded
/// stream.
pub fn spawn_all_agents(world: &mut World, config: &Config, rng: &mut SmallRng) -> SpawnSummary {
    let mut grid = world
        .remove_resource::<OccupancyGrid>()
        .expect("grid resource must exist before spawning");
    let mut summary = SpawnSummary::default();

    // Enforcer cordon: one per region cell, in region order.
    let mut enforcer_index = 0usize;
    for region in &config.layout.enforcer_regions {
        for cell in region.cells() {
            let entity = world
                .spawn((
                    AgentId(format!("enf_{:03}", enforcer_index)),
                    Position(Some(cell)),
                    VisionRadius(config.movement.vision_radius),
                    DesireVector::new(config.desires.enforcer),
                    PlannedMove::default(),
                    PlannedState::default(),
                    Enforcer {
                        engaged: false,
                        frozen: config.layout.enforcers_frozen,
                    },
                ))
                .id();
            grid.place(cell, Occupant::Agent(entity));
            enforcer_index += 1;
        }
    }
    summary.enforcers = enforcer_index;

    // Citizens and media share the free cells of the agent region.
    let mut free = grid.free_cells_in(&config.layout.agent_region);
    let needed = config.population.citizens + config.population.media;
    if free.len() < needed {
        panic!(
            "agent region has {} free cells for {} agents",
            free.len(),
            needed
        );
    }
    free.shuffle(rng);

    for index in 0..config.population.citizens {
        let cell = free[index];
        let kind = draw_kind(config, rng);
        let (lo, hi) = match kind {
            CitizenKind::Hardcore => spawn_ranges::HARDCORE_RISK_TOLERANCE,
            CitizenKind::HangerOn => spawn_ranges::HANGER_ON_RISK_TOLERANCE,
            CitizenKind::Observer => spawn_ranges::OBSERVER_RISK_TOLERANCE,
        };
        match kind {
            CitizenKind::Hardcore => summary.hardcore += 1,
            CitizenKind::HangerOn => summary.hangers_on += 1,
            CitizenKind::Observer => summary.observers += 1,
        }

        let entity = world
            .spawn((
                AgentId(format!("cit_{:04}", index)),
                Position(Some(cell)),
                VisionRadius(config.movement.vision_radius),
                DesireVector::new(match kind {
                    CitizenKind::Hardcore => config.desires.hardcore,
                    CitizenKind::HangerOn => config.desires.hanger_on,
                    CitizenKind::Observer => config.desires.observer,
                }),
                PlannedMove::default(),
                PlannedState::default(),
                Citizen::new(
                    kind,
                    rng.gen::<f32>(),
                    rng.gen::<f32>(),
                    rng.gen_range(lo..=hi),
                    config.unrest.threshold,
                    config.unrest.arrest_delay,
                ),
            ))
            .id();
        grid.place(cell, Occupant::Agent(entity));
    }

    for index in 0..config.population.media {
        let cell = free[config.population.citizens + index];
        let entity = world
            .spawn((
                AgentId(format!("media_{:02}", index)),
                Position(Some(cell)),
                VisionRadius(config.movement.vision_radius),
                DesireVector::new(config.desires.media),
                PlannedMove::default(),
                PlannedState::default(),
                Media::default(),
            ))
            .id();
        grid.place(cell, Occupant::Agent(entity));
    }
    summary.media = config.population.media;

    world.insert_resource(grid);
    summary
}

/// Draw a citizen kind from the configured density fractions.
fn draw_kind(config: &Config, rng: &mut SmallRng) -> CitizenKind {
    let roll = rng.gen::<f32>();
    if roll < config.population.hardcore_density {
        CitizenKind::Hardcore
    } else if roll < config.population.hardcore_density + config.population.hanger_on_density {
        CitizenKind::HangerOn
    } else {
        CitizenKind::Observer
    }
}
