//! Crowd-unrest simulation engine.
//!
//! Citizens on a bounded grid weigh grievance against the risk of arrest
//! and decide each tick whether to stay quiet, protest, or turn violent;
//! enforcer pairs restrain violent citizens while media agents record the
//! fights they can see. Every decision in a tick is taken against a frozen
//! snapshot of the previous tick's grid, then committed in a single pass.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod events;
pub mod output;
pub mod schedule;
pub mod setup;
pub mod systems;

pub use components::*;

/// Seeded random number generator resource.
///
/// Every stochastic draw in the engine goes through this single stream so
/// runs are reproducible from the seed alone.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
