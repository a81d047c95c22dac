//! Movement Decision Model
//!
//! One pipeline for every agent kind: classify the frozen percept, adjust
//! the inherent desire vector for the agent's kind and state, score each
//! viable destination by the distance-weighted dot product, and plan the
//! cheapest move. A configured fallibility probability swaps the rational
//! choice for a random viable cell.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::agent::{
    AgentId, Category, Citizen, CitizenKind, CitizenState, DesireVector, Enforcer, PlannedMove,
    PlannedState, Position, VisionRadius,
};
use crate::components::grid::{Cell, Neighborhood};
use crate::config::SimParams;
use crate::systems::snapshot::GridView;
use crate::systems::unrest;
use crate::SimRng;

/// State-dependent adjustments to the inherent desire vector, in slot
/// order [violent, active, quiet, enforcer, media, flag, obstacle].
pub mod desire_deltas {
    /// Quiet citizens of any kind keep their distance from enforcers and
    /// flags.
    pub const QUIET: [f32; 7] = [0.0, 0.0, 1.0, -2.0, 0.0, -2.0, 0.0];
    /// Active hardcore citizens drift toward the action.
    pub const HARDCORE_ACTIVE: [f32; 7] = [1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// Violent hardcore citizens push toward other violent agents, the
    /// flags, and the enforcer line.
    pub const HARDCORE_VIOLENT: [f32; 7] = [2.0, 0.0, 0.0, 1.0, 0.0, 2.0, 0.0];
    /// Active hangers-on follow the crowd.
    pub const HANGER_ON_ACTIVE: [f32; 7] = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    /// Active observers edge toward the protest without joining it.
    pub const OBSERVER_ACTIVE: [f32; 7] = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
}

/// Radius of the candidate-move neighborhood.
const MOVE_RADIUS: i32 = 1;

/// The desire vector an agent actually moves by this tick.
///
/// Citizens get a (kind, state)-keyed additive delta; hangers-on and
/// observers that have escalated to violence mimic the model-wide hardcore
/// vector instead of adjusting their own. Non-citizens move by their
/// inherent vector unchanged.
pub fn adjusted_desire(
    inherent: &DesireVector,
    citizen: Option<&Citizen>,
    params: &SimParams,
) -> [f32; Category::COUNT] {
    let Some(citizen) = citizen else {
        return inherent.0;
    };

    let delta = match (citizen.kind, citizen.state) {
        (_, CitizenState::Quiet) => desire_deltas::QUIET,
        (CitizenKind::Hardcore, CitizenState::Active) => desire_deltas::HARDCORE_ACTIVE,
        (CitizenKind::Hardcore, CitizenState::Violent) => desire_deltas::HARDCORE_VIOLENT,
        (CitizenKind::HangerOn, CitizenState::Active) => desire_deltas::HANGER_ON_ACTIVE,
        (CitizenKind::Observer, CitizenState::Active) => desire_deltas::OBSERVER_ACTIVE,
        // Escalation mimicry: milder kinds adopt the hardcore vector
        // wholesale once violent.
        (CitizenKind::HangerOn | CitizenKind::Observer, CitizenState::Violent) => {
            return params.hardcore_desires;
        }
        // Fighting citizens do not move; the vector is unused.
        (_, CitizenState::Fighting) => return inherent.0,
    };

    let mut adjusted = inherent.0;
    for (slot, d) in adjusted.iter_mut().zip(delta.iter()) {
        *slot += d;
    }
    adjusted
}

/// Movement penalty of a candidate destination.
///
/// Distances from every occupied percept cell accumulate into that cell's
/// category bucket; flags accumulate from the whole grid rather than the
/// percept. The penalty is the dot product of the unit-normalized desire
/// vector with the buckets, so strongly desired categories make nearby
/// cells cheap.
pub fn penalty_of(
    view: &GridView,
    percept: &[Cell],
    desire: &[f32; Category::COUNT],
    candidate: Cell,
    origin: Cell,
    vision_radius: i32,
) -> f32 {
    if view.extent().chebyshev(origin, candidate) > vision_radius {
        panic!(
            "candidate ({}, {}) outside the percept of ({}, {})",
            candidate.x, candidate.y, origin.x, origin.y
        );
    }

    let unit = DesireVector::unit(desire);
    let mut buckets = [0.0f32; Category::COUNT];
    for &cell in percept {
        // The flag bucket is filled from the global pass below.
        match view.category_at(cell) {
            Some(Category::Flag) | None => {}
            Some(category) => buckets[category.index()] += cell.distance_to(candidate),
        }
    }
    for &flag in view.flags() {
        buckets[Category::Flag.index()] += flag.distance_to(candidate);
    }

    unit.iter().zip(buckets.iter()).map(|(d, b)| d * b).sum()
}

/// System: plan every mobile agent's destination and every free citizen's
/// next state, in randomized order, against the frozen view.
///
/// Fighting, arrested, engaged, and frozen agents plan nothing; their
/// immobility is enforced again at commit time.
pub fn plan_agents(
    mut rng: ResMut<SimRng>,
    params: Res<SimParams>,
    view: Res<GridView>,
    mut agents: Query<(
        Entity,
        &AgentId,
        &Position,
        &VisionRadius,
        &DesireVector,
        &mut PlannedMove,
        &mut PlannedState,
        Option<&Citizen>,
        Option<&Enforcer>,
    )>,
) {
    // Deterministic base order, then a seeded shuffle: the decision order
    // is random but reproducible.
    let mut order: Vec<(AgentId, Entity)> = agents
        .iter()
        .map(|(entity, id, ..)| (id.clone(), entity))
        .collect();
    order.sort();
    let mut entities: Vec<Entity> = order.into_iter().map(|(_, entity)| entity).collect();
    entities.shuffle(&mut rng.0);

    for entity in entities {
        let Ok((_, _, position, vision, desire, mut planned_move, mut planned_state, citizen, enforcer)) =
            agents.get_mut(entity)
        else {
            continue;
        };

        planned_move.0 = None;
        planned_state.0 = None;

        // Incarcerated citizens have no position and take no decisions.
        let Some(origin) = position.0 else {
            continue;
        };

        if let Some(citizen) = citizen {
            if citizen.is_restrained() {
                continue;
            }
            let summary = unrest::survey(&view, origin, vision.0);
            planned_state.0 = Some(unrest::next_state(citizen, &summary, &params));
        }
        if enforcer.map_or(false, |e| e.engaged || e.frozen) {
            continue;
        }

        let candidates: Vec<Cell> = view
            .neighborhood(origin, MOVE_RADIUS, Neighborhood::Square)
            .into_iter()
            .filter(|&cell| view.is_empty(cell))
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let percept = view.neighborhood(origin, vision.0, Neighborhood::Square);
        let desire = adjusted_desire(desire, citizen, &params);

        let mut best = candidates[0];
        let mut best_penalty = penalty_of(&view, &percept, &desire, best, origin, vision.0);
        for &candidate in &candidates[1..] {
            let penalty = penalty_of(&view, &percept, &desire, candidate, origin, vision.0);
            if penalty < best_penalty {
                best = candidate;
                best_penalty = penalty;
            }
        }

        // Bounded rationality: sometimes the percept is not fully evaluated.
        if rng.0.gen::<f32>() < params.move_fallibility {
            best = *candidates
                .choose(&mut rng.0)
                .expect("candidates checked non-empty");
        }

        planned_move.0 = Some(best);
    }
}
