//! Commit Phase
//!
//! Applies every planned state and planned move in one pass over the live
//! grid, in ascending agent-id order. Plans were computed from the frozen
//! pre-tick view, so two agents can race for the same cell; the loser of
//! that race stays in place after the destination is re-validated here.

use bevy_ecs::prelude::*;

use crate::components::agent::{
    AgentId, Citizen, CitizenState, Enforcer, PlannedMove, PlannedState, Position,
};
use crate::components::grid::{Occupant, OccupancyGrid};
use crate::components::world::SimClock;
use crate::events::{EventKind, TickEvents};

/// System: commit planned states, then planned positions.
///
/// State first: a citizen forced to `Fighting` by the arrest protocol must
/// not walk away on the same tick. Planned fields are cleared afterwards
/// so stale plans can never leak into a later tick.
pub fn commit_plans(
    clock: Res<SimClock>,
    mut grid: ResMut<OccupancyGrid>,
    mut events: ResMut<TickEvents>,
    mut agents: Query<(
        Entity,
        &AgentId,
        &mut Position,
        &mut PlannedMove,
        &mut PlannedState,
        Option<&mut Citizen>,
        Option<&Enforcer>,
    )>,
) {
    let mut order: Vec<(AgentId, Entity)> = agents
        .iter()
        .map(|(entity, id, ..)| (id.clone(), entity))
        .collect();
    order.sort();

    for (agent_id, entity) in order {
        let Ok((entity, _, mut position, mut planned_move, mut planned_state, citizen, enforcer)) =
            agents.get_mut(entity)
        else {
            continue;
        };

        let mut held_in_place = enforcer.map_or(false, |e| e.engaged || e.frozen);

        if let Some(mut citizen) = citizen {
            if let Some(next) = planned_state.0.take() {
                if citizen.state != next {
                    events.record(
                        clock.tick,
                        EventKind::StateChange,
                        agent_id.0.clone(),
                        Vec::new(),
                        format!("{:?} -> {:?}", citizen.state, next),
                    );
                    citizen.state = next;
                }
            }
            held_in_place |= citizen.is_restrained();
        }

        let destination = planned_move.0.take();
        if held_in_place {
            continue;
        }
        let (Some(origin), Some(destination)) = (position.0, destination) else {
            continue;
        };
        if destination == origin {
            continue;
        }
        // Decide-before-commit means another agent may have claimed this
        // cell already; losers of the race stay put.
        if !grid.is_empty(destination) {
            continue;
        }
        grid.clear(origin);
        grid.place(destination, Occupant::Agent(entity));
        position.0 = Some(destination);
    }
}
