//! Arrest Protocol
//!
//! Two enforcers jointly restrain a violent citizen: the initiator finds a
//! free partner inside the target's reach, both lock into the engagement,
//! and the citizen fights until the countdown expires and custody begins.
//! The pairing is a relation keyed by agent id, updated for both sides in
//! one call, so a half-engaged pair cannot exist.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::components::agent::{
    AgentId, Citizen, CitizenState, Enforcer, PlannedState, Position,
};
use crate::components::grid::{Neighborhood, Occupant, OccupancyGrid};
use crate::components::world::SimClock;
use crate::config::SimParams;
use crate::events::{EventKind, TickEvents};
use crate::systems::snapshot::{CellView, GridView};
use crate::SimRng;

/// How far an enforcer reaches when scanning for violent citizens, and how
/// far around the target a supporting partner may stand. Diamond-shaped.
pub const ARREST_SCAN_RADIUS: i32 = 1;

/// One enforcer's side of an engagement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engagement {
    /// The other enforcer in the pair.
    pub partner: String,
    /// The citizen being restrained.
    pub target: String,
}

/// Resource: the engagement relation, keyed by enforcer agent id.
///
/// Symmetric by construction: `a -> (b, t)` exists iff `b -> (a, t)` does.
#[derive(Resource, Debug, Default)]
pub struct ArrestPairings {
    pairs: HashMap<String, Engagement>,
}

impl ArrestPairings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock two enforcers onto a target. Both entries are written here and
    /// nowhere else; engaging an already-engaged enforcer is a pipeline
    /// bug and aborts.
    pub fn engage(&mut self, arrester: &str, supporter: &str, target: &str) {
        if self.pairs.contains_key(arrester) || self.pairs.contains_key(supporter) {
            panic!("enforcer {arrester} or {supporter} is already engaged");
        }
        self.pairs.insert(
            arrester.to_string(),
            Engagement {
                partner: supporter.to_string(),
                target: target.to_string(),
            },
        );
        self.pairs.insert(
            supporter.to_string(),
            Engagement {
                partner: arrester.to_string(),
                target: target.to_string(),
            },
        );
    }

    /// Tear down the pairing that holds `target`, returning both enforcer
    /// ids. Asymmetric entries mean the relation invariant broke.
    pub fn release_target(&mut self, target: &str) -> Option<(String, String)> {
        let arrester = self
            .pairs
            .iter()
            .find(|(_, engagement)| engagement.target == target)
            .map(|(id, _)| id.clone())?;
        let engagement = self.pairs.remove(&arrester).expect("entry just found");
        let partner_side = self
            .pairs
            .remove(&engagement.partner)
            .unwrap_or_else(|| panic!("pairing for {arrester} has no mirror entry"));
        if partner_side.partner != arrester || partner_side.target != target {
            panic!("pairing for {arrester} and {} is asymmetric", engagement.partner);
        }
        Some((arrester, engagement.partner))
    }

    pub fn engagement_of(&self, enforcer: &str) -> Option<&Engagement> {
        self.pairs.get(enforcer)
    }

    pub fn is_engaged(&self, enforcer: &str) -> bool {
        self.pairs.contains_key(enforcer)
    }

    /// Whether some pair is already restraining this citizen.
    pub fn is_targeted(&self, target: &str) -> bool {
        self.pairs.values().any(|e| e.target == target)
    }

    /// All engagements, keyed by enforcer id.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Engagement)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// System: enforcers not already engaged scan for violent citizens and
/// recruit a free partner to restrain one.
///
/// Runs after planning and before commit: the scan reads the frozen view,
/// and a successful engagement overrides the target's planned state with
/// `Fighting`. Each enforcer initiates at most one arrest per tick.
pub fn initiate_arrests(
    view: Res<GridView>,
    clock: Res<SimClock>,
    mut pairings: ResMut<ArrestPairings>,
    mut events: ResMut<TickEvents>,
    mut enforcers: Query<(Entity, &AgentId, &Position, &mut Enforcer)>,
    mut citizens: Query<(&AgentId, &Citizen, &mut PlannedState)>,
) {
    let mut roster: Vec<(AgentId, Entity)> = enforcers
        .iter()
        .map(|(entity, id, ..)| (id.clone(), entity))
        .collect();
    roster.sort();

    for (arrester_id, arrester_entity) in roster {
        let Ok((_, _, position, enforcer)) = enforcers.get(arrester_entity) else {
            continue;
        };
        if enforcer.engaged {
            continue;
        }
        let Some(origin) = position.0 else {
            continue;
        };

        let mut engaged_target = None;
        'scan: for cell in view.neighborhood(origin, ARREST_SCAN_RADIUS, Neighborhood::Diamond) {
            let CellView::Citizen(citizen_entity, CitizenState::Violent) = view.at(cell) else {
                continue;
            };
            let Ok((citizen_id, _, _)) = citizens.get(citizen_entity) else {
                continue;
            };
            let citizen_id = citizen_id.clone();
            if pairings.is_targeted(&citizen_id.0) {
                continue;
            }

            // A partner must stand within the citizen's own reach.
            for support_cell in view.neighborhood(cell, ARREST_SCAN_RADIUS, Neighborhood::Diamond)
            {
                let CellView::Enforcer(support_entity) = view.at(support_cell) else {
                    continue;
                };
                if support_entity == arrester_entity {
                    continue;
                }
                let Ok((_, support_id, _, support)) = enforcers.get(support_entity) else {
                    continue;
                };
                if support.engaged {
                    continue;
                }
                let support_id = support_id.clone();

                engaged_target = Some((citizen_entity, citizen_id, support_entity, support_id));
                break 'scan;
            }
        }

        let Some((citizen_entity, citizen_id, support_entity, support_id)) = engaged_target else {
            continue;
        };

        // Both sides of the pairing flip together.
        pairings.engage(&arrester_id.0, &support_id.0, &citizen_id.0);
        enforcers
            .get_mut(arrester_entity)
            .expect("arrester exists")
            .3
            .engaged = true;
        enforcers
            .get_mut(support_entity)
            .expect("supporter exists")
            .3
            .engaged = true;

        // The citizen fights regardless of what it planned this tick.
        let (_, _, mut planned_state) = citizens
            .get_mut(citizen_entity)
            .expect("target citizen exists");
        planned_state.0 = Some(CitizenState::Fighting);

        debug!(
            arrester = %arrester_id.0,
            supporter = %support_id.0,
            target = %citizen_id.0,
            "engagement started"
        );
        events.record(
            clock.tick,
            EventKind::Engagement,
            citizen_id.0.clone(),
            vec![arrester_id.0.clone(), support_id.0.clone()],
            "restrained by enforcer pair",
        );
    }
}

/// System: count down active fights and finalize expired ones into
/// custody.
///
/// Runs after commit, so a citizen forced to `Fighting` this tick starts
/// its countdown immediately. The fight resolves once the countdown drops
/// below zero; the citizen leaves the grid, the pairing tears down, and
/// both enforcers are free again next tick.
pub fn resolve_fights(
    clock: Res<SimClock>,
    params: Res<SimParams>,
    mut grid: ResMut<OccupancyGrid>,
    mut pairings: ResMut<ArrestPairings>,
    mut events: ResMut<TickEvents>,
    mut citizens: Query<(Entity, &AgentId, &mut Citizen, &mut Position)>,
    mut enforcers: Query<(&AgentId, &mut Enforcer)>,
) {
    let mut fighters: Vec<(AgentId, Entity)> = citizens
        .iter()
        .filter(|(_, _, citizen, _)| citizen.state == CitizenState::Fighting)
        .map(|(entity, id, ..)| (id.clone(), entity))
        .collect();
    fighters.sort();

    for (citizen_id, entity) in fighters {
        let Ok((_, _, mut citizen, mut position)) = citizens.get_mut(entity) else {
            continue;
        };
        citizen.arrest_delay -= 1;
        if citizen.arrest_delay >= 0 {
            continue;
        }

        // Custody: the sole path that removes a live citizen from the grid.
        // The term is computed before the count increments, so a first
        // offender serves the base term.
        let cell = position
            .0
            .unwrap_or_else(|| panic!("fighting citizen {} has no position", citizen_id.0));
        grid.clear(cell);
        position.0 = None;
        citizen.jail_time = citizen.jail_term_if_arrested(params.jail_time_base);
        citizen.arrested_count += 1;
        citizen.arrested = true;
        citizen.state = CitizenState::Quiet;

        let (arrester, supporter) = pairings
            .release_target(&citizen_id.0)
            .unwrap_or_else(|| panic!("fighting citizen {} has no enforcer pair", citizen_id.0));
        for (id, mut enforcer) in enforcers.iter_mut() {
            if id.0 == arrester || id.0 == supporter {
                enforcer.engaged = false;
            }
        }

        info!(citizen = %citizen_id.0, %arrester, %supporter, "arrest completed");
        events.record(
            clock.tick,
            EventKind::Arrest,
            citizen_id.0.clone(),
            vec![arrester, supporter],
            "taken into custody",
        );
    }
}

/// System: count down jail terms and return released citizens to a free
/// cell of the agent region.
///
/// If the region happens to have no free cell, the release retries next
/// tick.
pub fn tick_jail_terms(
    clock: Res<SimClock>,
    params: Res<SimParams>,
    mut rng: ResMut<SimRng>,
    mut grid: ResMut<OccupancyGrid>,
    mut events: ResMut<TickEvents>,
    mut citizens: Query<(Entity, &AgentId, &mut Citizen, &mut Position)>,
) {
    let mut jailed: Vec<(AgentId, Entity)> = citizens
        .iter()
        .filter(|(_, _, citizen, _)| citizen.arrested)
        .map(|(entity, id, ..)| (id.clone(), entity))
        .collect();
    jailed.sort();

    for (citizen_id, entity) in jailed {
        let Ok((entity, _, mut citizen, mut position)) = citizens.get_mut(entity) else {
            continue;
        };
        citizen.jail_time = citizen.jail_time.saturating_sub(1);
        if citizen.jail_time > 0 {
            continue;
        }

        let free = grid.free_cells_in(&params.agent_region);
        let Some(&cell) = free.choose(&mut rng.0) else {
            continue;
        };
        grid.place(cell, Occupant::Agent(entity));
        position.0 = Some(cell);
        citizen.arrested = false;
        citizen.arrest_delay = params.arrest_delay;

        debug!(citizen = %citizen_id.0, x = cell.x, y = cell.y, "released from custody");
        events.record(
            clock.tick,
            EventKind::Release,
            citizen_id.0.clone(),
            Vec::new(),
            "released from custody",
        );
    }
}
