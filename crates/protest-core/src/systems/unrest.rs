//! Citizen State Machine
//!
//! The grievance-vs-risk comparison that drives a free citizen between
//! quiet, active, and violent. Fighting and custody are entered and left
//! only through the arrest protocol.

use crate::components::agent::{Citizen, CitizenState};
use crate::components::grid::{Cell, Neighborhood};
use crate::config::SimParams;
use crate::systems::snapshot::{CellView, GridView};

/// What a citizen saw when it last weighed its options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerceptSummary {
    /// Enforcers within vision.
    pub visible_enforcers: usize,
    /// Citizens within vision that are active, violent, or fighting.
    pub visible_protesters: usize,
}

/// Count the enforcers and protesting citizens visible from `origin`.
pub fn survey(view: &GridView, origin: Cell, vision_radius: i32) -> PerceptSummary {
    let mut summary = PerceptSummary::default();
    for cell in view.neighborhood(origin, vision_radius, Neighborhood::Square) {
        match view.at(cell) {
            CellView::Enforcer(_) => summary.visible_enforcers += 1,
            CellView::Citizen(_, state) => {
                if state != CitizenState::Quiet {
                    summary.visible_protesters += 1;
                }
            }
            _ => {}
        }
    }
    summary
}

/// The state a free citizen plans for the next tick.
///
/// Escalation to violence carries the extra weight of the expected jail
/// term, which grows with prior arrests.
pub fn next_state(citizen: &Citizen, summary: &PerceptSummary, params: &SimParams) -> CitizenState {
    let gain = citizen.perceived_gain();
    let risk = citizen.perceived_risk(
        summary.visible_enforcers,
        summary.visible_protesters,
        params.arrest_constant,
    );
    let net_active = citizen.net_risk_active(risk);
    let net_violent =
        citizen.net_risk_violent(net_active, params.jail_time_base, params.ticks_per_day);

    if gain - net_violent > citizen.threshold {
        CitizenState::Violent
    } else if gain - net_active > citizen.threshold {
        CitizenState::Active
    } else {
        CitizenState::Quiet
    }
}
