//! Agent Components
//!
//! Components for the three agent kinds: citizens, enforcers, and media.
//! All of them share the identity/vision/desire components and the planning
//! scratch fields; the kind-specific data lives in its own component.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::grid::Cell;

/// Unique identifier for an agent. Sort order doubles as the deterministic
/// commit order.
#[derive(Component, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

/// Current committed location. `None` while the agent is incarcerated.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(pub Option<Cell>);

/// How far the agent can see, in cells.
#[derive(Component, Debug, Clone, Copy)]
pub struct VisionRadius(pub i32);

/// Visible content categories, in desire-vector slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Violent,
    Active,
    Quiet,
    Enforcer,
    Media,
    Flag,
    Obstacle,
}

impl Category {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        match self {
            Category::Violent => 0,
            Category::Active => 1,
            Category::Quiet => 2,
            Category::Enforcer => 3,
            Category::Media => 4,
            Category::Flag => 5,
            Category::Obstacle => 6,
        }
    }
}

/// An agent's inherent attraction/aversion to each visible category.
/// Fixed at creation; negative values mean avoidance.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct DesireVector(pub [f32; Category::COUNT]);

impl DesireVector {
    pub fn new(weights: [f32; Category::COUNT]) -> Self {
        Self(weights)
    }

    /// Largest absolute weight; scenario validation bounds this.
    pub fn max_magnitude(&self) -> f32 {
        self.0.iter().fold(0.0f32, |acc, w| acc.max(w.abs()))
    }

    /// Unit-length copy of the weights. A zero vector stays zero.
    pub fn unit(weights: &[f32; Category::COUNT]) -> [f32; Category::COUNT] {
        let magnitude = weights.iter().map(|w| w * w).sum::<f32>().sqrt();
        if magnitude == 0.0 {
            return *weights;
        }
        let mut unit = *weights;
        for w in unit.iter_mut() {
            *w /= magnitude;
        }
        unit
    }
}

/// Destination chosen during the decision phase. Scratch: valid only
/// between the plan and commit phases of a single tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlannedMove(pub Option<Cell>);

/// State chosen during the decision phase (citizens only). Scratch, like
/// [`PlannedMove`]. The arrest protocol may overwrite it before commit.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlannedState(pub Option<CitizenState>);

/// Citizen sub-population, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenKind {
    Hardcore,
    HangerOn,
    Observer,
}

/// A citizen's behavioral state. Ordered by escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenState {
    Quiet,
    Active,
    Violent,
    Fighting,
}

/// Civilian agent data.
#[derive(Component, Debug, Clone)]
pub struct Citizen {
    pub kind: CitizenKind,
    pub state: CitizenState,
    /// Economic/social hardship in [0, 1].
    pub hardship: f32,
    /// Belief in the fairness of authority in [0, 1]; eroded by the daily
    /// legitimacy feedback.
    pub perceived_legitimacy: f32,
    /// Willingness to accept arrest risk, fixed at creation from a
    /// kind-dependent range.
    pub risk_tolerance: f32,
    /// Activation threshold for the grievance-vs-risk comparison.
    pub threshold: f32,
    /// Ticks remaining before an engaged fight resolves into arrest.
    pub arrest_delay: i32,
    /// Completed arrests; scales the expected jail term for repeat
    /// offenders.
    pub arrested_count: u32,
    /// Ticks of custody remaining.
    pub jail_time: u32,
    /// Whether the citizen is currently in custody (off the grid).
    pub arrested: bool,
}

impl Citizen {
    pub fn new(
        kind: CitizenKind,
        hardship: f32,
        perceived_legitimacy: f32,
        risk_tolerance: f32,
        threshold: f32,
        arrest_delay: i32,
    ) -> Self {
        Self {
            kind,
            state: CitizenState::Quiet,
            hardship,
            perceived_legitimacy,
            risk_tolerance,
            threshold,
            arrest_delay,
            arrested_count: 0,
            jail_time: 0,
            arrested: false,
        }
    }

    /// Expected benefit of protesting: hardship scaled by how illegitimate
    /// authority currently looks. Floored at zero.
    pub fn perceived_gain(&self) -> f32 {
        (self.hardship * (1.0 - self.perceived_legitimacy)).max(0.0)
    }

    /// Perceived chance of arrest, from the visible enforcer-to-protester
    /// ratio. Zero while already in custody.
    pub fn perceived_risk(
        &self,
        visible_enforcers: usize,
        visible_protesters: usize,
        arrest_constant: f32,
    ) -> f32 {
        if self.arrested {
            return 0.0;
        }
        let ratio = visible_enforcers as f32 / (visible_protesters as f32 + 1.0);
        1.0 - (-arrest_constant * ratio).exp()
    }

    /// Net risk of going active: perceived risk damped by tolerance.
    pub fn net_risk_active(&self, perceived_risk: f32) -> f32 {
        perceived_risk * (1.0 - self.risk_tolerance)
    }

    /// Net risk of going violent: the active risk scaled by the expected
    /// jail term measured in days.
    pub fn net_risk_violent(
        &self,
        net_risk_active: f32,
        jail_time_base: u32,
        ticks_per_day: u64,
    ) -> f32 {
        let term = self.jail_term_if_arrested(jail_time_base) as f32;
        net_risk_active * term / ticks_per_day.max(1) as f32
    }

    /// Jail term a new arrest would carry. Repeat offenders face harsher
    /// expected terms.
    pub fn jail_term_if_arrested(&self, jail_time_base: u32) -> u32 {
        jail_time_base * self.arrested_count.max(1)
    }

    /// Whether the citizen is pinned by a fight or custody and therefore
    /// excluded from planning.
    pub fn is_restrained(&self) -> bool {
        self.arrested || self.state == CitizenState::Fighting
    }
}

/// Law-enforcement agent data. The engagement pairing itself lives in the
/// [`ArrestPairings`] side table, keyed by agent id.
///
/// [`ArrestPairings`]: crate::systems::arrest::ArrestPairings
#[derive(Component, Debug, Clone, Default)]
pub struct Enforcer {
    /// Currently restraining a citizen with a partner.
    pub engaged: bool,
    /// Holds position permanently (cordon duty).
    pub frozen: bool,
}

/// Media agent data.
#[derive(Component, Debug, Clone, Default)]
pub struct Media {
    /// Fighting citizens photographed today; reset at the day boundary.
    pub picture_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_citizen() -> Citizen {
        Citizen::new(CitizenKind::Hardcore, 1.0, 0.0, 0.0, 0.1, 5)
    }

    #[test]
    fn test_perceived_gain_scales_with_legitimacy() {
        let mut citizen = test_citizen();
        assert_eq!(citizen.perceived_gain(), 1.0);

        citizen.perceived_legitimacy = 0.75;
        assert!((citizen.perceived_gain() - 0.25).abs() < 1e-6);

        // Legitimacy restored past 1.0 cannot produce a negative gain.
        citizen.perceived_legitimacy = 1.2;
        assert_eq!(citizen.perceived_gain(), 0.0);
    }

    #[test]
    fn test_perceived_risk_zero_without_enforcers() {
        let citizen = test_citizen();
        assert_eq!(citizen.perceived_risk(0, 0, 1.15), 0.0);
    }

    #[test]
    fn test_perceived_risk_high_when_outnumbered() {
        let citizen = test_citizen();
        // Two enforcers per visible protester reads as near-certain arrest.
        let risk = citizen.perceived_risk(4, 1, 1.15);
        assert!(risk > 0.85, "risk was {risk}");
    }

    #[test]
    fn test_perceived_risk_zero_while_arrested() {
        let mut citizen = test_citizen();
        citizen.arrested = true;
        assert_eq!(citizen.perceived_risk(10, 0, 1.15), 0.0);
    }

    #[test]
    fn test_risk_tolerance_damps_net_risk() {
        let mut citizen = test_citizen();
        citizen.risk_tolerance = 0.8;
        assert!((citizen.net_risk_active(0.5) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_repeat_offenders_face_longer_terms() {
        let mut citizen = test_citizen();
        assert_eq!(citizen.jail_term_if_arrested(10), 10);

        citizen.arrested_count = 3;
        assert_eq!(citizen.jail_term_if_arrested(10), 30);
    }

    #[test]
    fn test_violent_risk_scales_with_term_length() {
        let mut citizen = test_citizen();
        let base = citizen.net_risk_violent(0.6, 12, 24);
        citizen.arrested_count = 2;
        let repeat = citizen.net_risk_violent(0.6, 12, 24);
        assert!((base - 0.3).abs() < 1e-6);
        assert!((repeat - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_unit_vector_normalization() {
        let unit = DesireVector::unit(&[3.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((unit[0] - 0.6).abs() < 1e-6);
        assert!((unit[1] - 0.8).abs() < 1e-6);

        let zero = DesireVector::unit(&[0.0; 7]);
        assert_eq!(zero, [0.0; 7]);
    }

    #[test]
    fn test_max_magnitude() {
        let desire = DesireVector::new([4.0, 2.0, 0.0, -5.0, 3.0, 5.0, -1.0]);
        assert_eq!(desire.max_magnitude(), 5.0);
    }
}
