//! Legitimacy Feedback
//!
//! Once per simulated day, citizens compare today's repression against
//! yesterday's: more jailings, more published fight pictures, or more
//! deployed enforcers erode everyone's perceived legitimacy; a calmer day
//! restores some of it.

use bevy_ecs::prelude::*;
use tracing::info;

use crate::components::agent::{Citizen, Enforcer, Media};
use crate::components::world::SimClock;
use crate::config::SimParams;

/// Resource: day-over-day repression counters.
#[derive(Resource, Debug, Default)]
pub struct DailyLedger {
    pub previous_jailed: usize,
    pub previous_pictures: u64,
    pub previous_enforcers: usize,
    pub current_jailed: usize,
    pub current_pictures: u64,
    pub current_enforcers: usize,
}

impl DailyLedger {
    /// Ledger at simulation start: the enforcer deployment is already
    /// visible on day one, so it opens with a zero delta.
    pub fn new(initial_enforcers: usize) -> Self {
        Self {
            previous_enforcers: initial_enforcers,
            current_enforcers: initial_enforcers,
            ..Self::default()
        }
    }

    /// Roll today's counts in; yesterday's become the baseline.
    pub fn roll(&mut self, jailed: usize, pictures: u64, enforcers: usize) {
        self.previous_jailed = self.current_jailed;
        self.previous_pictures = self.current_pictures;
        self.previous_enforcers = self.current_enforcers;
        self.current_jailed = jailed;
        self.current_pictures = pictures;
        self.current_enforcers = enforcers;
    }

    /// Day-over-day deltas (jailed, pictures, enforcers).
    pub fn deltas(&self) -> (f32, f32, f32) {
        (
            self.current_jailed as f32 - self.previous_jailed as f32,
            self.current_pictures as f32 - self.previous_pictures as f32,
            self.current_enforcers as f32 - self.previous_enforcers as f32,
        )
    }
}

/// System: at each day boundary, decay (or restore) every citizen's
/// perceived legitimacy by the weighted repression trend, and reset the
/// media picture counters for the new day.
///
/// The update is multiplicative: `legitimacy *= exp(-pressure)`. Zero
/// deltas leave legitimacy untouched; a negative trend (less repression
/// than yesterday) pushes it back up.
pub fn daily_legitimacy_update(
    clock: Res<SimClock>,
    params: Res<SimParams>,
    mut ledger: ResMut<DailyLedger>,
    mut citizens: Query<&mut Citizen>,
    mut media: Query<&mut Media>,
    enforcers: Query<&Enforcer>,
) {
    if !clock.is_day_boundary() {
        return;
    }

    let jailed = citizens.iter().filter(|c| c.arrested).count();
    let pictures: u64 = media.iter().map(|m| m.picture_count as u64).sum();
    ledger.roll(jailed, pictures, enforcers.iter().count());

    let (d_jailed, d_pictures, d_enforcers) = ledger.deltas();
    let pressure = d_jailed * params.jailed_sensitivity
        + d_pictures * params.pictures_sensitivity
        + d_enforcers * params.enforcers_sensitivity;
    let factor = (-pressure).exp();

    for mut citizen in citizens.iter_mut() {
        citizen.perceived_legitimacy *= factor;
    }
    for mut m in media.iter_mut() {
        m.picture_count = 0;
    }

    info!(
        day = clock.day() - 1,
        jailed, pictures, pressure, "daily legitimacy update"
    );
}
