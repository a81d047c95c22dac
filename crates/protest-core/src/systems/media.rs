//! Media Coverage
//!
//! Media agents photograph every fight they can see, each tick. The daily
//! picture total feeds the legitimacy feedback and the reports.

use bevy_ecs::prelude::*;

use crate::components::agent::{CitizenState, Media, Position, VisionRadius};
use crate::components::grid::Neighborhood;
use crate::systems::snapshot::{CellView, GridView};

/// System: count visible fighting citizens into each media agent's daily
/// picture tally. Reads the frozen view, like every other decision input.
pub fn photograph_fights(
    view: Res<GridView>,
    mut media: Query<(&Position, &VisionRadius, &mut Media)>,
) {
    for (position, vision, mut media) in media.iter_mut() {
        let Some(origin) = position.0 else {
            continue;
        };
        let visible_fights = view
            .neighborhood(origin, vision.0, Neighborhood::Square)
            .into_iter()
            .filter(|&cell| matches!(view.at(cell), CellView::Citizen(_, CitizenState::Fighting)))
            .count();
        media.picture_count += visible_fights as u32;
    }
}
