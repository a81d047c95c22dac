//! World Setup
//!
//! Builds the arena and places the static objects from the scenario
//! layout.

use crate::components::grid::{ObjectKind, Occupant, OccupancyGrid};
use crate::config::Config;

/// Create the grid and place every obstacle and flag.
pub fn build_grid(config: &Config) -> OccupancyGrid {
    let mut grid = OccupancyGrid::new(config.grid.width, config.grid.height, config.grid.toroidal);

    for region in &config.layout.obstacle_regions {
        for cell in region.cells() {
            grid.place(cell, Occupant::Object(ObjectKind::Obstacle));
        }
    }
    for region in &config.layout.flag_regions {
        for cell in region.cells() {
            grid.place(cell, Occupant::Object(ObjectKind::Flag));
        }
    }

    grid
}
