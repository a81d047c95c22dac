//! Decision Snapshot
//!
//! Freezes the grid at tick start into a classified view. The entire
//! decision phase reads this view and nothing else, so no agent can
//! observe another agent's in-progress plan for the same tick.

use bevy_ecs::prelude::*;

use crate::components::agent::{Category, Citizen, CitizenState, Enforcer, Media};
use crate::components::grid::{
    Cell, GridExtent, Neighborhood, ObjectKind, Occupant, OccupancyGrid,
};

/// Classified content of one frozen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    Enforcer(Entity),
    Media(Entity),
    Citizen(Entity, CitizenState),
    Object(ObjectKind),
}

impl CellView {
    /// Desire-vector category for this cell, `None` when empty.
    ///
    /// Fighting citizens count as violent for distance purposes.
    pub fn category(&self) -> Option<Category> {
        match self {
            CellView::Empty => None,
            CellView::Enforcer(_) => Some(Category::Enforcer),
            CellView::Media(_) => Some(Category::Media),
            CellView::Citizen(_, state) => Some(match state {
                CitizenState::Quiet => Category::Quiet,
                CitizenState::Active => Category::Active,
                CitizenState::Violent | CitizenState::Fighting => Category::Violent,
            }),
            CellView::Object(ObjectKind::Flag) => Some(Category::Flag),
            CellView::Object(ObjectKind::Obstacle) => Some(Category::Obstacle),
        }
    }
}

/// Resource: the previous-tick-frozen view of the grid.
#[derive(Resource, Debug)]
pub struct GridView {
    extent: GridExtent,
    cells: Vec<CellView>,
    flags: Vec<Cell>,
}

impl GridView {
    /// An all-empty view with the grid's dimensions; rebuilt each tick.
    pub fn empty(extent: GridExtent) -> Self {
        Self {
            cells: vec![CellView::Empty; extent.capacity()],
            flags: Vec::new(),
            extent,
        }
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    pub fn at(&self, cell: Cell) -> CellView {
        self.cells[self.extent.index(cell)]
    }

    pub fn is_empty(&self, cell: Cell) -> bool {
        self.at(cell) == CellView::Empty
    }

    pub fn category_at(&self, cell: Cell) -> Option<Category> {
        self.at(cell).category()
    }

    /// Flag positions, visible from anywhere on the grid.
    pub fn flags(&self) -> &[Cell] {
        &self.flags
    }

    pub fn neighborhood(&self, center: Cell, radius: i32, shape: Neighborhood) -> Vec<Cell> {
        self.extent.neighborhood(center, radius, shape)
    }
}

/// System: rebuild the frozen view from the live grid.
///
/// Runs first in the tick, before any plan is made. An occupant entity
/// that carries none of the three agent kinds means the spawn pipeline is
/// broken, and the tick aborts.
pub fn build_grid_view(
    grid: Res<OccupancyGrid>,
    mut view: ResMut<GridView>,
    citizens: Query<&Citizen>,
    enforcers: Query<&Enforcer>,
    media: Query<&Media>,
) {
    let extent = grid.extent();
    view.flags.clear();
    view.flags.extend_from_slice(grid.flags());

    for y in 0..extent.height {
        for x in 0..extent.width {
            let cell = Cell::new(x, y);
            let index = extent.index(cell);
            view.cells[index] = match grid.occupant_at(cell) {
                None => CellView::Empty,
                Some(Occupant::Object(kind)) => CellView::Object(kind),
                Some(Occupant::Agent(entity)) => {
                    if let Ok(citizen) = citizens.get(entity) {
                        CellView::Citizen(entity, citizen.state)
                    } else if enforcers.get(entity).is_ok() {
                        CellView::Enforcer(entity)
                    } else if media.get(entity).is_ok() {
                        CellView::Media(entity)
                    } else {
                        panic!("occupant at ({x}, {y}) has no recognized agent kind");
                    }
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fighting_collapses_to_violent() {
        let entity = Entity::from_raw(1);
        let fighting = CellView::Citizen(entity, CitizenState::Fighting);
        let violent = CellView::Citizen(entity, CitizenState::Violent);
        assert_eq!(fighting.category(), Some(Category::Violent));
        assert_eq!(violent.category(), Some(Category::Violent));
    }

    #[test]
    fn test_object_categories() {
        assert_eq!(
            CellView::Object(ObjectKind::Flag).category(),
            Some(Category::Flag)
        );
        assert_eq!(
            CellView::Object(ObjectKind::Obstacle).category(),
            Some(Category::Obstacle)
        );
        assert_eq!(CellView::Empty.category(), None);
    }

    #[test]
    fn test_view_rebuild_matches_grid() {
        let mut world = World::new();
        let mut grid = OccupancyGrid::new(4, 4, false);

        let citizen = world
            .spawn(Citizen::new(
                crate::components::agent::CitizenKind::Hardcore,
                0.5,
                0.5,
                0.5,
                0.1,
                5,
            ))
            .id();
        grid.place(Cell::new(1, 1), Occupant::Agent(citizen));
        grid.place(Cell::new(0, 3), Occupant::Object(ObjectKind::Flag));

        let view = GridView::empty(grid.extent());
        world.insert_resource(grid);
        world.insert_resource(view);

        let mut schedule = Schedule::default();
        schedule.add_systems(build_grid_view);
        schedule.run(&mut world);

        let view = world.resource::<GridView>();
        assert_eq!(view.category_at(Cell::new(1, 1)), Some(Category::Quiet));
        assert_eq!(view.category_at(Cell::new(0, 3)), Some(Category::Flag));
        assert!(view.is_empty(Cell::new(2, 2)));
        assert_eq!(view.flags(), &[Cell::new(0, 3)]);
    }
}
