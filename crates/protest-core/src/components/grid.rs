//! Grid Components
//!
//! The arena: a finite cell array with exclusive occupancy, square/diamond
//! neighborhood queries, and optional wraparound.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to another cell.
    pub fn distance_to(&self, other: Cell) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Neighborhood shape for vision and scan queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// Chebyshev radius: the full square around the center.
    Square,
    /// Von Neumann radius: the diamond around the center.
    Diamond,
}

/// Immovable markers placed once at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Obstacle,
    Flag,
}

/// What a grid cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Agent(Entity),
    Object(ObjectKind),
}

/// An axis-aligned rectangle of cells, inclusive on all four edges.
///
/// Scenario files describe placement areas with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x0: i32,
    pub x1: i32,
    pub y0: i32,
    pub y1: i32,
}

impl Region {
    pub fn new(x0: i32, x1: i32, y0: i32, y1: i32) -> Self {
        Self { x0, x1, y0, y1 }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x0 && cell.x <= self.x1 && cell.y >= self.y0 && cell.y <= self.y1
    }

    /// All cells in the region, row-major.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for x in self.x0..=self.x1 {
            for y in self.y0..=self.y1 {
                cells.push(Cell::new(x, y));
            }
        }
        cells
    }

    pub fn cell_count(&self) -> usize {
        let w = (self.x1 - self.x0 + 1).max(0) as usize;
        let h = (self.y1 - self.y0 + 1).max(0) as usize;
        w * h
    }
}

/// Grid dimensions plus the wraparound flag, shared by the live grid and
/// the frozen decision snapshot.
#[derive(Debug, Clone, Copy)]
pub struct GridExtent {
    pub width: i32,
    pub height: i32,
    pub toroidal: bool,
}

impl GridExtent {
    pub fn new(width: i32, height: i32, toroidal: bool) -> Self {
        Self {
            width,
            height,
            toroidal,
        }
    }

    pub fn capacity(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    /// Canonical form of a coordinate: wrapped when toroidal.
    ///
    /// Out-of-bounds coordinates on a bounded grid violate the grid
    /// contract and abort.
    pub fn resolve(&self, cell: Cell) -> Cell {
        if self.toroidal {
            Cell::new(cell.x.rem_euclid(self.width), cell.y.rem_euclid(self.height))
        } else if self.in_bounds(cell) {
            cell
        } else {
            panic!(
                "coordinate ({}, {}) outside bounded {}x{} grid",
                cell.x, cell.y, self.width, self.height
            );
        }
    }

    pub fn index(&self, cell: Cell) -> usize {
        let cell = self.resolve(cell);
        (cell.y as usize) * (self.width as usize) + (cell.x as usize)
    }

    /// Chebyshev distance, accounting for wraparound.
    pub fn chebyshev(&self, a: Cell, b: Cell) -> i32 {
        let dx = self.axis_distance(a.x, b.x, self.width);
        let dy = self.axis_distance(a.y, b.y, self.height);
        dx.max(dy)
    }

    fn axis_distance(&self, a: i32, b: i32, span: i32) -> i32 {
        let d = (a - b).abs();
        if self.toroidal {
            d.min(span - d)
        } else {
            d
        }
    }

    /// Cells within `radius` of `center`, excluding the center itself.
    ///
    /// On a bounded grid, cells past the edge are clipped; on a toroidal
    /// grid they wrap.
    pub fn neighborhood(&self, center: Cell, radius: i32, shape: Neighborhood) -> Vec<Cell> {
        let mut cells = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if shape == Neighborhood::Diamond && dx.abs() + dy.abs() > radius {
                    continue;
                }
                let candidate = Cell::new(center.x + dx, center.y + dy);
                if self.toroidal {
                    cells.push(self.resolve(candidate));
                } else if self.in_bounds(candidate) {
                    cells.push(candidate);
                }
            }
        }
        cells
    }
}

/// Resource: the live arena. At most one occupant per cell.
///
/// Only the commit phase and the arrest/release logic mutate this; the
/// decision phase reads the frozen [`GridView`] instead.
///
/// [`GridView`]: crate::systems::snapshot::GridView
#[derive(Resource, Debug)]
pub struct OccupancyGrid {
    extent: GridExtent,
    cells: Vec<Option<Occupant>>,
    flags: Vec<Cell>,
}

impl OccupancyGrid {
    pub fn new(width: i32, height: i32, toroidal: bool) -> Self {
        let extent = GridExtent::new(width, height, toroidal);
        Self {
            cells: vec![None; extent.capacity()],
            flags: Vec::new(),
            extent,
        }
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    pub fn is_empty(&self, cell: Cell) -> bool {
        self.cells[self.extent.index(cell)].is_none()
    }

    pub fn occupant_at(&self, cell: Cell) -> Option<Occupant> {
        self.cells[self.extent.index(cell)]
    }

    /// Place an occupant on an empty cell.
    ///
    /// Placing onto an occupied cell means the decide/commit pipeline
    /// broke its exclusivity guarantee, so it aborts rather than clobber.
    pub fn place(&mut self, cell: Cell, occupant: Occupant) {
        let index = self.extent.index(cell);
        if self.cells[index].is_some() {
            panic!("cell ({}, {}) already occupied", cell.x, cell.y);
        }
        if let Occupant::Object(ObjectKind::Flag) = occupant {
            self.flags.push(self.extent.resolve(cell));
        }
        self.cells[index] = Some(occupant);
    }

    pub fn clear(&mut self, cell: Cell) {
        let index = self.extent.index(cell);
        self.cells[index] = None;
    }

    /// Every flag position on the grid. Flags are globally visible for
    /// movement-cost purposes, unlike other categories.
    pub fn flags(&self) -> &[Cell] {
        &self.flags
    }

    pub fn neighborhood(&self, center: Cell, radius: i32, shape: Neighborhood) -> Vec<Cell> {
        self.extent.neighborhood(center, radius, shape)
    }

    /// Empty cells inside a region, in row-major order.
    pub fn free_cells_in(&self, region: &Region) -> Vec<Cell> {
        region
            .cells()
            .into_iter()
            .filter(|&c| self.extent.in_bounds(c) && self.is_empty(c))
            .collect()
    }
}
