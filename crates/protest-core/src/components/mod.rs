//! Component and resource definitions.

pub mod agent;
pub mod grid;
pub mod world;

pub use agent::{
    AgentId, Category, Citizen, CitizenKind, CitizenState, DesireVector, Enforcer, Media,
    PlannedMove, PlannedState, Position, VisionRadius,
};
pub use grid::{Cell, GridExtent, Neighborhood, ObjectKind, Occupant, OccupancyGrid, Region};
pub use world::SimClock;
