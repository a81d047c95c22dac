//! Engine event stream.

pub mod types;

pub use types::{Event, EventKind, TickEvents};
