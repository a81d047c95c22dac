//! Tick-phase systems.
//!
//! Each phase of a tick is one system; `schedule::build_tick_schedule`
//! chains them in the canonical order.

pub mod arrest;
pub mod commit;
pub mod decision;
pub mod legitimacy;
pub mod media;
pub mod snapshot;
pub mod unrest;

pub use arrest::{
    initiate_arrests, resolve_fights, tick_jail_terms, ArrestPairings, Engagement,
    ARREST_SCAN_RADIUS,
};
pub use commit::commit_plans;
pub use decision::{adjusted_desire, penalty_of, plan_agents};
pub use legitimacy::{daily_legitimacy_update, DailyLedger};
pub use media::photograph_fights;
pub use snapshot::{build_grid_view, CellView, GridView};
pub use unrest::{next_state, survey, PerceptSummary};
