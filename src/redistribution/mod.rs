//! Quarter-close redistribution.
//!
//! When a quarter closes, paces left ungraded in it are flagged unfinished
//! and moved forward into later quarters, keeping each category in
//! sequential order and one pace per category per week. Paces that cannot
//! move are reported as overflow, never dropped.
//!
//! Persistence stays outside this crate behind [`QuarterLookup`] and
//! [`PaceStore`]; [`InMemoryStore`] implements both.

mod memory;
mod redistributor;
mod store;

pub use memory::InMemoryStore;
pub use redistributor::{
    redistribute_unfinished_paces, OverflowPace, RedistributionSummary, Redistributor,
};
pub use store::{PaceStore, QuarterLookup};
