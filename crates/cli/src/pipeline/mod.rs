//! Roster junction wiring and run statistics.

mod roster;
mod stats;

pub use roster::{Person, RosterJunction};
pub use stats::RunStats;
