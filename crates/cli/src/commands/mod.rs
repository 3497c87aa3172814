//! Command implementations.

mod run;
mod validate;

pub use run::run_roster;
pub use validate::run_validate;
