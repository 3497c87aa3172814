//! # Contracts
//!
//! Frozen interface contracts shared by the junction runtime, the config
//! loader and the CLI. Holds the type descriptors, the construction-time
//! error taxonomies, junction and roster configuration, and termination
//! causes.
//! This crate has no runtime and no async dependencies.

mod config;
mod error;
mod roster;
mod termination;
mod type_desc;

pub use config::*;
pub use error::*;
pub use roster::*;
pub use termination::*;
pub use type_desc::TypeDescriptor;
