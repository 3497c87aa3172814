//! RosterBlueprint - Config Loader output
//!
//! Describes a people roster driven through a junction: junction settings,
//! the seed models, and a script of updates to feed in.

use serde::{Deserialize, Serialize};

use crate::JunctionConfig;

/// Complete roster configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterBlueprint {
    /// Junction settings
    #[serde(default)]
    pub junction: JunctionConfig,

    /// Seed models
    pub people: Vec<PersonSeed>,

    /// Updates fed to the junction, in order
    #[serde(default)]
    pub updates: Vec<ScriptedUpdate>,

    /// Accept updates for ids absent from `people` (they resolve to "not found")
    #[serde(default)]
    pub allow_unknown: bool,
}

/// One seed model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSeed {
    /// Lookup key
    pub id: u32,
    /// Initial name
    pub name: String,
    /// Initial age
    pub age: u32,
}

/// One scripted update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedUpdate {
    /// Replace a person's name
    Rename { id: u32, name: String },
    /// Increment a person's age by one
    Birthday { id: u32 },
}

impl ScriptedUpdate {
    /// Id of the targeted person
    pub fn id(&self) -> u32 {
        match self {
            Self::Rename { id, .. } | Self::Birthday { id } => *id,
        }
    }
}
