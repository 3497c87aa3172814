//! Junction configuration contracts shared across crates.

use serde::{Deserialize, Serialize};

/// Junction configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionConfig {
    /// Instance name (used for logging/metrics)
    #[serde(default = "default_name")]
    pub name: String,

    /// What to do when one input stream closes
    #[serde(default)]
    pub closure_policy: ClosurePolicy,
}

fn default_name() -> String {
    "junction".to_string()
}

impl Default for JunctionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            closure_policy: ClosurePolicy::default(),
        }
    }
}

impl JunctionConfig {
    /// Default configuration with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Reaction to an input stream that reports closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosurePolicy {
    /// Stop the whole dispatcher as soon as any input closes
    #[default]
    Terminate,
    /// Disable only the closed input; stop once every input has closed
    Detach,
}
