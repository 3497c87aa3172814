//! Termination causes reported by a stopped dispatcher

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a dispatcher stopped
///
/// Every stop closes the snapshot stream; this value is how the owner learns
/// the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationCause {
    /// An input stream closed under `ClosurePolicy::Terminate`
    SourceClosed { binding: usize, name: String },
    /// Every input stream closed under `ClosurePolicy::Detach`
    AllSourcesClosed,
    /// The owner requested shutdown
    Cancelled,
    /// The snapshot stream was dropped, nobody can receive snapshots
    ConsumerGone,
}

impl TerminationCause {
    /// Whether the stop was requested rather than forced by a closed stream
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceClosed { binding, name } => {
                write!(f, "input closed on binding {binding} ({name})")
            }
            Self::AllSourcesClosed => f.write_str("all inputs closed"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::ConsumerGone => f.write_str("snapshot consumer gone"),
        }
    }
}
