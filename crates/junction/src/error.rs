//! Junction error types

use thiserror::Error;

pub use contracts::ValidationError;

/// Junction-specific errors
#[derive(Debug, Error)]
pub enum JunctionError {
    /// Bindings rejected before start
    #[error("invalid junction: {0}")]
    Validation(#[from] ValidationError),

    /// The worker task ended without reporting a termination
    #[error("junction '{name}' worker failed: {message}")]
    Worker { name: String, message: String },
}

impl JunctionError {
    /// Create a worker failure error
    pub fn worker(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Worker {
            name: name.into(),
            message: message.into(),
        }
    }
}
