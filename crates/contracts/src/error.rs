//! Layered error definitions
//!
//! `ValidationError` covers everything detected before a junction starts any
//! concurrency; `ConfigError` covers loading roster files.

use thiserror::Error;

use crate::TypeDescriptor;

/// Why a set of bindings cannot be attached to an output slot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    // ===== Output Slot Errors =====
    /// The slot has already been written and cannot take another endpoint
    #[error("output slot is not writable: it already holds a {content} endpoint")]
    OutputNotWritableSlot { content: TypeDescriptor },

    /// The slot expects something other than a snapshot stream
    #[error("output slot must expect a snapshot stream, but it expects {actual}")]
    OutputNotStreamType { actual: TypeDescriptor },

    // ===== Binding Shape Errors =====
    /// A binding targets a different model type than the output carries
    #[error("binding {binding}: differing model types, want {expected} got {actual}")]
    ModelTypeMismatch {
        binding: usize,
        expected: TypeDescriptor,
        actual: TypeDescriptor,
    },

    /// The apply rule's value parameter does not match the input element type
    #[error("binding {binding}: apply rule takes {actual} but the input carries {expected}")]
    InvalidApplySignature {
        binding: usize,
        expected: TypeDescriptor,
        actual: TypeDescriptor,
    },

    /// The resolver's parameter or returned model type is wrong
    #[error(
        "binding {binding}: resolver must be fn(&{want_param}) -> Option<ModelRef<{want_model}>>, \
         got fn(&{param}) -> Option<ModelRef<{model}>>"
    )]
    InvalidResolverSignature {
        binding: usize,
        want_param: TypeDescriptor,
        want_model: TypeDescriptor,
        param: TypeDescriptor,
        model: TypeDescriptor,
    },

    /// The locator is neither a fixed reference nor a resolver
    #[error("binding {binding}: model locator must be a fixed model reference or a resolver")]
    InvalidModelKind { binding: usize },

    // ===== Model Identity Errors =====
    /// A fixed model reference does not belong to the supplied model store
    #[error("binding {binding}: fixed model reference is not in the supplied model store")]
    UnknownModel { binding: usize },
}

impl ValidationError {
    /// Create a model type mismatch error
    pub fn model_mismatch(
        binding: usize,
        expected: TypeDescriptor,
        actual: TypeDescriptor,
    ) -> Self {
        Self::ModelTypeMismatch {
            binding,
            expected,
            actual,
        }
    }

    /// Index of the offending binding, if the error concerns one
    pub fn binding(&self) -> Option<usize> {
        match self {
            Self::OutputNotWritableSlot { .. } | Self::OutputNotStreamType { .. } => None,
            Self::ModelTypeMismatch { binding, .. }
            | Self::InvalidApplySignature { binding, .. }
            | Self::InvalidResolverSignature { binding, .. }
            | Self::InvalidModelKind { binding }
            | Self::UnknownModel { binding } => Some(*binding),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    Validation { field: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create configuration parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
