//! Core error types for bmcprobe

use thiserror::Error;

/// Core error type for domain-level failures
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field was absent from a remote resource
    #[error("Required field '{field}' missing from {resource}")]
    MissingField { resource: String, field: String },

    /// A field was present but had an unexpected type or value
    #[error("Invalid value for '{field}' in {resource}: {message}")]
    InvalidField {
        resource: String,
        field: String,
        message: String,
    },

    /// `PowerState` value other than the terminal `On`/`Off`
    #[error("Invalid power state: {0}")]
    UnknownPowerState(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
