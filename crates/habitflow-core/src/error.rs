//! Core error types for habitflow-core.
//!
//! Errors are deliberately coarse: persistence problems are non-fatal by
//! contract (callers fall back to defaults or retry on the next mutation),
//! and invalid configuration is clamped at the boundary rather than
//! rejected. What remains is a small thiserror hierarchy.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for habitflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Snapshot store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Snapshot-store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read a persisted snapshot
    #[error("Failed to read snapshot '{key}' at {}: {source}", path.display())]
    ReadFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a snapshot
    #[error("Failed to write snapshot '{key}' at {}: {source}", path.display())]
    WriteFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove a snapshot
    #[error("Failed to remove snapshot '{key}': {source}")]
    RemoveFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Store backend is unavailable
    #[error("Snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {}: {message}", path.display())]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {}: {message}", path.display())]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown or unparsable configuration key
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid field value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Referenced entity does not exist
    #[error("Unknown {kind}: {id}")]
    UnknownEntity { kind: &'static str, id: String },
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
