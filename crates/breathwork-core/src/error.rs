//! Core error types for breathwork-core.
//!
//! A single hierarchy built with thiserror. Validation and timer errors are
//! raised before any state changes; storage errors are reported but never
//! roll back an in-memory mutation.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for breathwork-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad pattern, goal or settings input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session timer refused a transition
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Persistence failures
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Goal lookups
    #[error("Goal error: {0}")]
    Goal(#[from] GoalError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors. Every variant names the offending field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Value outside its allowed range
    #[error("Value {value} for '{field}' is out of range [{min}, {max}]")]
    OutOfBounds {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Empty text field
    #[error("Field '{0}' must not be empty")]
    Empty(String),
}

impl ValidationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::InvalidValue { field, .. } => field,
            ValidationError::OutOfBounds { field, .. } => field,
            ValidationError::Empty(field) => field,
        }
    }
}

/// Session timer errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimerError {
    /// `start()` called while a session is running
    #[error("A breathing session is already running")]
    AlreadyRunning,

    /// Pattern whose cycle has no duration
    #[error("Invalid pattern '{0}': a cycle must have a positive total duration")]
    InvalidPattern(String),

    /// Speed multiplier that is zero, negative or not finite
    #[error("Invalid speed multiplier: {0}")]
    InvalidSpeed(f64),

    /// Unknown pattern id
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Value could not be encoded for key
    #[error("Failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored value could not be decoded
    #[error("Failed to decode '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data directory unavailable
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Goal lookups and progress updates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GoalError {
    #[error("Goal {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseBusy
                    || err.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_field() {
        let err = ValidationError::invalid("inhale", "must be greater than zero");
        assert_eq!(err.field(), "inhale");
        assert!(err.to_string().contains("inhale"));
    }

    #[test]
    fn core_error_wraps_timer_error() {
        let err: CoreError = TimerError::AlreadyRunning.into();
        assert!(matches!(err, CoreError::Timer(TimerError::AlreadyRunning)));
    }
}
