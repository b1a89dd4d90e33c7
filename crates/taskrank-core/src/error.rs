//! Core error types for taskrank-core.
//!
//! Validation and configuration failures are surfaced to the caller.
//! [`ModelError`] never is: the prioritizer logs it and falls back to the
//! offline heuristic.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskrank-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model scorer errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors in caller-supplied task input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No tasks were supplied
    #[error("Empty batch: please enter at least one task")]
    EmptyBatch,

    /// A task is empty after trimming
    #[error("Task at position {index} is blank")]
    BlankTask { index: usize },

    /// Input looked like a JSON array but did not parse
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Home directory could not be resolved
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration schema
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Reasons the model scorer could not produce a batch.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No API credential was injected
    #[error("No model API credential configured")]
    MissingCredential,

    /// Request did not complete in time
    #[error("Model request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Connection, TLS or body transfer failure
    #[error("Model transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("Model API returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Reply carried no message content
    #[error("Model returned an empty reply")]
    EmptyReply,

    /// Reply did not match the expected schema
    #[error("Malformed model reply: {0}")]
    MalformedReply(String),

    /// Reply had a different number of records than tasks sent
    #[error("Model returned {actual} records for {expected} tasks")]
    CountMismatch { expected: usize, actual: usize },

    /// Local async runtime could not be started
    #[error("Failed to start runtime: {0}")]
    Runtime(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::MalformedReply(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
