//! Error types for the CDF debug bridge
//!
//! Protocol-shape mismatches never reach this type: the sequencer absorbs
//! them. What remains is what a caller can act on.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the CDF debug bridge
#[derive(Error, Debug)]
pub enum Error {
    // === Launch Errors ===
    #[error("A debug backend is already listening on {0}; not starting another one")]
    PortUnavailable(String),

    #[error("Failed to start debug backend: {0}")]
    SpawnFailed(String),

    #[error("Debug backend '{name}' not found. Searched: {searched}")]
    BackendNotFound { name: String, searched: String },

    #[error("Invalid endpoint '{0}', expected host:port")]
    InvalidEndpoint(String),

    // === Backend Connection Errors ===
    #[error("Debug backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("Debug backend closed the connection")]
    BackendCrashed,

    // === DAP Protocol Errors ===
    #[error("DAP protocol error: {0}")]
    DapProtocol(String),

    #[error("DAP request '{command}' failed: {message}")]
    DapRequestFailed { command: String, message: String },

    // === Virtual Document Errors ===
    #[error("No virtual document registered for '{0}'")]
    NotFound(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a backend not found error with search paths
    pub fn backend_not_found<S: AsRef<str>>(name: &str, paths: &[S]) -> Self {
        Self::BackendNotFound {
            name: name.to_string(),
            searched: paths.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Create a DAP request failed error
    pub fn dap_request_failed(command: &str, message: &str) -> Self {
        Self::DapRequestFailed {
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a not found error for a virtual document path
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Whether this error is a user-facing notice rather than a failure
    pub fn is_notice(&self) -> bool {
        matches!(self, Self::PortUnavailable(_))
    }
}
