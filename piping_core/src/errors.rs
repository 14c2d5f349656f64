//! # Error Types
//!
//! Structured errors for piping_core. Resolvers never return these for
//! missing reference data (they fall back to documented defaults instead);
//! errors are reserved for file I/O, snapshot and config parsing, remote
//! transport and loader failures.
//!
//! ## Example
//!
//! ```rust
//! use piping_core::errors::{EngineError, EngineResult};
//!
//! fn require_positive(field: &str, value: f64) -> EngineResult<f64> {
//!     if value <= 0.0 {
//!         return Err(EngineError::invalid_input(field, value.to_string(), "must be positive"));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(require_positive("nb", -5.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for piping_core operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Structured error type for engine operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EngineError {
    /// An input value is invalid (out of range, unparseable, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A reference row a loader depends on does not exist
    #[error("Reference not found: {table} {key}")]
    ReferenceNotFound { table: String, key: String },

    /// A loader script failed; the tables were left untouched
    #[error("Loader {version} ({name}) failed: {reason}")]
    LoaderFailed {
        version: u64,
        name: String,
        reason: String,
    },

    /// A corrective loader cannot be rolled back automatically
    #[error("Loader {version} ({name}) cannot be reverted; restore the affected rows manually")]
    IrreversibleLoader { version: u64, name: String },

    /// Loaders revert newest first; a later loader is still applied
    #[error("Loader {version} ({name}) cannot be reverted while loader {later_version} is applied")]
    RevertOutOfOrder {
        version: u64,
        name: String,
        later_version: u64,
    },

    /// Remote catalog lookup failed (transport, status or decode)
    #[error("Remote lookup failed: {endpoint} - {reason}")]
    RemoteUnavailable { endpoint: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Snapshot schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl EngineError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a ReferenceNotFound error
    pub fn reference_not_found(table: impl Into<String>, key: impl Into<String>) -> Self {
        EngineError::ReferenceNotFound {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create a LoaderFailed error
    pub fn loader_failed(version: u64, name: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::LoaderFailed {
            version,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a RemoteUnavailable error
    pub fn remote_unavailable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::RemoteUnavailable {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        EngineError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from anything displayable
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        EngineError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry later)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::FileLocked { .. } | EngineError::RemoteUnavailable { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput { .. } => "INVALID_INPUT",
            EngineError::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            EngineError::LoaderFailed { .. } => "LOADER_FAILED",
            EngineError::IrreversibleLoader { .. } => "IRREVERSIBLE_LOADER",
            EngineError::RevertOutOfOrder { .. } => "REVERT_OUT_OF_ORDER",
            EngineError::RemoteUnavailable { .. } => "REMOTE_UNAVAILABLE",
            EngineError::FileError { .. } => "FILE_ERROR",
            EngineError::FileLocked { .. } => "FILE_LOCKED",
            EngineError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EngineError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}
