//! Error types for the licensing crate.

use std::path::PathBuf;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Malformed expiration period code (bad magnitude or unknown unit).
    #[error("invalid expiration period {0:?}")]
    InvalidPeriod(String),

    /// License file could not be read at startup.
    #[error("failed to load license file {path}: {source}")]
    Load {
        /// Path of the license file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// License file could not be rewritten after a mutation.
    #[error("failed to persist license file {path}: {source}")]
    Persist {
        /// Path of the license file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Device log could not be appended to.
    #[error("failed to append to device log {path}: {source}")]
    LogAppend {
        /// Path of the device log.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Device log could not be compacted.
    #[error("failed to compact device log {path}: {source}")]
    LogCompact {
        /// Path of the device log.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
