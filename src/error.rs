//! Error types for artifact-sync
//!
//! The variants follow the failure classes of a sync pass:
//! - Missing or invalid configuration (the only fatal class)
//! - Transport failures talking to the GitHub API
//! - Filesystem failures preparing the extraction directory
//! - Corrupt or unreadable archives
//! - Marker (de)serialization

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for artifact-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for artifact-sync
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment key that caused the error (e.g., "GITHUB_TOKEN")
        key: Option<String>,
    },

    /// Network error (connection refused, DNS, TLS, body read, ...)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status code
    #[error("HTTP {status} from {url}")]
    Http {
        /// Status code returned by the server
        status: u16,
        /// Request URL
        url: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The extraction target exists but is not a directory
    #[error("'{}' is not a directory", .path.display())]
    NotADirectory {
        /// The offending path
        path: PathBuf,
    },

    /// Some entries of the extraction directory could not be removed
    #[error("failed to remove {failed} item(s) from '{}'", .path.display())]
    DirectoryCleanup {
        /// Directory being emptied
        path: PathBuf,
        /// Number of entries that could not be removed
        failed: usize,
    },

    /// Archive extraction error
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Archive extraction errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The payload is not a readable zip archive
    #[error("'{}' is not a valid zip file: {reason}", .archive.display())]
    CorruptArchive {
        /// Path to the archive
        archive: PathBuf,
        /// Reason reported by the zip reader
        reason: String,
    },

    /// The archive opened but an entry could not be written out
    #[error("extraction of '{}' failed: {reason}", .archive.display())]
    ExtractionFailed {
        /// Path to the archive
        archive: PathBuf,
        /// The reason extraction failed
        reason: String,
    },
}

impl Error {
    /// Whether this error must stop the process
    ///
    /// Only configuration errors are fatal; everything else is logged and the
    /// sync pass finishes normally.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config { .. })
    }

    /// Shorthand for a missing required environment key
    pub fn missing_key(key: &str) -> Self {
        Error::Config {
            message: format!("{} is not set", key),
            key: Some(key.to_string()),
        }
    }
}
