//! Crate-wide error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced to callers of monitor operations.
///
/// Probe failures never appear here; they are recorded as failed
/// health check results instead.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// SQLite statement failed.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Connection could not be checked out of the pool.
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The provider directory could not be enumerated.
    #[error("Provider directory unavailable: {0}")]
    Directory(String),

    /// No free id was found for a new alert.
    #[error("Alert id {0} and its suffixed variants are all taken")]
    DuplicateAlert(String),

    /// A stored value could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// An HTTP client (webhook) could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking storage task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
