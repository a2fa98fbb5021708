// src/error.rs

//! Error types for conary-mirror

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the mirror orchestrator and its store
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Initialization failed (database, HTTP client, ...)
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parse failure (import documents, timestamps, ...)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A record was not found
    #[error("{0}")]
    NotFoundError(String),

    /// A record conflicts with an existing one
    #[error("{0}")]
    ConflictError(String),

    /// The command was invoked without anything to do
    #[error("{0}")]
    UsageError(String),

    /// Another run already holds the run lock
    #[error(
        "Another {key} run is already in progress (lock: {path}{})",
        holder_suffix(.holder_pid)
    )]
    LockHeld {
        key: String,
        path: String,
        holder_pid: Option<u32>,
    },

    /// The run finished but at least one error was recorded
    #[error("{0}")]
    MirroringFailed(String),
}

fn holder_suffix(pid: &Option<u32>) -> String {
    pid.map(|pid| format!(", held by PID {pid}")).unwrap_or_default()
}

impl Error {
    /// True for errors raised before any repository was touched
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(self, Self::UsageError(_) | Self::LockHeld { .. })
    }
}
