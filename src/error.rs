//! Error types for the head pose liveness library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Replay trace could not be read or parsed
    #[error("Trace error: {0}")]
    TraceError(String),

    /// A capture collaborator failed to produce its artifact
    #[error("Capture error: {0}")]
    Capture(String),

    /// The observation channel of a session was closed
    #[error("Session closed: {0}")]
    SessionClosed(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
