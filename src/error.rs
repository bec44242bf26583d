//! Error types for parhist.

use thiserror::Error;

/// Main error type for parhist.
#[derive(Error, Debug)]
pub enum ParhistError {
    /// Invalid run configuration, reported before any process is created.
    #[error("{0}")]
    Config(String),

    /// Result channel or completion plumbing failure.
    #[error("Channel error: {0}")]
    Channel(String),

    /// Worker-side failure (spawn, input load, transmission).
    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("System call failed: {0}")]
    Sys(#[from] nix::errno::Errno),
}

/// Result type alias for parhist operations.
pub type Result<T> = std::result::Result<T, ParhistError>;
