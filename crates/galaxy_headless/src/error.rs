//! Errors raised by the headless runner.

use std::path::PathBuf;

use galaxy_core::error::GameError;
use thiserror::Error;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Everything that can stop a headless run.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// A file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A config file was read but rejected.
    #[error("Invalid config {path}: {source}")]
    Config {
        /// Config file.
        path: PathBuf,
        /// Parse or validation failure.
        #[source]
        source: GameError,
    },

    /// The simulation hit a broken invariant.
    #[error("Simulation error: {0}")]
    Simulation(#[from] GameError),

    /// Results could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The worker pool could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl HeadlessError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
