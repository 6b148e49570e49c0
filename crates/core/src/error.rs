//! Error types for nodeidw

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for nodeidw operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {name} = {value} ({reason})")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("No samples available to interpolate from")]
    NoSamples,

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Task panicked: {0}")]
    TaskPanicked(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidArgument`].
    pub fn invalid_argument(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for nodeidw operations
pub type Result<T> = std::result::Result<T, Error>;
