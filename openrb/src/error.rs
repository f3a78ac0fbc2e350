//! Error types for openrb.

use std::io;
use thiserror::Error;

/// Result type for openrb operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for openrb operations.
///
/// Upload outcomes (firmware missing, tool not found, tool failure)
/// are deliberately not errors: they are terminal exit statuses and
/// live in [`crate::UploadOutcome`].
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations, subprocess spawning).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Containerized build step failed.
    #[error("Build error: {0}")]
    Build(String),
}
