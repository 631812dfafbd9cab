//! Error types for imgsync-unpack

use std::path::PathBuf;

/// Result type for imgsync-unpack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting or decoding
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An expected directory or file is absent
    #[error("Missing prerequisite at {path}: {message}")]
    MissingPrerequisite { path: PathBuf, message: String },

    /// Tool output could not be interpreted
    #[error("Failed to parse {path}: {message}")]
    ParseFailure { path: PathBuf, message: String },

    #[error(transparent)]
    Tool(#[from] imgsync_process::Error),

    #[error(transparent)]
    Fs(#[from] imgsync_fs::Error),
}
