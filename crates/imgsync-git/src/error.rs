//! Error types for imgsync-git

use std::path::PathBuf;

use crate::steps::FailureClass;

/// Result type for imgsync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synchronizing a working copy
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] imgsync_fs::Error),

    #[error(transparent)]
    Populate(#[from] imgsync_unpack::Error),

    /// A git step whose policy is fatal exited nonzero, timed out or could
    /// not be started
    #[error("git {step} failed: {source}")]
    Step {
        step: &'static str,
        class: FailureClass,
        #[source]
        source: imgsync_process::Error,
    },

    #[error("Build marker file not found: {path}")]
    MarkerMissing { path: PathBuf },

    #[error("Build marker {path} has no value for '{key}'")]
    MarkerKeyMissing { path: PathBuf, key: String },
}
