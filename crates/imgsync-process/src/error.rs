//! Error types for tool invocation

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while running an external tool
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The program could not be started at all
    #[error("Failed to start {tool} ({program}): {source}")]
    Spawn {
        tool: String,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Subprocess exited nonzero and the step's policy does not tolerate it
    #[error("{tool} failed (exit code {code}):\n{output}")]
    Failed {
        /// Label of the failing step
        tool: String,
        /// Exit code, `-1` when terminated by a signal
        code: i32,
        /// Combined stdout/stderr
        output: String,
    },

    /// Deadline expired; the child was killed
    #[error("{tool} did not finish within {after:?}; output so far:\n{output}")]
    Timeout {
        tool: String,
        after: Duration,
        output: String,
    },

    /// I/O error while talking to a running child
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for tool invocation
pub type Result<T> = std::result::Result<T, Error>;
