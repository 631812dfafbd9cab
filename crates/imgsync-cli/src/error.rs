//! Error types for imgsync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from imgsync-core
    #[error(transparent)]
    Core(#[from] imgsync_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Failure category shown under the message, when there is one.
    pub fn kind(&self) -> Option<imgsync_core::FailureKind> {
        match self {
            Self::Core(e) => Some(e.kind()),
            _ => None,
        }
    }
}
