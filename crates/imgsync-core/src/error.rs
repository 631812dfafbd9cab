//! Error types for imgsync-core

use std::fmt;

use imgsync_git::FailureClass;

/// Result type for imgsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// An external tool exited nonzero outside its tolerated codes
    ToolInvocationFailure,
    /// An expected file or directory is absent
    MissingPrerequisite,
    /// Required marker or manifest content could not be interpreted
    ParseFailure,
    /// Remote unreachable, push rejected or provisioning refused
    EnvironmentFailure,
    /// A tool did not finish within its deadline
    Timeout,
    /// Another run holds the working copy
    Locked,
    Io,
    Config,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ToolInvocationFailure => "tool invocation failure",
            Self::MissingPrerequisite => "missing prerequisite",
            Self::ParseFailure => "parse failure",
            Self::EnvironmentFailure => "environment failure",
            Self::Timeout => "timeout",
            Self::Locked => "locked",
            Self::Io => "I/O error",
            Self::Config => "configuration error",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in imgsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings are incomplete or inconsistent
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Every uploaded archive was empty
    #[error("No non-empty archives uploaded for project '{project}'")]
    NoArchives { project: String },

    #[error("Provisioning {group}/{project} failed: {message}")]
    Provision {
        group: String,
        project: String,
        message: String,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from imgsync-fs
    #[error(transparent)]
    Fs(#[from] imgsync_fs::Error),

    /// Extraction or decoding error from imgsync-unpack
    #[error(transparent)]
    Unpack(#[from] imgsync_unpack::Error),

    /// Synchronization error from imgsync-git
    #[error(transparent)]
    Git(#[from] imgsync_git::Error),
}

impl Error {
    /// Which failure class this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Config { .. } => FailureKind::Config,
            Self::NoArchives { .. } => FailureKind::MissingPrerequisite,
            Self::Provision { .. } => FailureKind::EnvironmentFailure,
            Self::Fs(e) => fs_kind(e),
            Self::Unpack(e) => unpack_kind(e),
            Self::Git(e) => git_kind(e),
        }
    }
}

fn fs_kind(error: &imgsync_fs::Error) -> FailureKind {
    use imgsync_fs::Error as E;
    match error {
        E::Io { .. } => FailureKind::Io,
        E::Locked { .. } => FailureKind::Locked,
        E::ConfigParse { .. }
        | E::ConfigSerialize { .. }
        | E::UnsupportedFormat { .. }
        | E::InvalidIdentifier { .. } => FailureKind::Config,
    }
}

fn process_kind(error: &imgsync_process::Error) -> FailureKind {
    match error {
        imgsync_process::Error::Timeout { .. } => FailureKind::Timeout,
        _ => FailureKind::ToolInvocationFailure,
    }
}

fn unpack_kind(error: &imgsync_unpack::Error) -> FailureKind {
    use imgsync_unpack::Error as E;
    match error {
        E::MissingPrerequisite { .. } => FailureKind::MissingPrerequisite,
        E::ParseFailure { .. } => FailureKind::ParseFailure,
        E::Tool(e) => process_kind(e),
        E::Fs(e) => fs_kind(e),
    }
}

fn git_kind(error: &imgsync_git::Error) -> FailureKind {
    use imgsync_git::Error as E;
    match error {
        E::Git(_) => FailureKind::ToolInvocationFailure,
        E::Fs(e) => fs_kind(e),
        E::Populate(e) => unpack_kind(e),
        E::Step { source, class, .. } => match (process_kind(source), class) {
            (FailureKind::Timeout, _) => FailureKind::Timeout,
            (_, FailureClass::Environment) => FailureKind::EnvironmentFailure,
            (_, FailureClass::ToolInvocation) => FailureKind::ToolInvocationFailure,
        },
        E::MarkerMissing { .. } => FailureKind::MissingPrerequisite,
        E::MarkerKeyMissing { .. } => FailureKind::ParseFailure,
    }
}
