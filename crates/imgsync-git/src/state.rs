//! Version-control state of a working copy, as found on disk

use std::fmt;
use std::path::Path;

use git2::{Repository, RepositoryState};
use imgsync_fs::RepoPath;

use crate::Result;

/// Name of the remote every working copy pushes to
pub const REMOTE_NAME: &str = "origin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingCopyState {
    /// No `.git` directory
    Uninitialized,
    /// A repository without an `origin` remote
    Initialized,
    /// `origin` is configured
    RemoteLinked,
    /// Pushed in this run
    Synced,
}

impl WorkingCopyState {
    /// Inspect `working_copy`. Never reports [`WorkingCopyState::Synced`].
    pub fn detect(working_copy: &Path) -> Result<Self> {
        if !working_copy.join(RepoPath::GitDir.as_str()).exists() {
            return Ok(Self::Uninitialized);
        }

        let repo = Repository::open(working_copy)?;
        let state = match repo.find_remote(REMOTE_NAME) {
            Ok(_) => Self::RemoteLinked,
            Err(e) if e.code() == git2::ErrorCode::NotFound => Self::Initialized,
            Err(e) => return Err(e.into()),
        };
        Ok(state)
    }
}

/// Whether `working_copy` is stopped in the middle of a rebase.
pub fn rebase_in_progress(working_copy: &Path) -> Result<bool> {
    if !working_copy.join(RepoPath::GitDir.as_str()).exists() {
        return Ok(false);
    }
    let repo = Repository::open(working_copy)?;
    Ok(matches!(
        repo.state(),
        RepositoryState::Rebase
            | RepositoryState::RebaseInteractive
            | RepositoryState::RebaseMerge
            | RepositoryState::ApplyMailboxOrRebase
    ))
}

impl fmt::Display for WorkingCopyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::RemoteLinked => "remote-linked",
            Self::Synced => "synced",
        };
        f.write_str(name)
    }
}
