//! Per-project advisory lock
//!
//! One run at a time may touch a working copy. The lock file is a sibling of
//! the working copy, never inside it, so it is not picked up by `git add .`.

use crate::{Error, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive advisory lock scoped to one working-copy path.
///
/// Released when dropped.
#[derive(Debug)]
pub struct WorkingCopyLock {
    file: File,
    path: PathBuf,
}

impl WorkingCopyLock {
    /// Lock file path for a working copy: `<parent>/.<name>.lock`.
    pub fn lock_path(working_copy: &Path) -> PathBuf {
        let name = working_copy
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        working_copy.with_file_name(format!(".{name}.lock"))
    }

    /// Try to take the lock without blocking.
    ///
    /// Returns [`Error::Locked`] when another holder owns it.
    pub fn acquire(working_copy: &Path) -> Result<Self> {
        let path = Self::lock_path(working_copy);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;

        if file.try_lock_exclusive().is_err() {
            return Err(Error::Locked { path });
        }

        tracing::debug!(lock = %path.display(), "Acquired working copy lock");
        Ok(Self { file, path })
    }

    /// Path of the underlying lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkingCopyLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(lock = %self.path.display(), error = %e, "Failed to release working copy lock");
        }
    }
}
