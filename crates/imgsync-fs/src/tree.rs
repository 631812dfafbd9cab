//! Directory-tree operations on working copies
//!
//! Symlinks are never followed: a link is removed or copied as a link, so a
//! firmware image that links outside its own tree cannot make these helpers
//! touch anything beyond the working copy.

use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// How [`publish_dir`] moved a staged directory into place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// Single `rename`, all-or-nothing to an observer
    Atomic,
    /// Copy then remove, used when source and target sit on different devices
    Copied,
}

/// Remove a file or directory tree, failing on the first error.
///
/// A missing path is not an error.
pub fn remove_tree(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| Error::io(path, e))
    }
}

/// Remove a directory tree deepest-first, ignoring individual failures.
///
/// Used for scratch directories left behind by an earlier failed attempt,
/// where a partially cleaned tree is still better than aborting. Returns how
/// many entries could not be removed.
pub fn remove_tree_best_effort(path: &Path) -> usize {
    if fs::symlink_metadata(path).is_err() {
        return 0;
    }

    let mut entries = vec![path.to_path_buf()];
    collect_entries(path, &mut entries);
    // Children sort after their parents, so reverse order is deepest-first.
    entries.sort();
    entries.reverse();

    let mut failures = 0;
    for entry in entries {
        let is_dir = fs::symlink_metadata(&entry)
            .map(|m| m.is_dir())
            .unwrap_or(false);
        let result = if is_dir {
            fs::remove_dir(&entry)
        } else {
            fs::remove_file(&entry)
        };
        if let Err(e) = result
            && e.kind() != ErrorKind::NotFound
        {
            tracing::debug!(path = %entry.display(), error = %e, "Could not remove scratch entry");
            failures += 1;
        }
    }
    failures
}

fn collect_entries(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(read) = fs::read_dir(dir) else {
        return;
    };
    for entry in read.flatten() {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        out.push(path.clone());
        if is_dir {
            collect_entries(&path, out);
        }
    }
}

/// Move a fully staged directory to its final name.
///
/// Anything already at `target` is removed first. The move is a single
/// `rename` when the filesystem allows it; only a cross-device error falls
/// back to a plain copy-then-remove.
pub fn publish_dir(staging: &Path, target: &Path) -> Result<PublishMode> {
    remove_tree(target)?;

    match fs::rename(staging, target) {
        Ok(()) => Ok(PublishMode::Atomic),
        Err(e) if is_cross_device(&e) => {
            tracing::warn!(
                from = %staging.display(),
                to = %target.display(),
                "Atomic rename not supported across devices, copying instead"
            );
            copy_dir_all(staging, target)?;
            remove_tree(staging)?;
            Ok(PublishMode::Copied)
        }
        Err(e) => Err(Error::io(target, e)),
    }
}

fn is_cross_device(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::CrossesDevices || e.raw_os_error() == Some(18)
}

/// Recursively copy `src` into `dest`, recreating symlinks as symlinks.
pub fn copy_dir_all(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    for entry in fs::read_dir(src).map_err(|e| Error::io(src, e))? {
        let entry = entry.map_err(|e| Error::io(src, e))?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| Error::io(&src_path, e))?;

        if file_type.is_dir() {
            copy_dir_all(&src_path, &dest_path)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path).map_err(|e| Error::io(&dest_path, e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(src).map_err(|e| Error::io(src, e))?;
    std::os::unix::fs::symlink(target, dest).map_err(|e| Error::io(dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest).map_err(|e| Error::io(dest, e))?;
    Ok(())
}

/// Remove every root-level entry of `root` whose name is not in `keep`.
///
/// Only names directly under `root` are matched, so a nested `.git` inside
/// extracted content is wiped like any other file. Returns the number of
/// root entries removed.
pub fn wipe_except(root: &Path, keep: &[&str]) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(root).map_err(|e| Error::io(root, e))? {
        let entry = entry.map_err(|e| Error::io(root, e))?;
        let name = entry.file_name();
        if keep.iter().any(|k| name.as_os_str() == *k) {
            continue;
        }
        remove_tree(&entry.path())?;
        removed += 1;
    }
    Ok(removed)
}

/// Regular files under `roots` whose name ends in `.<extension>`.
///
/// Matching is case-insensitive. Roots that do not exist are skipped. The
/// result is ordered by the textual form of each path so that repeated runs
/// over the same tree visit files in the same order.
pub fn files_with_extension(roots: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension.to_lowercase());
    let mut found = Vec::new();

    for root in roots.iter().filter(|r| r.is_dir()) {
        walk_files(root, &mut |path| {
            let matches = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase().ends_with(&suffix))
                .unwrap_or(false);
            if matches {
                found.push(path.to_path_buf());
            }
        })?;
    }

    found.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    found.dedup();
    Ok(found)
}

fn walk_files(dir: &Path, visit: &mut impl FnMut(&Path)) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            walk_files(&path, visit)?;
        } else if file_type.is_file() {
            visit(&path);
        }
    }
    Ok(())
}
