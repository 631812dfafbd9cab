//! [`TestWorkspace`] builder for pipeline test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::{archive, git};

/// A temporary directory laid out like a deployment:
///
/// - `uploads/`: working copies, one per project
/// - `remotes/`: bare repositories standing in for the hosting provider
/// - `bin/`: fake tool scripts
/// - `inbox/`: archives to upload
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty temporary workspace.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.root().join("uploads")
    }

    pub fn remote_root(&self) -> PathBuf {
        self.root().join("remotes")
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.root().join("bin")
    }

    pub fn working_copy(&self, project: &str) -> PathBuf {
        self.upload_dir().join(project)
    }

    /// Create the bare remote a project in `group` would push to.
    pub fn bare_remote(&self, group: &str, project: &str) -> PathBuf {
        git::bare_remote(&self.remote_root(), group, &project.to_lowercase())
    }

    /// Write a tar archive named `name` into `inbox/`.
    pub fn archive(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = self.root().join("inbox").join(name);
        archive::tar_archive(&path, files);
        path
    }

    /// Assert that `path` (relative to the project's working copy) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, project: &str, path: &str) {
        let full_path = self.working_copy(project).join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the project's working copy) does not exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, project: &str, path: &str) {
        let full_path = self.working_copy(project).join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, project: &str, path: &str, content: &str) {
        let full_path = self.working_copy(project).join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }

    /// Root-level entry names of a project's working copy, sorted.
    pub fn root_entries(&self, project: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.working_copy(project))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
