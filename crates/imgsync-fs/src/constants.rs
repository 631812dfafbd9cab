//! Well-known names inside a working copy.

use std::path::Path;

/// Root-level entries of a working copy that carry version-control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPath {
    /// The `.git` directory (Git database)
    GitDir,
    /// The `.gitignore` file
    GitIgnore,
    /// The `.gitattributes` file (LFS tracking rules live here)
    GitAttributes,
    /// The `.gitmodules` file
    GitModules,
}

impl RepoPath {
    /// Entries that survive the wipe of an update run.
    pub const PRESERVED_ON_WIPE: [RepoPath; 4] = [
        RepoPath::GitDir,
        RepoPath::GitIgnore,
        RepoPath::GitAttributes,
        RepoPath::GitModules,
    ];

    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitDir => ".git",
            Self::GitIgnore => ".gitignore",
            Self::GitAttributes => ".gitattributes",
            Self::GitModules => ".gitmodules",
        }
    }

    /// Names of [`Self::PRESERVED_ON_WIPE`] as plain strings.
    pub fn preserved_names() -> Vec<&'static str> {
        Self::PRESERVED_ON_WIPE.iter().map(RepoPath::as_str).collect()
    }
}

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
