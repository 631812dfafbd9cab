//! Locating external tool binaries

use std::path::{Path, PathBuf};

/// Pick the program to run for a tool.
///
/// An executable at `preferred` wins; otherwise the bare `fallback` name is
/// returned and left to `PATH` lookup at spawn time.
pub fn find_tool(preferred: &Path, fallback: &str) -> PathBuf {
    if is_executable(preferred) {
        preferred.to_path_buf()
    } else {
        PathBuf::from(fallback)
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_preferred_falls_back_to_name() {
        let temp = TempDir::new().unwrap();
        let found = find_tool(&temp.path().join("7z"), "7z");
        assert_eq!(found, PathBuf::from("7z"));
    }

    #[cfg(unix)]
    #[test]
    fn executable_preferred_wins() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("7z");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(find_tool(&tool, "7z"), tool);
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_preferred_is_ignored() {
        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("apktool");
        std::fs::write(&tool, "not a program").unwrap();

        assert_eq!(find_tool(&tool, "apktool"), PathBuf::from("apktool"));
    }
}
