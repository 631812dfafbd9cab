//! Commit message from the image's build properties

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default location of the marker file inside a working copy
pub const DEFAULT_MARKER_PATH: &str = "system/build.prop";

/// Default key whose value becomes the commit message
pub const DEFAULT_MARKER_KEY: &str = "ro.build.display.id";

/// A `key=value` line in a file of the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMarker {
    /// Relative to the working copy root
    pub path: PathBuf,
    pub key: String,
}

impl Default for BuildMarker {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MARKER_PATH),
            key: DEFAULT_MARKER_KEY.to_string(),
        }
    }
}

impl BuildMarker {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Value of the first `<key>=` line, trimmed. Empty values count as absent.
    pub fn parse(&self, content: &str) -> Option<String> {
        content
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix(self.key.as_str()))
            .filter_map(|rest| rest.trim_start().strip_prefix('='))
            .map(|value| value.trim().to_string())
            .next()
            .filter(|value| !value.is_empty())
    }

    /// Read the marker from `working_copy`.
    pub fn read(&self, working_copy: &Path) -> Result<String> {
        let path = working_copy.join(&self.path);
        if !path.is_file() {
            return Err(Error::MarkerMissing { path });
        }

        let content = std::fs::read(&path).map_err(|e| imgsync_fs::Error::io(&path, e))?;
        self.parse(&String::from_utf8_lossy(&content))
            .ok_or_else(|| Error::MarkerKeyMissing {
                path,
                key: self.key.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("ro.build.display.id=1.2.3\n", Some("1.2.3"))]
    #[case("ro.build.display.id=1.2.3\r\n", Some("1.2.3"))]
    #[case("# props\nro.build.id=X\nro.build.display.id=TQ3A.230805 release-keys\n", Some("TQ3A.230805 release-keys"))]
    #[case("ro.build.display.id = spaced\n", Some("spaced"))]
    #[case("ro.build.display.id=first\nro.build.display.id=second\n", Some("first"))]
    #[case("ro.build.display.id=\n", None)]
    #[case("ro.build.display.idx=nope\n", None)]
    #[case("ro.build.id=X\n", None)]
    fn parse_cases(#[case] content: &str, #[case] expected: Option<&str>) {
        let marker = BuildMarker::default();
        assert_eq!(marker.parse(content).as_deref(), expected);
    }

    #[test]
    fn reads_from_default_location() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("system")).unwrap();
        std::fs::write(
            temp.path().join("system/build.prop"),
            "ro.build.display.id=1.2.3\n",
        )
        .unwrap();

        assert_eq!(BuildMarker::default().read(temp.path()).unwrap(), "1.2.3");
    }

    #[test]
    fn absent_file_is_missing() {
        let temp = TempDir::new().unwrap();
        let err = BuildMarker::default().read(temp.path()).unwrap_err();
        assert!(matches!(err, Error::MarkerMissing { .. }));
    }

    #[test]
    fn absent_key_is_reported_with_key_name() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("system")).unwrap();
        std::fs::write(temp.path().join("system/build.prop"), "ro.build.id=X\n").unwrap();

        let err = BuildMarker::default().read(temp.path()).unwrap_err();
        assert!(matches!(err, Error::MarkerKeyMissing { ref key, .. } if key == DEFAULT_MARKER_KEY));
    }
}
