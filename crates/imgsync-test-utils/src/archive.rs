//! Tar archives standing in for firmware partition images.
//!
//! The fake archiver in [`crate::tools`] unpacks these with `tar`, so tests
//! exercise real extraction without needing 7z installed.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Build a tar archive at `archive` containing `files` as `(path, content)`.
///
/// # Panics
/// Panics if staging the files or running `tar` fails.
pub fn tar_archive(archive: &Path, files: &[(&str, &str)]) {
    let staging = tempfile::TempDir::new().expect("tar_archive: failed to create staging dir");
    for (path, content) in files {
        let full = staging.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("tar_archive: failed to create {}: {e}", parent.display()));
        }
        fs::write(&full, content)
            .unwrap_or_else(|e| panic!("tar_archive: failed to write {}: {e}", full.display()));
    }
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent).unwrap();
    }

    let output = Command::new("tar")
        .arg("-cf")
        .arg(archive)
        .arg("-C")
        .arg(staging.path())
        .arg(".")
        .output()
        .unwrap_or_else(|e| panic!("tar_archive: failed to run tar: {e}"));
    if !output.status.success() {
        panic!(
            "tar_archive: tar failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Content of a `build.prop` carrying the display id marker.
pub fn build_prop(display_id: &str) -> String {
    format!(
        "# begin build properties\nro.build.id=TQ3A\nro.build.display.id={display_id}\nro.build.type=user\n"
    )
}
