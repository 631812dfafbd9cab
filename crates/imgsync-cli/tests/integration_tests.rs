//! Integration tests for the imgsync CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

/// Get a Command for the imgsync binary with a clean environment
fn imgsync_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("imgsync"));
    for var in [
        "GIT_GROUP_NAME",
        "GIT_HOST",
        "IMGSYNC_REMOTE_ROOT",
        "IMGSYNC_UPLOAD_DIR",
        "IMGSYNC_CONFIG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    imgsync_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("firmware image archives"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("update"));
}

#[test]
fn test_version_output() {
    imgsync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("imgsync"));
}

#[test]
fn test_no_command_shows_help_hint() {
    imgsync_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("imgsync --help"));
}

#[test]
fn test_publish_help_lists_project_flag() {
    imgsync_cmd()
        .args(["publish", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--project"));
}

// ============================================================================
// Argument Errors
// ============================================================================

#[test]
fn test_publish_without_archives_is_a_usage_error() {
    imgsync_cmd()
        .args(["publish", "-p", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<ARCHIVES>"));
}

#[test]
fn test_missing_archive_is_reported() {
    let temp = tempdir().unwrap();
    imgsync_cmd()
        .current_dir(temp.path())
        .args(["publish", "-p", "demo", "absent.7z"])
        .args(["--group", "firmware", "--host", "gitlab.local"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: archive not found: absent.7z"));
}

#[test]
fn test_unset_group_is_a_config_failure() {
    let temp = tempdir().unwrap();
    let archive = temp.path().join("system.7z");
    fs::write(&archive, "not really an archive").unwrap();

    imgsync_cmd()
        .current_dir(temp.path())
        .args(["publish", "-p", "demo"])
        .arg(&archive)
        .args(["--host", "gitlab.local"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("remote group is not set"))
        .stderr(predicate::str::contains("kind: configuration error"));
}

// ============================================================================
// Config Command
// ============================================================================

#[test]
fn test_config_shows_command_line_overrides() {
    imgsync_cmd()
        .args(["config", "--group", "firmware", "--host", "gitlab.local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("group = \"firmware\""))
        .stdout(predicate::str::contains("host = \"gitlab.local\""))
        .stderr(predicate::str::contains("warning").not());
}

#[test]
fn test_config_json_reads_environment() {
    imgsync_cmd()
        .args(["config", "--json"])
        .env("GIT_GROUP_NAME", "vendor-images")
        .env("GIT_HOST", "git.example.com")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"group\": \"vendor-images\""))
        .stdout(predicate::str::contains("\"host\": \"git.example.com\""));
}

#[test]
fn test_config_flags_override_environment() {
    imgsync_cmd()
        .args(["config", "--group", "from-flag"])
        .env("GIT_GROUP_NAME", "from-env")
        .env("GIT_HOST", "git.example.com")
        .assert()
        .success()
        .stdout(predicate::str::contains("group = \"from-flag\""));
}

#[test]
fn test_config_file_is_loaded() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("imgsync.toml");
    fs::write(
        &file,
        "primary_branch = \"release\"\n\n[remote]\ngroup = \"from-file\"\nhost = \"git.example.com\"\n",
    )
    .unwrap();

    imgsync_cmd()
        .arg("config")
        .arg("--config")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("primary_branch = \"release\""))
        .stdout(predicate::str::contains("group = \"from-file\""));
}

#[test]
fn test_config_warns_about_incomplete_settings() {
    imgsync_cmd()
        .arg("config")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning:"))
        .stderr(predicate::str::contains("remote group is not set"));
}

#[test]
fn test_config_output_writes_a_reusable_file() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("saved.json");

    imgsync_cmd()
        .args(["config", "--group", "firmware", "--host", "gitlab.local", "-o"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    assert!(fs::read_to_string(&file).unwrap().contains("\"firmware\""));

    imgsync_cmd()
        .arg("config")
        .arg("--config")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("host = \"gitlab.local\""));
}
