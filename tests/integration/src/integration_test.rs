//! End-to-end integration test for the vertical slice
//!
//! This test exercises the complete flow: settings file -> upload staging ->
//! extraction -> package decoding -> commit -> push, then inspects the remote
//! with git2 directly.

#![cfg(unix)]

use std::fs;
use std::path::Path;

use git2::Repository;
use imgsync_core::{ArchiveUpload, Mode, PipelineOrchestrator, Settings, UploadRequest};
use imgsync_test_utils::archive::build_prop;
use imgsync_test_utils::git::{TEST_AUTHOR_EMAIL, TEST_AUTHOR_NAME};
use imgsync_test_utils::tools;
use imgsync_test_utils::workspace::TestWorkspace;
use pretty_assertions::assert_eq;

const GROUP: &str = "firmware";

/// Write a YAML settings file for `ws` and resolve it.
fn settings_from_yaml(ws: &TestWorkspace) -> Settings {
    let yaml = format!(
        "upload_dir: {uploads}\nstaging_dir: {staging}\nremote:\n  group: {GROUP}\n  local_root: {remotes}\ntools:\n  archiver: {archiver}\n  decoder: {decoder}\nauthor:\n  name: {TEST_AUTHOR_NAME}\n  email: {TEST_AUTHOR_EMAIL}\n",
        uploads = ws.upload_dir().display(),
        staging = ws.root().join("staging").display(),
        remotes = ws.remote_root().display(),
        archiver = tools::fake_archiver(&ws.tools_dir()).display(),
        decoder = tools::fake_decoder(&ws.tools_dir()).display(),
    );
    let path = ws.root().join("imgsync.yaml");
    fs::write(&path, yaml).unwrap();
    Settings::resolve(Some(&path)).unwrap()
}

fn head_commit(remote: &Path) -> (String, String, String) {
    let repo = Repository::open_bare(remote).unwrap();
    let commit = repo
        .find_branch("main", git2::BranchType::Local)
        .unwrap()
        .get()
        .peel_to_commit()
        .unwrap();
    let author = commit.author();
    (
        commit.message().unwrap_or_default().trim().to_string(),
        author.name().unwrap_or_default().to_string(),
        author.email().unwrap_or_default().to_string(),
    )
}

#[tokio::test]
async fn test_publish_vertical_slice() {
    let ws = TestWorkspace::new();
    let remote = ws.bare_remote(GROUP, "Pixel4");
    let settings = settings_from_yaml(&ws);
    assert_eq!(settings.remote.group, GROUP);

    let system = fs::read(ws.archive(
        "system.tar",
        &[
            ("system/build.prop", build_prop("QQ3A.200805.001").as_str()),
            ("system/app/Camera/Camera.apk", "com.android.camera\n"),
            ("system/priv-app/Phone/Phone.apk", "com.android.phone\n"),
        ],
    ))
    .unwrap();
    let vendor = ws.archive("vendor.tar", &[("vendor/build.prop", "ro.vendor.build.id=X\n")]);

    let request = UploadRequest::new(
        "Pixel4",
        vec![
            ArchiveUpload::bytes("system.tar", system),
            ArchiveUpload::file(&vendor),
        ],
    );
    let report = PipelineOrchestrator::new(settings)
        .unwrap()
        .run(request, Mode::Publish)
        .await
        .unwrap();

    // Report
    assert_eq!(report.archives, 2);
    assert_eq!(
        report.packages,
        vec!["com.android.camera_Camera", "com.android.phone_Phone"]
    );
    assert_eq!(report.remote_url, remote.display().to_string());

    // Remote history and identity
    let (message, name, email) = head_commit(&remote);
    assert_eq!(message, "QQ3A.200805.001");
    assert_eq!(name, TEST_AUTHOR_NAME);
    assert_eq!(email, TEST_AUTHOR_EMAIL);

    // Working copy
    ws.assert_file_exists("Pixel4", "vendor/build.prop");
    ws.assert_file_exists("Pixel4", "com.android.phone_Phone/AndroidManifest.xml");
    assert_eq!(
        fs::read_dir(ws.root().join("staging")).unwrap().count(),
        0,
        "staged uploads must not outlive the run"
    );
}
