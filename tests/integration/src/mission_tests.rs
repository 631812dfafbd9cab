//! Mission-based Integration Tests
//!
//! Production scenarios for the publish and update pipeline, run against
//! local bare remotes with the real git CLI and fake 7z/apktool scripts.

#![cfg(unix)]

use std::path::PathBuf;

use imgsync_core::config::AuthorSettings;
use imgsync_core::{ArchiveUpload, FailureKind, Mode, PipelineOrchestrator, Settings, UploadRequest};
use imgsync_git::WorkingCopyState;
use imgsync_test_utils::archive::build_prop;
use imgsync_test_utils::git::{
    TEST_AUTHOR_EMAIL, TEST_AUTHOR_NAME, commit_messages, seed_remote, tree_files,
};
use imgsync_test_utils::tools;
use imgsync_test_utils::workspace::TestWorkspace;
use pretty_assertions::assert_eq;

// =============================================================================
// Test Infrastructure
// =============================================================================

const GROUP: &str = "firmware";

fn settings(ws: &TestWorkspace) -> Settings {
    let mut settings = Settings::default();
    settings.upload_dir = ws.upload_dir();
    settings.staging_dir = Some(ws.root().join("staging"));
    settings.remote.group = GROUP.into();
    settings.remote.local_root = Some(ws.remote_root());
    settings.tools.archiver = Some(tools::fake_archiver(&ws.tools_dir()));
    settings.tools.decoder = Some(tools::fake_decoder(&ws.tools_dir()));
    settings.author = Some(AuthorSettings {
        name: TEST_AUTHOR_NAME.into(),
        email: TEST_AUTHOR_EMAIL.into(),
    });
    settings
}

fn request(project: &str, archives: &[PathBuf]) -> UploadRequest {
    UploadRequest::new(
        project,
        archives.iter().map(|a| ArchiveUpload::file(a)).collect(),
    )
}

fn release(ws: &TestWorkspace, name: &str, display_id: &str, apks: &[(&str, &str)]) -> PathBuf {
    let prop = build_prop(display_id);
    let mut files = vec![("system/build.prop", prop.as_str())];
    files.extend_from_slice(apks);
    ws.archive(name, &files)
}

// =============================================================================
// Mission 1: First Publication
// =============================================================================

mod m1_publish {
    use super::*;
    use pretty_assertions::assert_eq;

    /// M1.1: The remote name is the lowercased project name
    #[tokio::test]
    async fn m1_1_mixed_case_project_pushes_to_lowercase_remote() {
        let ws = TestWorkspace::new();
        let remote = ws.bare_remote(GROUP, "SM-G991B");
        let archive = release(&ws, "system.tar", "G991BXXU1AUB4", &[]);

        let report = PipelineOrchestrator::new(settings(&ws))
            .unwrap()
            .run(request("SM-G991B", &[archive]), Mode::Publish)
            .await
            .unwrap();

        assert!(report.remote_url.ends_with("firmware/sm-g991b.git"), "{}", report.remote_url);
        assert!(ws.working_copy("SM-G991B").join(".git").is_dir());
        assert_eq!(commit_messages(&remote, "main"), vec!["G991BXXU1AUB4"]);
    }

    /// M1.2: A custom primary branch is created and pushed
    #[tokio::test]
    async fn m1_2_custom_primary_branch() {
        let ws = TestWorkspace::new();
        let remote = ws.bare_remote(GROUP, "demo");
        let mut settings = settings(&ws);
        settings.primary_branch = "release".into();
        let archive = release(&ws, "system.tar", "r1", &[]);

        PipelineOrchestrator::new(settings)
            .unwrap()
            .run(request("demo", &[archive]), Mode::Publish)
            .await
            .unwrap();

        assert_eq!(commit_messages(&remote, "release"), vec!["r1"]);
    }

    /// M1.3: The commit message comes from a configured marker
    #[tokio::test]
    async fn m1_3_custom_marker_key() {
        let ws = TestWorkspace::new();
        let remote = ws.bare_remote(GROUP, "demo");
        let mut settings = settings(&ws);
        settings.marker.path = "vendor/build.prop".into();
        settings.marker.key = "ro.vendor.build.fingerprint".into();
        let archive = ws.archive(
            "vendor.tar",
            &[(
                "vendor/build.prop",
                "ro.vendor.build.fingerprint = google/coral/coral:11/RP1A\n",
            )],
        );

        let report = PipelineOrchestrator::new(settings)
            .unwrap()
            .run(request("demo", &[archive]), Mode::Publish)
            .await
            .unwrap();

        assert_eq!(report.commit_message, "google/coral/coral:11/RP1A");
        assert_eq!(commit_messages(&remote, "main"), vec!["google/coral/coral:11/RP1A"]);
    }
}

// =============================================================================
// Mission 2: Release Updates
// =============================================================================

mod m2_update {
    use super::*;
    use pretty_assertions::assert_eq;

    /// M2.1: Three releases in a row build a linear history
    #[tokio::test]
    async fn m2_1_consecutive_updates_build_linear_history() {
        let ws = TestWorkspace::new();
        let remote = ws.bare_remote(GROUP, "demo");
        let orchestrator = PipelineOrchestrator::new(settings(&ws)).unwrap();

        let first = release(&ws, "r1.tar", "r1", &[]);
        orchestrator
            .run(request("demo", &[first]), Mode::Publish)
            .await
            .unwrap();
        for id in ["r2", "r3"] {
            let archive = release(&ws, &format!("{id}.tar"), id, &[]);
            orchestrator
                .run(request("demo", &[archive]), Mode::Update)
                .await
                .unwrap();
        }

        assert_eq!(commit_messages(&remote, "main"), vec!["r3", "r2", "r1"]);
    }

    /// M2.2: Update rebuilds a working copy that was deleted locally
    #[tokio::test]
    async fn m2_2_update_after_local_working_copy_was_removed() {
        let ws = TestWorkspace::new();
        let remote = ws.bare_remote(GROUP, "demo");
        let orchestrator = PipelineOrchestrator::new(settings(&ws)).unwrap();

        let first = release(&ws, "r1.tar", "r1", &[("system/app/A/A.apk", "com.a\n")]);
        orchestrator
            .run(request("demo", &[first]), Mode::Publish)
            .await
            .unwrap();
        std::fs::remove_dir_all(ws.working_copy("demo")).unwrap();

        let second = release(&ws, "r2.tar", "r2", &[]);
        let report = orchestrator
            .run(request("demo", &[second]), Mode::Update)
            .await
            .unwrap();

        assert_eq!(report.initial_state, WorkingCopyState::Uninitialized);
        assert_eq!(commit_messages(&remote, "main"), vec!["r2", "r1"]);
        assert!(
            !tree_files(&remote, "main").iter().any(|f| f.starts_with("com.a_A/")),
            "previous release content must be gone"
        );
    }

    /// M2.3: Update on top of history pushed by someone else
    #[tokio::test]
    async fn m2_3_update_on_externally_seeded_remote() {
        let ws = TestWorkspace::new();
        let remote = ws.bare_remote(GROUP, "demo");
        seed_remote(&remote, "main", "imported", &[("README.md", "firmware dump")]);
        let archive = release(&ws, "r1.tar", "r1", &[]);

        PipelineOrchestrator::new(settings(&ws))
            .unwrap()
            .run(request("demo", &[archive]), Mode::Update)
            .await
            .unwrap();

        assert_eq!(commit_messages(&remote, "main"), vec!["r1", "imported"]);
        assert!(!tree_files(&remote, "main").contains(&"README.md".to_string()));
    }
}

// =============================================================================
// Mission 3: Package Decoding
// =============================================================================

mod m3_packages {
    use super::*;
    use pretty_assertions::assert_eq;

    /// M3.1: Packages from system and vendor are decoded in path order
    #[tokio::test]
    async fn m3_1_packages_across_partitions() {
        let ws = TestWorkspace::new();
        let remote = ws.bare_remote(GROUP, "demo");
        let system = release(
            &ws,
            "system.tar",
            "p1",
            &[
                ("system/priv-app/Phone/Phone.apk", "com.android.phone\n"),
                ("system/app/Camera/Camera.apk", "com.android.camera\n"),
            ],
        );
        let vendor = ws.archive("vendor.tar", &[("vendor/app/Radio/Radio.apk", "com.qualcomm.radio\n")]);

        let report = PipelineOrchestrator::new(settings(&ws))
            .unwrap()
            .run(request("demo", &[system, vendor]), Mode::Publish)
            .await
            .unwrap();

        assert_eq!(
            report.packages,
            vec![
                "com.android.camera_Camera",
                "com.android.phone_Phone",
                "com.qualcomm.radio_Radio",
            ]
        );
        let files = tree_files(&remote, "main");
        for package in &report.packages {
            assert!(
                files.contains(&format!("{package}/AndroidManifest.xml")),
                "{package} missing from {files:?}"
            );
        }
    }

    /// M3.2: A package that decodes without a manifest fails the run
    #[tokio::test]
    async fn m3_2_decoder_without_manifest_is_parse_failure() {
        let ws = TestWorkspace::new();
        let remote = ws.bare_remote(GROUP, "demo");
        let mut settings = settings(&ws);
        settings.tools.decoder = Some(tools::decoder_without_manifest(&ws.tools_dir()));
        let archive = release(&ws, "system.tar", "p1", &[("system/app/A/A.apk", "com.a\n")]);

        let err = PipelineOrchestrator::new(settings)
            .unwrap()
            .run(request("demo", &[archive]), Mode::Publish)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::ParseFailure);
        assert!(commit_messages(&remote, "main").is_empty());
    }
}

// =============================================================================
// Mission 4: Failure Handling
// =============================================================================

mod m4_failures {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    /// M4.1: A stuck archiver is killed after its timeout
    #[tokio::test]
    async fn m4_1_archiver_timeout() {
        let ws = TestWorkspace::new();
        ws.bare_remote(GROUP, "demo");
        let mut settings = settings(&ws);
        settings.tools.archiver = Some(tools::hanging_archiver(&ws.tools_dir()));
        settings.timeouts.archiver = 1;
        let archive = release(&ws, "system.tar", "t", &[]);

        let started = Instant::now();
        let err = PipelineOrchestrator::new(settings)
            .unwrap()
            .run(request("demo", &[archive]), Mode::Publish)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Timeout);
        assert!(started.elapsed().as_secs() < 30);
    }

    /// M4.2: A missing remote is an environment failure at push
    #[tokio::test]
    async fn m4_2_missing_remote_repository() {
        let ws = TestWorkspace::new();
        let archive = release(&ws, "system.tar", "x", &[]);

        let err = PipelineOrchestrator::new(settings(&ws))
            .unwrap()
            .run(request("demo", &[archive]), Mode::Publish)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::EnvironmentFailure);
        // The commit stays local for the next attempt
        assert!(ws.working_copy("demo").join(".git").is_dir());
    }

    /// M4.3: A missing archiver is a tool invocation failure
    #[tokio::test]
    async fn m4_3_missing_archiver_binary() {
        let ws = TestWorkspace::new();
        ws.bare_remote(GROUP, "demo");
        let mut settings = settings(&ws);
        settings.tools.archiver = Some(ws.tools_dir().join("absent-7z"));
        let archive = release(&ws, "system.tar", "x", &[]);

        let err = PipelineOrchestrator::new(settings)
            .unwrap()
            .run(request("demo", &[archive]), Mode::Publish)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::ToolInvocationFailure);
    }
}

// =============================================================================
// Mission 5: Concurrency
// =============================================================================

mod m5_locking {
    use super::*;
    use pretty_assertions::assert_eq;
    use imgsync_fs::WorkingCopyLock;

    /// M5.1: A project already being processed is rejected
    #[tokio::test]
    async fn m5_1_locked_project_is_rejected() {
        let ws = TestWorkspace::new();
        ws.bare_remote(GROUP, "demo");
        let _held = WorkingCopyLock::acquire(&ws.working_copy("demo")).unwrap();
        let archive = release(&ws, "system.tar", "x", &[]);

        let err = PipelineOrchestrator::new(settings(&ws))
            .unwrap()
            .run(request("demo", &[archive]), Mode::Publish)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Locked);
        assert!(!ws.working_copy("demo").exists());
    }

    /// M5.2: Different projects run side by side
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn m5_2_independent_projects_run_concurrently() {
        let ws = TestWorkspace::new();
        let alpha_remote = ws.bare_remote(GROUP, "alpha");
        let beta_remote = ws.bare_remote(GROUP, "beta");
        let orchestrator = PipelineOrchestrator::new(settings(&ws)).unwrap();
        let alpha = release(&ws, "alpha.tar", "a1", &[]);
        let beta = release(&ws, "beta.tar", "b1", &[]);

        let (a, b) = tokio::join!(
            orchestrator.run(request("alpha", &[alpha]), Mode::Publish),
            orchestrator.run(request("beta", &[beta]), Mode::Publish),
        );

        a.unwrap();
        b.unwrap();
        assert_eq!(commit_messages(&alpha_remote, "main"), vec!["a1"]);
        assert_eq!(commit_messages(&beta_remote, "main"), vec!["b1"]);
    }
}
