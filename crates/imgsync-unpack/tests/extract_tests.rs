//! ArchiveExtractor against scripted stand-ins for 7z

#![cfg(unix)]

use imgsync_process::Error as ToolError;
use imgsync_test_utils::tools;
use imgsync_test_utils::workspace::TestWorkspace;
use imgsync_unpack::{ArchiveExtractor, Error};

#[tokio::test]
async fn extracts_into_new_destination() {
    let ws = TestWorkspace::new();
    let archiver = tools::fake_archiver(&ws.tools_dir());
    let archive = ws.archive("system.tar", &[("system/build.prop", "ro.build.display.id=1\n")]);
    let dest = ws.working_copy("demo");

    let outcome = ArchiveExtractor::new(archiver)
        .extract(&archive, &dest)
        .await
        .unwrap();

    assert!(!outcome.is_tolerated());
    ws.assert_file_contains("demo", "system/build.prop", "ro.build.display.id=1");
}

#[tokio::test]
async fn overwrites_existing_files() {
    let ws = TestWorkspace::new();
    let extractor = ArchiveExtractor::new(tools::fake_archiver(&ws.tools_dir()));
    let first = ws.archive("a.tar", &[("system/build.prop", "old\n")]);
    let second = ws.archive("b.tar", &[("system/build.prop", "new\n")]);
    let dest = ws.working_copy("demo");

    extractor.extract_all(&[first, second], &dest).await.unwrap();

    ws.assert_file_contains("demo", "system/build.prop", "new");
}

#[tokio::test]
async fn exit_two_with_sub_items_marker_is_tolerated() {
    let ws = TestWorkspace::new();
    let archiver = tools::scripted_archiver(
        &ws.tools_dir(),
        2,
        "ERROR: Dangerous symbolic link path was ignored\nSub items Errors: 4",
    );
    let archive = ws.archive("system.tar", &[("system/bin/sh", "#!")]);

    let outcome = ArchiveExtractor::new(archiver)
        .extract(&archive, &ws.working_copy("demo"))
        .await
        .unwrap();

    assert!(outcome.is_tolerated());
    ws.assert_file_exists("demo", "system/bin/sh");
}

#[tokio::test]
async fn exit_two_without_marker_is_fatal() {
    let ws = TestWorkspace::new();
    let archiver = tools::scripted_archiver(&ws.tools_dir(), 2, "ERROR: Data Error");
    let archive = ws.archive("system.tar", &[("x", "y")]);

    let err = ArchiveExtractor::new(archiver)
        .extract(&archive, &ws.working_copy("demo"))
        .await
        .unwrap_err();

    match err {
        Error::Tool(ToolError::Failed { code, output, .. }) => {
            assert_eq!(code, 2);
            assert!(output.contains("Data Error"));
        }
        other => panic!("expected tool failure, got {other}"),
    }
}

#[tokio::test]
async fn exit_one_is_fatal_even_with_marker() {
    let ws = TestWorkspace::new();
    let archiver = tools::scripted_archiver(&ws.tools_dir(), 1, "Sub items Errors: 1");
    let archive = ws.archive("system.tar", &[("x", "y")]);

    let err = ArchiveExtractor::new(archiver)
        .extract(&archive, &ws.working_copy("demo"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Tool(ToolError::Failed { code: 1, .. })));
}

#[tokio::test]
async fn invocation_contract_is_recorded() {
    let ws = TestWorkspace::new();
    let archiver = tools::fake_archiver(&ws.tools_dir());
    let archive = ws.archive("vendor.tar", &[("vendor/etc/a", "b")]);
    let dest = ws.working_copy("demo");

    ArchiveExtractor::new(archiver).extract(&archive, &dest).await.unwrap();

    let calls = tools::recorded_calls(&ws.tools_dir(), "7z");
    assert_eq!(calls.len(), 1);
    let expected_dest = imgsync_fs::absolute(&dest).unwrap();
    assert_eq!(
        calls[0],
        format!("x {} -o{} -y", archive.display(), expected_dest.display())
    );
}
