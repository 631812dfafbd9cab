//! Git fixtures: bare remotes, seeded histories and remote inspection.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Identity used for commits made by fixtures and by code under test.
pub const TEST_AUTHOR_NAME: &str = "Test User";
pub const TEST_AUTHOR_EMAIL: &str = "test@test.com";

/// Create an empty bare repository at `<root>/<group>/<name>.git`.
///
/// # Panics
/// Panics if `git2::Repository::init_bare` fails.
pub fn bare_remote(root: &Path, group: &str, name: &str) -> PathBuf {
    let path = root.join(group).join(format!("{name}.git"));
    fs::create_dir_all(&path).unwrap();
    git2::Repository::init_bare(&path).unwrap_or_else(|e| {
        panic!("bare_remote: failed to init {}: {e}", path.display())
    });
    path
}

/// Run `git` with `args` in `dir`, panicking on failure.
///
/// # Panics
/// Panics if git cannot be started or exits nonzero.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", TEST_AUTHOR_NAME)
        .env("GIT_AUTHOR_EMAIL", TEST_AUTHOR_EMAIL)
        .env("GIT_COMMITTER_NAME", TEST_AUTHOR_NAME)
        .env("GIT_COMMITTER_EMAIL", TEST_AUTHOR_EMAIL)
        .output()
        .unwrap_or_else(|e| panic!("git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "git: `git {args:?}` failed:\n{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Push one commit containing `files` to `branch` of `remote`, as another
/// client of the same remote would.
///
/// # Panics
/// Panics if any git operation fails.
pub fn seed_remote(remote: &Path, branch: &str, message: &str, files: &[(&str, &str)]) {
    let scratch = tempfile::TempDir::new().unwrap();
    let dir = scratch.path();
    git(dir, &["init"]);
    git(dir, &["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")]);
    for (path, content) in files {
        let full = dir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    git(dir, &["add", "."]);
    git(dir, &["commit", "--allow-empty", "-m", message]);
    let url = remote.to_string_lossy().into_owned();
    git(dir, &["push", &url, &format!("HEAD:refs/heads/{branch}")]);
}

/// Clone `remote`, commit `files` on top of `branch` and push, as another
/// client racing an update would.
///
/// # Panics
/// Panics if any git operation fails.
pub fn push_on_top(remote: &Path, branch: &str, message: &str, files: &[(&str, &str)]) {
    let scratch = tempfile::TempDir::new().unwrap();
    let dir = scratch.path();
    let url = remote.to_string_lossy().into_owned();
    git(dir, &["clone", "--branch", branch, &url, "."]);
    for (path, content) in files {
        let full = dir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    git(dir, &["add", "."]);
    git(dir, &["commit", "--allow-empty", "-m", message]);
    git(dir, &["push", "origin", &format!("HEAD:refs/heads/{branch}")]);
}

/// Whether `working_copy` still holds a `rebase-merge` or `rebase-apply`
/// directory.
pub fn has_rebase_dir(working_copy: &Path) -> bool {
    let git_dir = working_copy.join(".git");
    git_dir.join("rebase-merge").exists() || git_dir.join("rebase-apply").exists()
}

/// Commit summaries on `branch` of a (bare) repository, newest first.
///
/// Returns an empty list when the branch does not exist.
pub fn commit_messages(repo: &Path, branch: &str) -> Vec<String> {
    let repo = git2::Repository::open(repo).unwrap();
    let Ok(reference) = repo.find_reference(&format!("refs/heads/{branch}")) else {
        return Vec::new();
    };
    let head = reference.peel_to_commit().unwrap();

    let mut walk = repo.revwalk().unwrap();
    walk.push(head.id()).unwrap();
    walk.map(|oid| {
        let commit = repo.find_commit(oid.unwrap()).unwrap();
        commit.summary().unwrap_or_default().to_string()
    })
    .collect()
}

/// Paths of all files in the tip tree of `branch`, sorted.
pub fn tree_files(repo: &Path, branch: &str) -> Vec<String> {
    let repo = git2::Repository::open(repo).unwrap();
    let tree = repo
        .find_reference(&format!("refs/heads/{branch}"))
        .unwrap()
        .peel_to_tree()
        .unwrap();

    let mut files = Vec::new();
    tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
        if entry.kind() == Some(git2::ObjectType::Blob) {
            files.push(format!("{dir}{}", entry.name().unwrap_or_default()));
        }
        git2::TreeWalkResult::Ok
    })
    .unwrap();
    files.sort();
    files
}
