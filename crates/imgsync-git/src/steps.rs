//! The git steps a synchronization may run, and what their failures mean
//!
//! Arguments and failure policy are pure functions of the step, so the
//! whole tolerance list can be read (and tested) here without spawning git.

use std::fmt;

use imgsync_process::FailurePolicy;

use crate::state::{REMOTE_NAME, WorkingCopyState};

/// How a fatal failure of a step is reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// git itself refused; local problem
    ToolInvocation,
    /// Remote unreachable or rejected the operation
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitStep {
    Init,
    RenameBranch { branch: String },
    AddRemote { url: String },
    SetRemoteUrl { url: String },
    Fetch,
    CheckoutPrimary { branch: String },
    ResetToRemote { branch: String },
    StageAll,
    Commit { message: String },
    PullRebase { branch: String },
    AbortRebase,
    Push { branch: String },
}

impl GitStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::RenameBranch { .. } => "branch",
            Self::AddRemote { .. } => "remote add",
            Self::SetRemoteUrl { .. } => "remote set-url",
            Self::Fetch => "fetch",
            Self::CheckoutPrimary { .. } => "checkout",
            Self::ResetToRemote { .. } => "reset",
            Self::StageAll => "add",
            Self::Commit { .. } => "commit",
            Self::PullRebase { .. } => "pull",
            Self::AbortRebase => "rebase --abort",
            Self::Push { .. } => "push",
        }
    }

    /// Arguments passed to `git`.
    pub fn args(&self) -> Vec<String> {
        let args: Vec<&str> = match self {
            Self::Init => vec!["init"],
            Self::RenameBranch { branch } => vec!["branch", "-M", branch.as_str()],
            Self::AddRemote { url } => vec!["remote", "add", REMOTE_NAME, url.as_str()],
            Self::SetRemoteUrl { url } => vec!["remote", "set-url", REMOTE_NAME, url.as_str()],
            Self::Fetch => vec!["fetch", REMOTE_NAME, "-v"],
            Self::CheckoutPrimary { branch } => vec!["checkout", "-B", branch.as_str()],
            Self::ResetToRemote { branch } => {
                return vec![
                    "reset".into(),
                    "--hard".into(),
                    format!("{REMOTE_NAME}/{branch}"),
                ];
            }
            Self::StageAll => vec!["add", "."],
            Self::Commit { message } => vec!["commit", "--allow-empty", "-m", message.as_str()],
            Self::PullRebase { branch } => vec!["pull", "--rebase", REMOTE_NAME, branch.as_str(), "-v"],
            Self::AbortRebase => vec!["rebase", "--abort"],
            Self::Push { branch } => vec!["push", "-u", REMOTE_NAME, branch.as_str(), "-v"],
        };
        args.into_iter().map(String::from).collect()
    }

    /// What a nonzero exit of this step means.
    ///
    /// Tolerated: re-pointing an existing remote, checking out on an unborn
    /// branch, resetting against a remote without the primary branch,
    /// committing nothing, rebasing onto a diverged remote and abandoning
    /// that rebase.
    pub fn policy(&self) -> FailurePolicy {
        match self {
            Self::SetRemoteUrl { .. }
            | Self::CheckoutPrimary { .. }
            | Self::ResetToRemote { .. }
            | Self::Commit { .. }
            | Self::PullRebase { .. }
            | Self::AbortRebase => FailurePolicy::WarnAndContinue,
            Self::Init
            | Self::RenameBranch { .. }
            | Self::AddRemote { .. }
            | Self::Fetch
            | Self::StageAll
            | Self::Push { .. } => FailurePolicy::Fatal,
        }
    }

    /// Steps that talk to the remote and need the SSH override.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Fetch | Self::PullRebase { .. } | Self::Push { .. })
    }

    /// A tolerated failure of this step can leave a rebase in progress.
    pub fn may_interrupt_rebase(&self) -> bool {
        matches!(self, Self::PullRebase { .. })
    }

    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::Fetch | Self::Push { .. } => FailureClass::Environment,
            _ => FailureClass::ToolInvocation,
        }
    }
}

impl fmt::Display for GitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Steps that bring a working copy in `state` to having `origin` at `url`.
pub fn link_steps(state: WorkingCopyState, branch: &str, url: &str) -> Vec<GitStep> {
    match state {
        WorkingCopyState::Uninitialized => vec![
            GitStep::Init,
            GitStep::RenameBranch {
                branch: branch.to_string(),
            },
            GitStep::AddRemote {
                url: url.to_string(),
            },
        ],
        WorkingCopyState::Initialized => vec![
            GitStep::RenameBranch {
                branch: branch.to_string(),
            },
            GitStep::AddRemote {
                url: url.to_string(),
            },
        ],
        WorkingCopyState::RemoteLinked | WorkingCopyState::Synced => vec![GitStep::SetRemoteUrl {
            url: url.to_string(),
        }],
    }
}

/// Steps that move the local branch onto the remote's primary branch.
///
/// A rebase left behind by an earlier run is abandoned first.
pub fn refresh_steps(branch: &str, interrupted_rebase: bool) -> Vec<GitStep> {
    let mut steps = Vec::new();
    if interrupted_rebase {
        steps.push(GitStep::AbortRebase);
    }
    steps.extend([
        GitStep::Fetch,
        GitStep::CheckoutPrimary {
            branch: branch.to_string(),
        },
        GitStep::ResetToRemote {
            branch: branch.to_string(),
        },
    ]);
    steps
}

/// Steps after staging, for a first publish (`rebase == false`) or an update.
pub fn commit_steps(branch: &str, message: &str, rebase: bool) -> Vec<GitStep> {
    let mut steps = vec![GitStep::Commit {
        message: message.to_string(),
    }];
    if rebase {
        steps.push(GitStep::PullRebase {
            branch: branch.to_string(),
        });
    }
    steps.push(GitStep::Push {
        branch: branch.to_string(),
    });
    steps
}
