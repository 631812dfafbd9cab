//! RepositorySynchronizer: one run of publish or update against a working copy

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use imgsync_fs::{RepoPath, WorkingCopyLock};
use imgsync_process::ToolInvocation;
use imgsync_unpack::Population;

use crate::marker::BuildMarker;
use crate::remote::RemoteLocation;
use crate::state::{self, WorkingCopyState};
use crate::steps::{self, GitStep};
use crate::{Error, Result};

/// Branch every working copy commits to and pushes
pub const DEFAULT_PRIMARY_BRANCH: &str = "main";

/// Keeps ssh from prompting when no usable key is loaded
pub const DEFAULT_SSH_COMMAND: &str = "ssh -oBatchMode=yes";

pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Which flow a run takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// First upload: populate, link, commit, push
    Publish,
    /// Later upload: link, refresh from the remote, wipe, populate, commit,
    /// rebase, push
    Update,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Publish => f.write_str("publish"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// Author and committer identity exported to git.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl GitIdentity {
    fn env(&self) -> [(&'static str, &str); 4] {
        [
            ("GIT_AUTHOR_NAME", self.name.as_str()),
            ("GIT_AUTHOR_EMAIL", self.email.as_str()),
            ("GIT_COMMITTER_NAME", self.name.as_str()),
            ("GIT_COMMITTER_EMAIL", self.email.as_str()),
        ]
    }
}

/// Everything the synchronizer needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub git_program: PathBuf,
    pub remote: RemoteLocation,
    pub primary_branch: String,
    /// Exported as `GIT_SSH_COMMAND` for steps that reach the remote
    pub ssh_command: String,
    /// When unset, git falls back to its own configuration
    pub author: Option<GitIdentity>,
    pub marker: BuildMarker,
    /// Deadline for each git invocation
    pub timeout: Duration,
}

impl SyncConfig {
    pub fn new(remote: RemoteLocation) -> Self {
        Self {
            git_program: PathBuf::from("git"),
            remote,
            primary_branch: DEFAULT_PRIMARY_BRANCH.to_string(),
            ssh_command: DEFAULT_SSH_COMMAND.to_string(),
            author: None,
            marker: BuildMarker::default(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }
}

/// Fills a working copy with the content to be committed.
///
/// Called once per run: before linking on publish, after the wipe on update.
#[async_trait]
pub trait WorkingCopyPopulator: Send + Sync {
    async fn populate(&self, working_copy: &Path) -> imgsync_unpack::Result<Population>;
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub mode: SyncMode,
    /// State the working copy was found in
    pub initial_state: WorkingCopyState,
    pub state: WorkingCopyState,
    pub remote_url: String,
    pub commit_message: String,
    pub population: Population,
    /// Steps that exited nonzero under a tolerant policy
    pub tolerated: Vec<&'static str>,
}

/// Drives a project's working copy to a pushed commit.
#[derive(Debug, Clone)]
pub struct RepositorySynchronizer {
    config: SyncConfig,
}

impl RepositorySynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The `git` invocation for `step` inside `working_copy`.
    pub fn invocation(&self, step: &GitStep, working_copy: &Path) -> ToolInvocation {
        let mut invocation =
            ToolInvocation::new(format!("git {}", step.name()), &self.config.git_program)
                .args(step.args())
                .current_dir(working_copy)
                .env("GIT_TERMINAL_PROMPT", "0")
                .timeout(self.config.timeout);

        if step.is_network() {
            invocation = invocation.env("GIT_SSH_COMMAND", &self.config.ssh_command);
        }
        if let Some(author) = &self.config.author {
            for (key, value) in author.env() {
                invocation = invocation.env(key, value);
            }
        }
        invocation
    }

    /// Run one step; `Ok(true)` when it failed under a tolerant policy.
    async fn run_step(
        &self,
        step: GitStep,
        working_copy: &Path,
        tolerated: &mut Vec<&'static str>,
    ) -> Result<bool> {
        tracing::debug!(step = %step, "Running git step");
        let invocation = self.invocation(&step, working_copy);
        let outcome = imgsync_process::run_with_policy(&invocation, step.policy())
            .await
            .map_err(|source| Error::Step {
                step: step.name(),
                class: step.failure_class(),
                source,
            })?;
        if outcome.is_tolerated() {
            tolerated.push(step.name());
        }
        Ok(outcome.is_tolerated())
    }

    async fn run_steps(
        &self,
        steps: Vec<GitStep>,
        working_copy: &Path,
        tolerated: &mut Vec<&'static str>,
    ) -> Result<()> {
        for step in steps {
            let interrupts = step.may_interrupt_rebase();
            let failed = self.run_step(step, working_copy, tolerated).await?;
            if failed && interrupts && state::rebase_in_progress(working_copy)? {
                tracing::warn!(working_copy = %working_copy.display(), "Abandoning interrupted rebase");
                self.run_step(GitStep::AbortRebase, working_copy, tolerated)
                    .await?;
            }
        }
        Ok(())
    }

    /// First upload of `project` into `working_copy`.
    pub async fn publish(
        &self,
        project: &str,
        working_copy: &Path,
        populator: &dyn WorkingCopyPopulator,
    ) -> Result<SyncOutcome> {
        self.synchronize(SyncMode::Publish, project, working_copy, populator)
            .await
    }

    /// Replace the content of an existing working copy and push it on top of
    /// the remote's history.
    pub async fn update(
        &self,
        project: &str,
        working_copy: &Path,
        populator: &dyn WorkingCopyPopulator,
    ) -> Result<SyncOutcome> {
        self.synchronize(SyncMode::Update, project, working_copy, populator)
            .await
    }

    /// Run `mode` while holding the working copy's lock.
    ///
    /// Any fatal step aborts immediately; earlier steps are not undone.
    pub async fn synchronize(
        &self,
        mode: SyncMode,
        project: &str,
        working_copy: &Path,
        populator: &dyn WorkingCopyPopulator,
    ) -> Result<SyncOutcome> {
        let _lock = WorkingCopyLock::acquire(working_copy)?;
        tokio::fs::create_dir_all(working_copy)
            .await
            .map_err(|e| imgsync_fs::Error::io(working_copy, e))?;

        let initial_state = WorkingCopyState::detect(working_copy)?;
        let remote_url = self.config.remote.url(project);
        let branch = self.config.primary_branch.as_str();
        tracing::info!(
            project = %project,
            mode = %mode,
            state = %initial_state,
            remote = %remote_url,
            "Synchronizing working copy"
        );

        let mut tolerated = Vec::new();
        let links = steps::link_steps(initial_state, branch, &remote_url);

        let population = match mode {
            SyncMode::Publish => {
                let population = populator.populate(working_copy).await?;
                self.run_steps(links, working_copy, &mut tolerated).await?;
                population
            }
            SyncMode::Update => {
                self.run_steps(links, working_copy, &mut tolerated).await?;
                let interrupted = state::rebase_in_progress(working_copy)?;
                if interrupted {
                    tracing::warn!(project = %project, "Working copy was left mid-rebase");
                }
                self.run_steps(
                    steps::refresh_steps(branch, interrupted),
                    working_copy,
                    &mut tolerated,
                )
                .await?;

                let removed =
                    imgsync_fs::wipe_except(working_copy, &RepoPath::preserved_names())?;
                tracing::info!(project = %project, removed, "Cleared working copy");

                populator.populate(working_copy).await?
            }
        };

        self.run_step(GitStep::StageAll, working_copy, &mut tolerated)
            .await?;
        let commit_message = self.config.marker.read(working_copy)?;
        tracing::info!(project = %project, message = %commit_message, "Committing");

        let tail = steps::commit_steps(branch, &commit_message, mode == SyncMode::Update);
        self.run_steps(tail, working_copy, &mut tolerated).await?;

        if !tolerated.is_empty() {
            tracing::warn!(project = %project, steps = ?tolerated, "Run completed with tolerated step failures");
        }
        tracing::info!(project = %project, branch, "Pushed working copy");

        Ok(SyncOutcome {
            mode,
            initial_state,
            state: WorkingCopyState::Synced,
            remote_url,
            commit_message,
            population,
            tolerated,
        })
    }
}
