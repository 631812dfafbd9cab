//! PipelineOrchestrator: staging, provisioning and synchronization of one request

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use imgsync_git::{RemoteLocation, RepositorySynchronizer, WorkingCopyPopulator, WorkingCopyState};
use imgsync_unpack::{Population, Unpacker};

use crate::config::Settings;
use crate::mode::Mode;
use crate::provision::{NoopProvisioner, ProjectProvisioner};
use crate::upload::{ArchiveBlob, UploadRequest};
use crate::{Error, Result};

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub project: String,
    pub mode: Mode,
    pub working_copy: PathBuf,
    pub remote_url: String,
    /// Archives extracted into the working copy
    pub archives: usize,
    /// Final directory names of decoded packages
    pub packages: Vec<String>,
    pub initial_state: WorkingCopyState,
    pub state: WorkingCopyState,
    pub commit_message: String,
    /// git steps that failed under a tolerant policy
    pub tolerated: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn elapsed(&self) -> TimeDelta {
        self.finished_at - self.started_at
    }
}

/// Extracts staged archives and decodes packages when the synchronizer asks.
struct StagedArchives<'a> {
    unpacker: &'a Unpacker,
    archives: Vec<PathBuf>,
}

#[async_trait]
impl<'a> WorkingCopyPopulator for StagedArchives<'a> {
    async fn populate(&self, working_copy: &Path) -> imgsync_unpack::Result<Population> {
        self.unpacker.unpack(&self.archives, working_copy).await
    }
}

/// Runs upload requests end to end.
pub struct PipelineOrchestrator {
    settings: Settings,
    remote: RemoteLocation,
    unpacker: Unpacker,
    synchronizer: RepositorySynchronizer,
    provisioner: Arc<dyn ProjectProvisioner>,
}

impl PipelineOrchestrator {
    /// Validate `settings` and build the pipeline from them.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let remote = settings.remote_location()?;
        let synchronizer = RepositorySynchronizer::new(settings.sync_config()?);
        let unpacker = settings.unpacker();

        tracing::debug!(
            archiver = %unpacker.extractor().program().display(),
            decoder = %unpacker.decoder().program().display(),
            upload_dir = %settings.upload_dir.display(),
            "Pipeline configured"
        );

        Ok(Self {
            settings,
            remote,
            unpacker,
            synchronizer,
            provisioner: Arc::new(NoopProvisioner),
        })
    }

    pub fn with_provisioner(mut self, provisioner: Arc<dyn ProjectProvisioner>) -> Self {
        self.provisioner = provisioner;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process one request. Staged blobs are deleted whatever the outcome.
    pub async fn run(&self, request: UploadRequest, mode: Mode) -> Result<RunReport> {
        let started_at = Utc::now();
        let project = request.project.as_str();
        imgsync_fs::validate_path_identifier(project)?;

        tracing::info!(
            project,
            mode = %mode,
            uploads = request.archives.len(),
            "Starting run"
        );

        let blobs = request.stage(&self.settings.staging_dir())?;
        let result = self.process(project, mode, &blobs, started_at).await;

        let staged = blobs.len();
        for blob in blobs {
            blob.discard();
        }
        tracing::debug!(project, staged, "Removed staged uploads");

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(project, mode = %mode, kind = %e.kind(), error = %e, "Run failed");
                return Err(e);
            }
        };
        tracing::info!(
            project,
            commit = %report.commit_message,
            packages = report.packages.len(),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Run finished"
        );
        Ok(report)
    }

    async fn process(
        &self,
        project: &str,
        mode: Mode,
        blobs: &[ArchiveBlob],
        started_at: DateTime<Utc>,
    ) -> Result<RunReport> {
        if blobs.is_empty() {
            return Err(Error::NoArchives {
                project: project.to_string(),
            });
        }

        self.provisioner.ensure(&self.remote.group, project).await?;

        let working_copy = self.settings.working_copy(project);
        let populator = StagedArchives {
            unpacker: &self.unpacker,
            archives: blobs.iter().map(|b| b.path().to_path_buf()).collect(),
        };
        let outcome = self
            .synchronizer
            .synchronize(mode, project, &working_copy, &populator)
            .await?;

        Ok(RunReport {
            project: project.to_string(),
            mode,
            working_copy,
            remote_url: outcome.remote_url,
            archives: outcome.population.archives,
            packages: outcome
                .population
                .packages
                .into_iter()
                .map(|p| p.final_name)
                .collect(),
            initial_state: outcome.initial_state,
            state: outcome.state,
            commit_message: outcome.commit_message,
            tolerated: outcome.tolerated.iter().map(|s| s.to_string()).collect(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}
