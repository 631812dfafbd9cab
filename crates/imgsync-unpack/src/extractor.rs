//! 7z-based archive extraction

use std::path::{Path, PathBuf};
use std::time::Duration;

use imgsync_fs::Error as FsError;
use imgsync_process::{FailurePolicy, StepOutcome, ToolInvocation, find_tool};

use crate::Result;

/// Where the archiver is expected to be installed
pub const DEFAULT_ARCHIVER_PATH: &str = "/usr/local/bin/7z";

/// Exit 2 from 7z with this marker only reports broken links inside the
/// image, the rest of the archive is extracted.
pub const EXTRACT_POLICY: FailurePolicy = FailurePolicy::TolerateDiagnostic {
    code: 2,
    marker: "Sub items Errors",
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Unpacks firmware partition archives with an external 7z binary.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    program: PathBuf,
    timeout: Duration,
}

impl ArchiveExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use `/usr/local/bin/7z` when installed there, else `7z` from `PATH`.
    pub fn discover() -> Self {
        Self::new(find_tool(Path::new(DEFAULT_ARCHIVER_PATH), "7z"))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `7z x <archive> -o<dest> -y`, with both paths made absolute.
    pub fn invocation(&self, archive: &Path, destination: &Path) -> Result<ToolInvocation> {
        let archive = imgsync_fs::absolute(archive)?;
        let destination = imgsync_fs::absolute(destination)?;

        let mut out_flag = std::ffi::OsString::from("-o");
        out_flag.push(destination.as_os_str());

        Ok(ToolInvocation::new("7z extract", &self.program)
            .arg("x")
            .arg(archive.as_os_str())
            .arg(out_flag)
            .arg("-y")
            .timeout(self.timeout))
    }

    /// Extract `archive` into `destination`, overwriting existing files.
    ///
    /// The destination tree is created when absent.
    pub async fn extract(&self, archive: &Path, destination: &Path) -> Result<StepOutcome> {
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| FsError::io(destination, e))?;

        tracing::info!(
            archive = %archive.display(),
            destination = %destination.display(),
            "Extracting archive"
        );

        let invocation = self.invocation(archive, destination)?;
        let outcome = imgsync_process::run_with_policy(&invocation, EXTRACT_POLICY).await?;
        if outcome.is_tolerated() {
            tracing::warn!(archive = %archive.display(), "7z reported sub item errors, extraction continued");
        }
        Ok(outcome)
    }

    /// Extract several archives into the same destination, in order.
    pub async fn extract_all(&self, archives: &[PathBuf], destination: &Path) -> Result<usize> {
        for archive in archives {
            self.extract(archive, destination).await?;
        }
        Ok(archives.len())
    }
}
