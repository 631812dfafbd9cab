//! apktool-based decoding of embedded application packages

use std::path::{Path, PathBuf};
use std::time::Duration;

use imgsync_fs::{PublishMode, checksum};
use imgsync_process::{FailurePolicy, ToolInvocation, find_tool};

use crate::manifest;
use crate::{Error, Result};

/// Where the decoder is expected to be installed
pub const DEFAULT_DECODER_PATH: &str = "/usr/local/bin/apktool";

/// Subtrees of a project root that are searched for packages
pub const PACKAGE_ROOTS: [&str; 2] = ["system", "vendor"];

/// Extension of embedded application packages
pub const PACKAGE_EXTENSION: &str = "apk";

/// Manifest written by the decoder into its output directory
pub const MANIFEST_FILE: &str = "AndroidManifest.xml";

/// Prefix of per-package scratch directories
pub const STAGING_PREFIX: &str = "_tmp_decode_";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);

/// One package decoded and published under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPackage {
    /// The package file inside `system/` or `vendor/`
    pub source: PathBuf,
    /// Scratch directory the decoder wrote into
    pub staging_dir: PathBuf,
    /// Sanitized package identifier
    pub package_id: String,
    /// `<sanitized-id>_<archive-basename>`
    pub final_name: String,
    /// Where the decoded tree now lives
    pub final_dir: PathBuf,
    pub publish_mode: PublishMode,
}

/// Decodes APKs found under a project's `system/` and `vendor/` trees.
#[derive(Debug, Clone)]
pub struct PackageDecoder {
    program: PathBuf,
    timeout: Duration,
}

impl PackageDecoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use `/usr/local/bin/apktool` when installed there, else `apktool`.
    pub fn discover() -> Self {
        Self::new(find_tool(Path::new(DEFAULT_DECODER_PATH), "apktool"))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Package files to decode, in lexicographic path order.
    ///
    /// Fails with [`Error::MissingPrerequisite`] when the project root is not
    /// a directory or has neither `system/` nor `vendor/`.
    pub fn find_packages(project_root: &Path) -> Result<Vec<PathBuf>> {
        if !project_root.is_dir() {
            return Err(Error::MissingPrerequisite {
                path: project_root.to_path_buf(),
                message: "project directory does not exist".into(),
            });
        }

        let roots: Vec<PathBuf> = PACKAGE_ROOTS
            .iter()
            .map(|name| project_root.join(name))
            .collect();
        if !roots.iter().any(|r| r.is_dir()) {
            return Err(Error::MissingPrerequisite {
                path: project_root.to_path_buf(),
                message: format!("no {} directory", PACKAGE_ROOTS.join("/ or ") + "/"),
            });
        }

        Ok(imgsync_fs::files_with_extension(&roots, PACKAGE_EXTENSION)?)
    }

    /// Scratch directory for one package, stable for a given package path.
    pub fn staging_dir(project_root: &Path, package: &Path) -> Result<PathBuf> {
        let absolute = imgsync_fs::absolute(package)?;
        let basename = manifest::archive_basename(package);
        Ok(project_root.join(format!(
            "{STAGING_PREFIX}{basename}_{}",
            checksum::short_digest(&absolute)
        )))
    }

    /// `apktool d -f -o <staging> <package>`
    pub fn invocation(&self, package: &Path, staging: &Path) -> Result<ToolInvocation> {
        let package = imgsync_fs::absolute(package)?;
        let staging = imgsync_fs::absolute(staging)?;
        Ok(ToolInvocation::new("apktool decode", &self.program)
            .args(["d", "-f", "-o"])
            .arg(staging.as_os_str())
            .arg(package.as_os_str())
            .timeout(self.timeout))
    }

    /// Decode every package under `project_root`, one after another.
    pub async fn decode_all(&self, project_root: &Path) -> Result<Vec<DecodedPackage>> {
        let packages = Self::find_packages(project_root)?;
        tracing::info!(
            root = %project_root.display(),
            count = packages.len(),
            "Found packages in system/vendor"
        );

        let mut decoded = Vec::with_capacity(packages.len());
        for package in &packages {
            decoded.push(self.decode_one(project_root, package).await?);
        }
        Ok(decoded)
    }

    /// Decode one package and publish it under its final name.
    ///
    /// The decoder only ever writes into the scratch directory; the final
    /// name appears in a single move once the manifest has been read.
    pub async fn decode_one(&self, project_root: &Path, package: &Path) -> Result<DecodedPackage> {
        let staging = Self::staging_dir(project_root, package)?;

        let leftovers = imgsync_fs::remove_tree_best_effort(&staging);
        if leftovers > 0 {
            tracing::warn!(
                staging = %staging.display(),
                leftovers,
                "Could not fully clear stale decode directory"
            );
        }

        tracing::info!(
            package = %package.display(),
            staging = %staging.display(),
            "Decoding package"
        );
        let invocation = self.invocation(package, &staging)?;
        imgsync_process::run_with_policy(&invocation, FailurePolicy::Fatal).await?;

        let manifest_path = staging.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(Error::ParseFailure {
                path: manifest_path,
                message: "manifest not found after decode".into(),
            });
        }
        let text = tokio::fs::read(&manifest_path)
            .await
            .map_err(|e| imgsync_fs::Error::io(&manifest_path, e))?;
        let text = String::from_utf8_lossy(&text);

        let package_id = manifest::sanitize(&manifest::package_id(&text));
        let final_name = manifest::final_dir_name(&package_id, &manifest::archive_basename(package));
        let final_dir = project_root.join(&final_name);

        let publish_mode = imgsync_fs::publish_dir(&staging, &final_dir)?;
        tracing::info!(
            package = %package.display(),
            target = %final_dir.display(),
            "Decoded package published"
        );

        Ok(DecodedPackage {
            source: package.to_path_buf(),
            staging_dir: staging,
            package_id,
            final_name,
            final_dir,
            publish_mode,
        })
    }
}
