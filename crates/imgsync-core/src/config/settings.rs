//! The settings value and its sources

use std::path::{Path, PathBuf};
use std::time::Duration;

use imgsync_fs::ConfigStore;
use imgsync_git::{
    BuildMarker, GitIdentity, RemoteHost, RemoteLocation, SyncConfig,
    marker::{DEFAULT_MARKER_KEY, DEFAULT_MARKER_PATH},
    synchronizer::{DEFAULT_PRIMARY_BRANCH, DEFAULT_SSH_COMMAND},
};
use imgsync_unpack::{ArchiveExtractor, PackageDecoder, Unpacker};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const ENV_GROUP: &str = "GIT_GROUP_NAME";
pub const ENV_HOST: &str = "GIT_HOST";
/// Local directory holding bare remotes; takes precedence over [`ENV_HOST`]
pub const ENV_REMOTE_ROOT: &str = "IMGSYNC_REMOTE_ROOT";
pub const ENV_SSH_COMMAND: &str = "GIT_SSH_COMMAND";
pub const ENV_UPLOAD_DIR: &str = "IMGSYNC_UPLOAD_DIR";

const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base directory holding one working copy per project
    pub upload_dir: PathBuf,

    /// Where uploaded blobs are staged; the system temp directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,

    pub primary_branch: String,

    /// `GIT_SSH_COMMAND` for fetch, pull and push
    pub ssh_command: String,

    pub remote: RemoteSettings,
    pub marker: MarkerSettings,
    pub tools: ToolSettings,
    pub timeouts: TimeoutSettings,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Hosting group (namespace) every project is pushed under
    pub group: String,
    /// SSH host of the hosting provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Local directory of bare repositories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSettings {
    /// Relative to the working copy
    pub path: PathBuf,
    pub key: String,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MARKER_PATH),
            key: DEFAULT_MARKER_KEY.to_string(),
        }
    }
}

/// Program paths. Unset archiver or decoder means discover at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archiver: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder: Option<PathBuf>,
    pub git: PathBuf,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            archiver: None,
            decoder: None,
            git: PathBuf::from("git"),
        }
    }
}

/// Per-tool deadlines, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub archiver: u64,
    pub decoder: u64,
    pub git: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            archiver: 3600,
            decoder: 1800,
            git: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSettings {
    pub name: String,
    pub email: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            staging_dir: None,
            primary_branch: DEFAULT_PRIMARY_BRANCH.to_string(),
            ssh_command: DEFAULT_SSH_COMMAND.to_string(),
            remote: RemoteSettings::default(),
            marker: MarkerSettings::default(),
            tools: ToolSettings::default(),
            timeouts: TimeoutSettings::default(),
            author: None,
        }
    }
}

impl Settings {
    /// Defaults, then `file` if given, then the process environment.
    pub fn resolve(file: Option<&Path>) -> Result<Self> {
        let mut settings = match file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading settings file");
                ConfigStore::new().load(path)?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Override fields from environment variables looked up through `lookup`.
    ///
    /// Unset and empty variables leave the current value alone.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(group) = get(ENV_GROUP) {
            self.remote.group = group;
        }
        if let Some(host) = get(ENV_HOST) {
            self.remote.host = Some(host);
        }
        if let Some(root) = get(ENV_REMOTE_ROOT) {
            self.remote.local_root = Some(PathBuf::from(root));
        }
        if let Some(command) = get(ENV_SSH_COMMAND) {
            self.ssh_command = command;
        }
        if let Some(dir) = get(ENV_UPLOAD_DIR) {
            self.upload_dir = PathBuf::from(dir);
        }
    }

    /// Check that a run could be attempted with these settings.
    pub fn validate(&self) -> Result<()> {
        self.remote_location()?;
        if self.primary_branch.trim().is_empty() {
            return Err(config("primary_branch must not be empty"));
        }
        if self.marker.key.trim().is_empty() {
            return Err(config("marker.key must not be empty"));
        }
        if self.marker.path.is_absolute() {
            return Err(config("marker.path must be relative to the working copy"));
        }
        let timeouts = self.timeouts;
        if timeouts.archiver == 0 || timeouts.decoder == 0 || timeouts.git == 0 {
            return Err(config("timeouts must be at least one second"));
        }
        Ok(())
    }

    /// The remote every project is pushed to.
    ///
    /// A local root wins over an SSH host.
    pub fn remote_location(&self) -> Result<RemoteLocation> {
        let group = self.remote.group.trim();
        if group.is_empty() {
            return Err(config(format!(
                "remote group is not set (set remote.group or {ENV_GROUP})"
            )));
        }

        let host = match (&self.remote.local_root, &self.remote.host) {
            (Some(root), _) => RemoteHost::Local { root: root.clone() },
            (None, Some(host)) if !host.trim().is_empty() => RemoteHost::Ssh {
                host: host.trim().to_string(),
            },
            _ => {
                return Err(config(format!(
                    "remote host is not set (set remote.host, {ENV_HOST} or {ENV_REMOTE_ROOT})"
                )));
            }
        };
        Ok(RemoteLocation::new(host, group))
    }

    /// Working copy of `project`.
    pub fn working_copy(&self, project: &str) -> PathBuf {
        self.upload_dir.join(project)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn sync_config(&self) -> Result<SyncConfig> {
        let mut config = SyncConfig::new(self.remote_location()?);
        config.git_program = self.tools.git.clone();
        config.primary_branch = self.primary_branch.clone();
        config.ssh_command = self.ssh_command.clone();
        config.author = self.author.as_ref().map(|a| GitIdentity {
            name: a.name.clone(),
            email: a.email.clone(),
        });
        config.marker = BuildMarker::new(&self.marker.path, &self.marker.key);
        config.timeout = Duration::from_secs(self.timeouts.git);
        Ok(config)
    }

    /// Extractor and decoder, discovering any program not configured.
    pub fn unpacker(&self) -> Unpacker {
        let extractor = match &self.tools.archiver {
            Some(path) => ArchiveExtractor::new(path),
            None => ArchiveExtractor::discover(),
        }
        .with_timeout(Duration::from_secs(self.timeouts.archiver));

        let decoder = match &self.tools.decoder {
            Some(path) => PackageDecoder::new(path),
            None => PackageDecoder::discover(),
        }
        .with_timeout(Duration::from_secs(self.timeouts.decoder));

        Unpacker::new(extractor, decoder)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| config(format!("cannot render settings: {e}")))
    }

    /// Write these settings to `path`, in the format its extension names.
    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        tracing::info!(path = %path.display(), "Saved settings");
        Ok(())
    }
}

fn config(message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
    }
}
