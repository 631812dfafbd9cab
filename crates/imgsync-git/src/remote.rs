//! Where a project's working copy is pushed

use std::path::PathBuf;

/// Host side of a remote location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteHost {
    /// `git@<host>:<group>/<name>.git`
    Ssh { host: String },
    /// `<root>/<group>/<name>.git` on the local filesystem
    Local { root: PathBuf },
}

/// A hosting group together with the host it lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLocation {
    pub host: RemoteHost,
    pub group: String,
}

impl RemoteLocation {
    pub fn new(host: RemoteHost, group: impl Into<String>) -> Self {
        Self {
            host,
            group: group.into(),
        }
    }

    /// Repository name on the remote: the project name lower-cased.
    pub fn repository_name(project: &str) -> String {
        project.to_lowercase()
    }

    /// URL the `origin` remote of `project`'s working copy points at.
    pub fn url(&self, project: &str) -> String {
        let name = Self::repository_name(project);
        match &self.host {
            RemoteHost::Ssh { host } => format!("git@{host}:{}/{name}.git", self.group),
            RemoteHost::Local { root } => root
                .join(&self.group)
                .join(format!("{name}.git"))
                .to_string_lossy()
                .into_owned(),
        }
    }
}
