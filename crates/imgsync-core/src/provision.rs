//! Remote project provisioning seam
//!
//! Creating the group and project on the hosting provider is not done here;
//! deployments that need it plug in their own [`ProjectProvisioner`].

use async_trait::async_trait;

use crate::Result;

/// Makes sure the remote repository for a project exists before pushing.
#[async_trait]
pub trait ProjectProvisioner: Send + Sync {
    /// Called once per run, before any git step.
    async fn ensure(&self, group: &str, project: &str) -> Result<()>;
}

/// Provisioner for remotes that already exist or are created on push.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProvisioner;

#[async_trait]
impl ProjectProvisioner for NoopProvisioner {
    async fn ensure(&self, group: &str, project: &str) -> Result<()> {
        tracing::debug!(group, project, "No provisioning configured");
        Ok(())
    }
}
