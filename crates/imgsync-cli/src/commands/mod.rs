//! Command implementations for imgsync-cli

pub mod config;
pub mod run;

pub use config::{run_config_show, run_config_write};
pub use run::run_pipeline;

use imgsync_core::Settings;

use crate::cli::Cli;
use crate::error::Result;

/// Resolve settings from the config file and environment, then apply
/// command-line overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::resolve(cli.config.as_deref())?;

    if let Some(dir) = &cli.upload_dir {
        settings.upload_dir = dir.clone();
    }
    if let Some(group) = &cli.group {
        settings.remote.group = group.clone();
    }
    if let Some(host) = &cli.host {
        settings.remote.host = Some(host.clone());
    }
    if let Some(root) = &cli.remote_root {
        settings.remote.local_root = Some(root.clone());
    }
    Ok(settings)
}
