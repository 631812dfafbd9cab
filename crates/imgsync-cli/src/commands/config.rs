//! Resolved settings display

use std::path::Path;

use colored::Colorize;
use imgsync_core::Settings;

use crate::error::{CliError, Result};

/// Print the settings a run would use, without validating them.
pub fn run_config_show(settings: &Settings, json: bool) -> Result<()> {
    if json {
        let output = serde_json::to_string_pretty(settings)
            .map_err(|e| CliError::user(format!("cannot render settings: {e}")))?;
        println!("{output}");
        return Ok(());
    }

    println!("{}", "# Resolved settings".dimmed());
    print!("{}", settings.to_toml()?);

    if let Err(e) = settings.validate() {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
    Ok(())
}

/// Save the settings so later runs can use them with `--config`.
pub fn run_config_write(settings: &Settings, path: &Path) -> Result<()> {
    settings.save(path)?;
    println!("{} {}", "Wrote".green().bold(), path.display());
    Ok(())
}
