//! imgsync CLI
//!
//! Publishes firmware image archives, and the Android packages inside them,
//! to per-project git repositories.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use imgsync_core::Mode;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

/// Targets logged at info by default, debug with `--verbose`.
const LOG_TARGETS: &[&str] = &[
    "imgsync",
    "imgsync_core",
    "imgsync_git",
    "imgsync_unpack",
    "imgsync_process",
    "imgsync_fs",
];

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        if let Some(kind) = e.kind() {
            eprintln!("  {} {}", "kind:".dimmed(), kind);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Some(cmd) => execute_command(&cli, cmd),
        None => {
            println!("{} image archive publisher", "imgsync".green().bold());
            println!();
            println!("Run {} for available commands.", "imgsync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cli: &Cli, cmd: &Commands) -> Result<()> {
    let settings = commands::load_settings(cli)?;
    match cmd {
        Commands::Publish(args) => commands::run_pipeline(settings, Mode::Publish, args),
        Commands::Update(args) => commands::run_pipeline(settings, Mode::Update, args),
        Commands::Config { json, output } => match output {
            Some(path) => commands::run_config_write(&settings, path),
            None => commands::run_config_show(&settings, *json),
        },
    }
}

/// Log to stderr. `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default = std::iter::once("warn".to_string())
        .chain(LOG_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);
    if subscriber.try_init().is_err() {
        eprintln!("{}: tracing was already initialized", "warning".yellow().bold());
    }
    tracing::debug!("Verbose mode enabled");
}
