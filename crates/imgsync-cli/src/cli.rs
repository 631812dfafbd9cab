//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// imgsync - Publish firmware image archives to git remotes
#[derive(Parser, Debug)]
#[command(name = "imgsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (.toml, .json or .yaml)
    #[arg(short, long, global = true, env = "IMGSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base directory for working copies
    #[arg(long, global = true)]
    pub upload_dir: Option<PathBuf>,

    /// Hosting group every project is pushed under
    #[arg(long, global = true)]
    pub group: Option<String>,

    /// SSH host of the hosting provider
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Directory of bare repositories to push to instead of an SSH host
    #[arg(long, global = true)]
    pub remote_root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a project repository from archives and push its first commit
    ///
    /// Examples:
    ///   imgsync publish -p pixel system.7z vendor.7z
    Publish(RunArgs),

    /// Replace a project's content with a new release and push it
    ///
    /// Examples:
    ///   imgsync update -p pixel system.7z
    Update(RunArgs),

    /// Show the resolved settings
    Config {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,

        /// Write the settings to this file instead (.toml, .json or .yaml)
        #[arg(short, long, conflicts_with = "json")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Project name; also names the working copy and, lowercased, the remote
    #[arg(short, long)]
    pub project: String,

    /// Archives to extract, in order
    #[arg(required = true)]
    pub archives: Vec<PathBuf>,
}
