//! The publish and update commands

use colored::Colorize;
use imgsync_core::{ArchiveUpload, Mode, PipelineOrchestrator, RunReport, Settings, UploadRequest};

use crate::cli::RunArgs;
use crate::error::{CliError, Result};

/// Run one request through the pipeline and print its report.
pub fn run_pipeline(settings: Settings, mode: Mode, args: &RunArgs) -> Result<()> {
    for archive in &args.archives {
        if !archive.is_file() {
            return Err(CliError::user(format!(
                "archive not found: {}",
                archive.display()
            )));
        }
    }

    let orchestrator = PipelineOrchestrator::new(settings)?;
    let request = UploadRequest::new(
        args.project.clone(),
        args.archives.iter().map(|a| ArchiveUpload::file(a)).collect(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(orchestrator.run(request, mode))?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!(
        "{} {} {}",
        "OK".green().bold(),
        report.mode,
        report.project.cyan()
    );
    println!();
    println!("  {:<14} {}", "Commit:".dimmed(), report.commit_message);
    println!("  {:<14} {}", "Remote:".dimmed(), report.remote_url);
    println!(
        "  {:<14} {}",
        "Working copy:".dimmed(),
        report.working_copy.display()
    );
    println!("  {:<14} {}", "Archives:".dimmed(), report.archives);
    println!(
        "  {:<14} {} -> {}",
        "State:".dimmed(),
        report.initial_state,
        report.state
    );

    if report.packages.is_empty() {
        println!("  {:<14} {}", "Packages:".dimmed(), "(none)".dimmed());
    } else {
        println!("  {}:", "Packages".dimmed());
        for package in &report.packages {
            println!("    {} {}", "+".green(), package);
        }
    }

    if !report.tolerated.is_empty() {
        println!(
            "  {:<14} {}",
            "Tolerated:".dimmed(),
            report.tolerated.join(", ").yellow()
        );
    }
    println!(
        "  {:<14} {:.1}s",
        "Elapsed:".dimmed(),
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );
}
