//! CLI binary for auditing Jenkinsfile step and trigger usage.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

/// File audited when no path is given.
const DEFAULT_PIPELINE: &str = "Jenkinsfile";

#[derive(Parser)]
#[command(name = "jenkaudit", version, about = "Frequency audit of Jenkinsfile steps and triggers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the audit summary (default when no subcommand is given)
    Audit {
        /// Path to the pipeline file
        #[arg(default_value = DEFAULT_PIPELINE)]
        pipeline: PathBuf,

        /// Emit the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List each stage with the directives recorded in it
    Stages {
        /// Path to the pipeline file
        #[arg(default_value = DEFAULT_PIPELINE)]
        pipeline: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Audit { pipeline, json }) => cmd_audit(&pipeline, json)?,
        Some(Commands::Stages { pipeline }) => cmd_stages(&pipeline)?,
        None => cmd_audit(Path::new(DEFAULT_PIPELINE), false)?,
    }

    Ok(())
}

fn cmd_audit(path: &Path, json: bool) -> anyhow::Result<()> {
    let aggregates = jenkaudit_scan::scan_file(path)?;
    let now = chrono::Local::now().naive_local();

    if json {
        println!("{}", jenkaudit_report::render_json(&aggregates, now)?);
    } else {
        println!("{}", jenkaudit_report::render(&aggregates, now));
    }

    Ok(())
}

fn cmd_stages(path: &Path) -> anyhow::Result<()> {
    let aggregates = jenkaudit_scan::scan_file(path)?;
    tracing::debug!(stages = aggregates.structure.len(), "listing stages");
    print!("{}", jenkaudit_report::render_stages(&aggregates.structure));
    Ok(())
}
