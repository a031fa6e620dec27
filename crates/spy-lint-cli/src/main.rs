//! spy-lint CLI tool.
//!
//! Usage:
//! ```bash
//! spy-lint check [OPTIONS] <MODEL>...
//! spy-lint list-rules
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Convention linter for parsed and resolved source models
#[derive(Parser)]
#[command(name = "spy-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks over one or more source model files
    Check {
        /// Source model JSON files produced by a frontend
        #[arg(required = true)]
        models: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated codes or names)
        #[arg(long)]
        rules: Option<String>,

        /// Project root for units that do not carry one
        #[arg(long)]
        project_root: Option<PathBuf>,
    },

    /// List available rules
    ListRules,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            models,
            format,
            rules,
            project_root,
        } => {
            let cwd = std::env::current_dir()?;
            let source = config_resolver::resolve(&cwd, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                models,
                format,
                rules,
                project_root,
            };
            let passed = commands::check::run(&options, &source)?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
    }
}
