//! # vine-cli
//!
//! Command-line interface for searching npm dependency trees.
//!
//! This is the main entry point for the `vine` binary. It handles argument
//! parsing, sets up logging, and dispatches to the command handlers.

use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use vine_core::error::VineResult;

mod commands;
mod config;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Search npm dependency trees and popularity data
#[derive(Parser)]
#[command(name = "vine", version, about = "npm dependency tree search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for a (possibly nested) dependency within a package's tree
    Depsearch {
        /// The dependency to search for (all versions are matched)
        needle: String,
        /// The package to search within, optionally as name@version
        haystack: String,
    },
    /// List the most popular packages that directly depend on a package
    PopularReverseDeps {
        /// The package to find reverse dependencies of
        package: String,
        /// Only show packages updated this recently, e.g. 2y, 6m, 3w, 10d
        #[arg(long, value_parser = commands::parse_recency, value_name = "PERIOD")]
        recent_update: Option<DateTime<Utc>>,
        /// Only show packages with at least this many downloads
        #[arg(long, value_name = "THRESHOLD")]
        downloads: Option<u64>,
        /// Only fetch this many candidate packages
        #[arg(long, default_value_t = 100, value_name = "MAXIMUM")]
        max_results: usize,
    },
    /// List popular packages whose dependency tree contains a package
    PopularPackagesContaining {
        /// The package to search for
        package: String,
        /// Only show packages updated this recently, e.g. 2y, 6m, 3w, 10d
        #[arg(long, value_parser = commands::parse_recency, value_name = "PERIOD")]
        recent_update: Option<DateTime<Utc>>,
        /// Only show packages with at least this many downloads
        #[arg(long, value_name = "THRESHOLD")]
        downloads: Option<u64>,
        /// Only fetch this many candidate packages
        #[arg(long, default_value_t = 50, value_name = "MAXIMUM")]
        max_results: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    info!("Starting vine v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&error));
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> VineResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        vine_core::error::VineError::io("Failed to create async runtime".to_string(), e)
    })?;

    rt.block_on(async {
        let ctx = CommandContext::new()?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "vine={level},vine_core={level},vine_resolver={level},vine_registry={level}"
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
