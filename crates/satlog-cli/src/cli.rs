//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Satisfactory dedicated-server log analyzer.
///
/// Reads `FactoryGame*.log` files, reconstructs player sessions and server
/// uptime, and writes a JSON report for the metrics dashboard.
#[derive(Debug, Parser)]
#[command(name = "satlog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze server logs and write the metrics report.
    Analyze {
        /// Directory containing the server logs (overrides `log_dir`).
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Report destination (overrides `output_path`).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report JSON to stdout instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Show per-player statistics without writing a report.
    Players {
        /// Directory containing the server logs (overrides `log_dir`).
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
