//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Voice channel presence reconstruction.
///
/// Reads relay notifications mirroring voice channel activity and reports who
/// was connected to a channel, and when.
#[derive(Debug, Parser)]
#[command(name = "vp", version, about, long_about = None)]
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
    /// Export presence intervals as CSV.
    Csv {
        #[command(flatten)]
        query: QueryArgs,

        /// Emit a JSON array instead of CSV.
        #[arg(long)]
        json: bool,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render presence intervals as an SVG timeline.
    Plot {
        #[command(flatten)]
        query: QueryArgs,

        /// Output file.
        #[arg(short, long, default_value = "plot.svg")]
        output: PathBuf,
    },
}

/// Arguments shared by every reporting command.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Relay message export (JSON Lines), or `-` for stdin.
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Name of the voice channel to report on.
    #[arg(long)]
    pub channel: String,

    /// Report on the last N hours.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub hours: Option<i64>,

    /// Window start (ISO 8601 or relative, e.g. "2 hours ago").
    #[arg(long, required_unless_present = "hours")]
    pub start: Option<String>,

    /// Window end (ISO 8601 or relative). Defaults to now.
    #[arg(long)]
    pub end: Option<String>,

    /// Minimum interval length in seconds. Overrides config.
    #[arg(long)]
    pub min_duration: Option<i64>,
}
