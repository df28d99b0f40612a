//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Sentiscope - Score product reviews with a sentiment analysis service.
#[derive(Debug, Parser)]
#[command(name = "sentiscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Scoring service URL
    #[arg(long, global = true, env = "SENTISCOPE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds (0 disables)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Maximum scoring requests in flight at once
    #[arg(long, global = true)]
    pub max_concurrency: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON snapshot
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a single review
    Analyze(AnalyzeArgs),

    /// Analyze a JSON file of reviews
    Batch(BatchArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Review text
    pub text: String,
}

/// Arguments for the batch command.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// JSON file containing an array of `{"text": ...}` objects
    pub file: PathBuf,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl Cli {
    /// Default log filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
