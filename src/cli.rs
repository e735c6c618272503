//! Command-line interface definitions for rblscan.
//!
//! Uses `clap` derive macros for declarative argument parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Scan IP ranges against DNS realtime blackhole lists.
///
/// Reads a JSON scan configuration (modes, targets and feeds), checks every
/// target address against every enabled feed and prints the incidents found.
#[derive(Parser, Debug)]
#[command(name = "rblscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan address ranges against DNS blackhole lists", long_about = None)]
pub struct Args {
    /// Scan configuration file (defaults to the XDG config directory)
    #[arg(long, env = "RBLSCAN_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ticket export used by the `tickets` mode
    #[arg(long, env = "RBLSCAN_TICKETS", value_name = "PATH")]
    pub tickets: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Maximum number of concurrent DNS lookups (overrides the config file)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// DNS timeout in milliseconds (overrides the config file)
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Rate limit in queries per second, 0 = unlimited (overrides the config file)
    #[arg(short = 'r', long = "rate")]
    pub rate_limit: Option<u32>,

    /// Verbose output (debug logging and a progress bar)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
