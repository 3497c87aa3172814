//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Junction Roster - drive a people roster through a junction
#[derive(Parser, Debug)]
#[command(
    name = "junction-roster",
    author,
    version,
    about = "Feed scripted roster updates through a junction",
    long_about = "Loads a roster of people, binds rename and birthday update streams to \n\
                  them through a junction, and prints the snapshot published after \n\
                  every applied update."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "JUNCTION_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "JUNCTION_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the roster through a junction
    Run(RunArgs),

    /// Validate a roster file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to roster file (TOML or JSON)
    #[arg(short, long, default_value = "roster.toml", env = "JUNCTION_ROSTER")]
    pub config: PathBuf,

    /// Override the junction name from the roster
    #[arg(long, env = "JUNCTION_NAME")]
    pub name: Option<String>,

    /// Capacity of each update channel
    #[arg(long, default_value = "16", env = "JUNCTION_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Print snapshots as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Load and validate the roster, then exit
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "JUNCTION_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to roster file to validate
    #[arg(short, long, default_value = "roster.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
