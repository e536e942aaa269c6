//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Biosync - real-time biomechanics pipeline for sensor garments
#[derive(Parser, Debug)]
#[command(
    name = "biosync",
    author,
    version,
    about = "Wearable sensor stream analytics pipeline",
    long_about = "A real-time analytics pipeline for wearable sensor garments.\n\n\
                  Ingests IMU and time-of-flight sensor streams, filters and \n\
                  windows them per sensor, detects anomalies against baselines, \n\
                  and dispatches metrics, heat maps and alerts to configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BIOSYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BIOSYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the analytics pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "session.toml", env = "BIOSYNC_CONFIG")]
    pub config: PathBuf,

    /// Override the transport endpoint from configuration
    #[arg(long, env = "BIOSYNC_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Maximum number of window reports to produce (0 = unlimited)
    #[arg(long, default_value = "0", env = "BIOSYNC_MAX_WINDOWS")]
    pub max_windows: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "BIOSYNC_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "1024", env = "BIOSYNC_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "BIOSYNC_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "session.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "session.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed sensor information
    #[arg(long)]
    pub sensors: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
