//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::SensorKind;
use std::path::PathBuf;

/// Sensor hub - poll and control the hub's sensors from the command line
#[derive(Parser, Debug)]
#[command(
    name = "sensorhub",
    author,
    version,
    about = "Sensor hub event reader and control tool",
    long_about = "Reads the sensor hub's input device, assembles complete sensor records \n\
                  on every sync marker and drives the hub's enable/delay control files."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SENSORHUB_VERBOSE")]
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
        env = "SENSORHUB_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the hub and print sensor records
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration and the sensor table
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "sensorhub.toml",
        env = "SENSORHUB_CONFIG"
    )]
    pub config: PathBuf,

    /// Sensors to enable, comma separated (e.g. accel,mag,light)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        value_parser = parse_sensor_kind,
        env = "SENSORHUB_ENABLE"
    )]
    pub enable: Vec<SensorKind>,

    /// Stop after this many records (0 = unlimited)
    #[arg(long, default_value = "0", env = "SENSORHUB_MAX_RECORDS")]
    pub max_records: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "SENSORHUB_TIMEOUT")]
    pub timeout: u64,

    /// Record buffer capacity per read
    #[arg(long, default_value = "16", env = "SENSORHUB_BUFFER")]
    pub buffer: usize,

    /// Idle sleep between empty reads, in milliseconds
    #[arg(long, default_value = "5", env = "SENSORHUB_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Metrics server port (overrides configuration)
    #[arg(long, env = "SENSORHUB_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Print records as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(
        short,
        long,
        default_value = "sensorhub.toml",
        env = "SENSORHUB_CONFIG"
    )]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long, env = "SENSORHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the sensor table
    #[arg(long)]
    pub sensors: bool,
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

impl From<LogFormat> for contracts::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => contracts::LogFormat::Json,
            LogFormat::Pretty => contracts::LogFormat::Pretty,
            LogFormat::Compact => contracts::LogFormat::Compact,
        }
    }
}

fn parse_sensor_kind(s: &str) -> Result<SensorKind, String> {
    s.parse()
}
