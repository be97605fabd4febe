use std::path::PathBuf;
use std::time::Duration;

use aerotel_ingest::{IngestConfig, TimestampPolicy};
use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod ports;
pub mod replay;
pub mod synth;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest from a serial port and print the rolling window every tick.
    Watch(WatchArgs),
    /// Ingest a captured byte stream to the end and print a summary.
    Replay(ReplayArgs),
    /// Write a synthetic capture of well-formed frames.
    Synth(SynthArgs),
    /// List available serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Watch(args) => watch::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Synth(args) => synth::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Serial port (e.g. /dev/ttyUSB0, COM7).
    #[arg(env = "AEROTEL_PORT")]
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value_t = aerotel_transport::serial::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Read timeout; bounds shutdown latency (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub timeout: String,
    /// Window shown on each tick (e.g. 120s, 5m).
    #[arg(long, default_value = "120s")]
    pub window: String,
    /// Interval between prints.
    #[arg(long, default_value = "1s")]
    pub tick: String,
    /// Maximum samples retained.
    #[arg(long, default_value_t = aerotel_store::DEFAULT_MAX_SAMPLES)]
    pub capacity: usize,
    /// Use arrival time when the in-band timestamp is invalid.
    #[arg(long)]
    pub arrival_fallback: bool,
    /// Exit after N ticks.
    #[arg(long)]
    pub ticks: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Capture file holding the raw byte stream.
    pub path: PathBuf,
    /// Window reported from the latest sample.
    #[arg(long, default_value = "120s")]
    pub window: String,
    /// Maximum samples retained.
    #[arg(long, default_value_t = aerotel_store::DEFAULT_MAX_SAMPLES)]
    pub capacity: usize,
    /// Use arrival time when the in-band timestamp is invalid.
    #[arg(long)]
    pub arrival_fallback: bool,
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Capture file to write.
    pub path: PathBuf,
    /// Number of frames.
    #[arg(long, default_value_t = 100)]
    pub count: u32,
    /// Spacing of in-band timestamps.
    #[arg(long, default_value = "1s")]
    pub interval: String,
    /// Timestamp of the first frame (RFC 3339). Default: now.
    #[arg(long)]
    pub start: Option<String>,
    /// Insert junk bytes between frames.
    #[arg(long)]
    pub noise: bool,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn ingest_config(arrival_fallback: bool) -> IngestConfig {
    IngestConfig {
        timestamp_policy: if arrival_fallback {
            TimestampPolicy::ArrivalFallback
        } else {
            TimestampPolicy::Strict
        },
    }
}

pub(crate) fn parse_capacity(capacity: usize) -> CliResult<usize> {
    if capacity == 0 {
        return Err(CliError::new(USAGE, "capacity must be greater than zero"));
    }
    Ok(capacity)
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else if let Some(num) = input.strip_suffix('m') {
        (num, "m")
    } else if let Some(num) = input.strip_suffix('h') {
        (num, "h")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    let duration = match unit {
        "ms" => Some(Duration::from_millis(value)),
        "s" => Some(Duration::from_secs(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs),
        _ => value.checked_mul(3600).map(Duration::from_secs),
    };
    duration.ok_or_else(|| CliError::new(USAGE, format!("duration too large: {input}")))
}
