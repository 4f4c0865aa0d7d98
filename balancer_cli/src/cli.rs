//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "balancer", version, about = "Ball-balancer operator console (simulated device)")]
pub struct Cli {
    /// Path to config TOML; defaults are used when the file is absent
    #[arg(long, value_name = "FILE", default_value = "etc/balancer.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the session loop against the built-in simulated device
    Run {
        /// Stop after this many milliseconds (runs until Ctrl-C when absent)
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,

        /// Simulated telemetry rate in Hz
        #[arg(long, value_name = "HZ", default_value_t = 20)]
        status_hz: u32,

        /// Print a view snapshot every N processed events
        #[arg(long, value_name = "N", default_value_t = 20)]
        snapshot_every: u64,

        /// Start the circular trajectory generator with this radius
        #[arg(long, value_name = "UNITS")]
        circle_radius: Option<f64>,

        /// Trajectory frequency in Hz (used with --circle-radius)
        #[arg(long, value_name = "HZ", default_value_t = 0.5)]
        circle_hz: f64,
    },
    /// Quick health check: decode, reconcile and view one scripted round
    SelfCheck,
}
