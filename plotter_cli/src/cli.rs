//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "plotter", version, about = "Pen-plotter arm CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/plotter_config.toml")]
    pub config: PathBuf,

    /// Grid calibration JSON (overrides calibration.grid_json)
    #[arg(long, value_name = "FILE")]
    pub grid: Option<PathBuf>,

    /// Per-joint linear calibration CSV (overrides calibration.linear_csv)
    #[arg(long = "linear-calibration", value_name = "FILE")]
    pub linear_calibration: Option<PathBuf>,

    /// Print results and errors as JSON; log as JSON lines
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
    /// Drive the arm from the joystick until stopped
    Run {
        /// Stop after this many control ticks
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Stop after this many milliseconds
        #[arg(long, value_name = "MS")]
        max_run_ms: Option<u64>,
        /// Hold the simulated stick at this X deflection (0..1) instead of sweeping
        #[arg(long, value_name = "X")]
        stick_x: Option<f64>,
        /// Hold the simulated stick at this Y deflection (0..1) instead of sweeping
        #[arg(long, value_name = "Y")]
        stick_y: Option<f64>,
    },
    /// Solve joint angles for one board position
    Solve {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        /// Use the mirrored elbow configuration
        #[arg(long, action = ArgAction::SetTrue)]
        mirrored: bool,
    },
    /// Look up measured angles for one board position in the grid calibration
    Lookup {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
    /// Validate config and calibration files
    SelfCheck,
}
