//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "robo", version, about = "Arm joint mapper and thermal bearing CLI")]
pub struct Cli {
    /// Path to config TOML (typed); built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Optional calibration CSV (strict header), replaces [calibration]
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Log and print results as JSON
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
    /// Run the arm control loop on the simulated bus
    ///
    /// Commands are JSON arrays of joint angles in radians, one per line.
    /// Every publish cycle is written to stdout as one JSON object per line.
    Arm {
        /// Command file; stdin when omitted or "-"
        #[arg(long, value_name = "FILE")]
        commands: Option<PathBuf>,
        /// Stop after this many milliseconds; runs until Ctrl-C when omitted
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Override bus.port
        #[arg(long, value_name = "PATH")]
        port: Option<String>,
        /// Override bus.baud
        #[arg(long, value_name = "BAUD")]
        baud: Option<u32>,
        /// Override arm.publish_hz
        #[arg(long, value_name = "HZ")]
        publish_hz: Option<u32>,
        /// Print loop counters on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Estimate the bearing to the hottest target in a frame
    Bearing {
        /// Grayscale (or convertible) PNG image
        #[arg(long, value_name = "FILE", conflicts_with = "synthetic", required_unless_present = "synthetic")]
        image: Option<PathBuf>,
        /// Synthetic hot spot centered at X Y
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        synthetic: Option<Vec<f64>>,
        /// Synthetic frame width
        #[arg(long, default_value_t = 330)]
        width: u32,
        /// Synthetic frame height
        #[arg(long, default_value_t = 256)]
        height: u32,
        /// Synthetic hot spot radius in pixels
        #[arg(long, default_value_t = 40.0)]
        radius: f64,
    },
    /// Convert one joint value between radians and ticks
    Convert {
        /// Joint id; the gripper is the id after the last joint
        #[arg(long)]
        joint: usize,
        /// Angle to convert to ticks
        #[arg(long, allow_hyphen_values = true, conflicts_with = "ticks", required_unless_present = "ticks")]
        radians: Option<f64>,
        /// Tick count to convert to radians
        #[arg(long, allow_hyphen_values = true)]
        ticks: Option<i32>,
    },
    /// Validate config and exercise both pipelines on simulated hardware
    SelfCheck,
}
