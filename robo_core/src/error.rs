use thiserror::Error;

/// Runtime failures of the arm mapper and control loop.
///
/// Only `OutOfRangeJoint` is fatal, and only when it surfaces during startup
/// validation. Everything else is logged and the loop keeps running.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArmError {
    #[error("joint {joint} is outside the calibration table ({channels} channels)")]
    OutOfRangeJoint { joint: usize, channels: usize },
    #[error("malformed command: {0}")]
    MalformedCommand(String),
    #[error("sensor read degraded on channels {channels:?}; last-known values substituted")]
    SensorReadDegraded { channels: Vec<usize> },
    #[error("bus write failed on channel {channel}: {reason}")]
    BusWriteFailed { channel: usize, reason: String },
    #[error("actuator bus timeout")]
    Timeout,
    #[error("actuator bus error: {0}")]
    Bus(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Arm(#[from] ArmError),
}
