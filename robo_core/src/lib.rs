#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Arm joint mapping and control loop (hardware-agnostic).
//!
//! All bus traffic goes through `robo_traits::ActuatorBus`; this crate never
//! touches a serial port.
//!
//! ## Architecture
//!
//! - **Calibration**: per-joint zero offset, direction and scale (`calibration`)
//! - **Configuration**: runtime config structs (`config`, `conversions`)
//! - **Control**: command application, read-back, startup/shutdown (`control`)
//! - **Orchestration**: command and publish tasks (`runner`)
//! - **Publishing**: joint state messages and sinks (`publish`)
//!
//! ## Units
//!
//! Commands and published positions are radians. The bus speaks integer
//! ticks; a command converts to the nearest tick, so a commanded angle reads
//! back within half a tick of where it was sent.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod control;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod publish;
pub mod runner;
pub mod status;
pub mod util;

pub use builder::ArmBuilder;
pub use calibration::{CalibrationTable, JointCalibration, Sign};
pub use config::{ArmCfg, StartupHold};
pub use control::ArmController;
pub use error::{ArmError, BuildError};
pub use publish::{JointStateMsg, PublishCycle, StateSink};
pub use runner::{ArmRunner, RunnerStats};
pub use status::{ActuatorCommand, ArmState, CommandOutcome};
