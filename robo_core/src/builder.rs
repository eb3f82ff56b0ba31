//! Type-state builder for `ArmController`.
//!
//! The bus and the calibration table are tracked in the builder's type, so
//! `build()` only exists once both have been provided. Everything else has
//! defaults from `ArmCfg`.

use robo_traits::ActuatorBus;

use crate::calibration::CalibrationTable;
use crate::config::{ArmCfg, StartupHold};
use crate::control::ArmController;
use crate::error::{ArmError, BuildError};

/// Placeholder for a part not provided yet.
pub struct Missing;

pub struct ArmBuilder<B, C> {
    bus: B,
    calibration: C,
    cfg: ArmCfg,
}

impl Default for ArmBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            bus: Missing,
            calibration: Missing,
            cfg: ArmCfg::default(),
        }
    }
}

impl ArmBuilder<Missing, Missing> {
    /// Start building a controller.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C> ArmBuilder<Missing, C> {
    pub fn with_bus<B: ActuatorBus>(self, bus: B) -> ArmBuilder<B, C> {
        ArmBuilder {
            bus,
            calibration: self.calibration,
            cfg: self.cfg,
        }
    }
}

impl<B> ArmBuilder<B, Missing> {
    pub fn with_calibration(self, table: CalibrationTable) -> ArmBuilder<B, CalibrationTable> {
        ArmBuilder {
            bus: self.bus,
            calibration: table,
            cfg: self.cfg,
        }
    }
}

impl<B, C> ArmBuilder<B, C> {
    pub fn with_cfg(mut self, cfg: ArmCfg) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.cfg.speed = speed;
        self
    }

    pub fn with_publish_hz(mut self, hz: u32) -> Self {
        self.cfg.publish_hz = hz;
        self
    }

    pub fn with_joint_names(mut self, names: Vec<String>) -> Self {
        self.cfg.joint_names = names;
        self
    }

    pub fn with_startup_hold(mut self, hold: Option<StartupHold>) -> Self {
        self.cfg.startup_hold = hold;
        self
    }
}

impl<B: ActuatorBus> ArmBuilder<B, CalibrationTable> {
    /// Validate the configuration against the table and build the controller.
    ///
    /// The controller starts Idle without touching the bus; call
    /// `ArmController::startup` (the runner does) to disable torque and apply
    /// the startup hold.
    pub fn build(self) -> Result<ArmController<B>, BuildError> {
        let n = self.calibration.joint_count();
        if self.cfg.speed == 0 {
            return Err(BuildError::InvalidConfig("speed must be > 0"));
        }
        if self.cfg.publish_hz == 0 {
            return Err(BuildError::InvalidConfig("publish_hz must be > 0"));
        }
        if self.cfg.joint_names.len() != n {
            return Err(BuildError::InvalidConfig(
                "joint_names must have one entry per calibrated joint",
            ));
        }
        if let Some(hold) = self.cfg.startup_hold
            && hold.joint >= n
        {
            return Err(BuildError::Arm(ArmError::OutOfRangeJoint {
                joint: hold.joint,
                channels: n,
            }));
        }
        Ok(ArmController::new(self.bus, self.calibration, self.cfg))
    }
}
