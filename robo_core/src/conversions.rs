//! Conversions from `robo_config` schemas into runtime `robo_core` types.
//!
//! Config validation catches most problems with a readable message; these
//! conversions re-check the invariants the runtime types rely on.

use crate::calibration::{CalibrationTable, JointCalibration, Sign};
use crate::config::{ArmCfg, StartupHold};
use crate::error::BuildError;

// ── Calibration ──────────────────────────────────────────────────────────────

impl TryFrom<&robo_config::JointCalRow> for JointCalibration {
    type Error = BuildError;

    fn try_from(r: &robo_config::JointCalRow) -> Result<Self, Self::Error> {
        let sign = Sign::from_i8(r.sign).ok_or_else(|| {
            BuildError::InvalidCalibration(format!("sign must be +1 or -1, got {}", r.sign))
        })?;
        Ok(Self::new(r.zero_offset_ticks, sign, r.ticks_per_radian))
    }
}

impl TryFrom<&robo_config::CalibrationCfg> for CalibrationTable {
    type Error = BuildError;

    fn try_from(c: &robo_config::CalibrationCfg) -> Result<Self, Self::Error> {
        let joints = c
            .joints
            .iter()
            .map(JointCalibration::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let gripper = c.gripper.as_ref().map(JointCalibration::try_from).transpose()?;
        Self::new(joints, gripper)
    }
}

// ── ArmCfg ───────────────────────────────────────────────────────────────────

fn startup_hold(c: &robo_config::StartupHoldCfg) -> Option<StartupHold> {
    c.enabled.then_some(StartupHold {
        joint: c.joint,
        target_ticks: c.target_ticks,
    })
}

impl From<&robo_config::Config> for ArmCfg {
    fn from(c: &robo_config::Config) -> Self {
        Self {
            speed: c.arm.speed,
            publish_hz: c.arm.publish_hz,
            joint_names: c.joint_names(),
            startup_hold: startup_hold(&c.arm.startup_hold),
        }
    }
}
