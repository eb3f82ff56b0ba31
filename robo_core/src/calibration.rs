//! Per-joint affine mapping between joint space (radians) and actuator ticks.
//!
//! Each channel carries a zero offset, a mounting sign and a scale:
//!
//! ```text
//! ticks   = zero_offset_ticks + sign * radians * ticks_per_radian   (rounded to nearest)
//! radians = sign * (ticks - zero_offset_ticks) / ticks_per_radian
//! ```
//!
//! Ticks are integral, so the two directions are not symmetric:
//! `to_ticks(to_radians(t)) == t` holds exactly, while
//! `to_radians(to_ticks(θ))` only recovers θ to within one tick of angular
//! resolution (at most half a tick with round-to-nearest).

use crate::error::{ArmError, BuildError};

/// 12-bit servos: 4095 ticks per full turn.
pub const DEFAULT_TICKS_PER_RADIAN: f64 = 4095.0 / std::f64::consts::TAU;

/// Highest number of channels a single bus can address.
pub const MAX_CHANNELS: usize = 254;

/// Mounting direction of a servo relative to the joint's positive rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    #[inline]
    pub fn factor(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }

    /// Parse the `+1` / `-1` convention used in config files.
    pub fn from_i8(v: i8) -> Option<Self> {
        match v {
            1 => Some(Sign::Positive),
            -1 => Some(Sign::Negative),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointCalibration {
    pub zero_offset_ticks: i32,
    pub sign: Sign,
    pub ticks_per_radian: f64,
}

impl JointCalibration {
    pub const fn new(zero_offset_ticks: i32, sign: Sign, ticks_per_radian: f64) -> Self {
        Self {
            zero_offset_ticks,
            sign,
            ticks_per_radian,
        }
    }

    /// Forward transform. Values beyond the `i32` range saturate; non-finite
    /// angles map to 0. Use `checked_to_ticks` for untrusted input.
    #[inline]
    pub fn to_ticks(&self, radians: f64) -> i32 {
        self.raw_ticks(radians).round() as i32
    }

    /// Forward transform, `None` for non-finite angles or targets outside `i32`.
    #[inline]
    pub fn checked_to_ticks(&self, radians: f64) -> Option<i32> {
        let ticks = self.raw_ticks(radians).round();
        (ticks.is_finite() && ticks >= f64::from(i32::MIN) && ticks <= f64::from(i32::MAX))
            .then_some(ticks as i32)
    }

    #[inline]
    fn raw_ticks(&self, radians: f64) -> f64 {
        f64::from(self.zero_offset_ticks) + self.sign.factor() * radians * self.ticks_per_radian
    }

    /// Inverse transform. Exact up to floating-point error for every `i32` input.
    #[inline]
    pub fn to_radians(&self, ticks: i32) -> f64 {
        let delta = i64::from(ticks) - i64::from(self.zero_offset_ticks);
        self.sign.factor() * (delta as f64) / self.ticks_per_radian
    }

    /// Angular size of one tick.
    #[inline]
    pub fn radians_per_tick(&self) -> f64 {
        1.0 / self.ticks_per_radian
    }

    fn validate(&self, channel: usize) -> Result<(), BuildError> {
        if !self.ticks_per_radian.is_finite() || self.ticks_per_radian <= 0.0 {
            return Err(BuildError::InvalidCalibration(format!(
                "channel {channel}: ticks_per_radian must be finite and > 0, got {}",
                self.ticks_per_radian
            )));
        }
        Ok(())
    }
}

/// Left arm bench calibration, joints `la_1` .. `la_7`.
const LEFT_ARM_JOINTS: [JointCalibration; 7] = [
    JointCalibration::new(1530, Sign::Negative, DEFAULT_TICKS_PER_RADIAN),
    JointCalibration::new(2107, Sign::Positive, DEFAULT_TICKS_PER_RADIAN),
    JointCalibration::new(2048, Sign::Negative, DEFAULT_TICKS_PER_RADIAN),
    JointCalibration::new(2102, Sign::Positive, DEFAULT_TICKS_PER_RADIAN),
    JointCalibration::new(2048, Sign::Negative, DEFAULT_TICKS_PER_RADIAN),
    JointCalibration::new(2068, Sign::Positive, DEFAULT_TICKS_PER_RADIAN),
    JointCalibration::new(1924, Sign::Negative, DEFAULT_TICKS_PER_RADIAN),
];

const LEFT_ARM_GRIPPER: JointCalibration =
    JointCalibration::new(1400, Sign::Positive, DEFAULT_TICKS_PER_RADIAN);

/// Immutable calibration for every channel on one arm bus.
///
/// Joint ids `0..joint_count()` are the arm joints. When a gripper is
/// calibrated it occupies the next id (`joint_count()`), which is also its
/// channel on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    joints: Vec<JointCalibration>,
    gripper: Option<JointCalibration>,
}

impl CalibrationTable {
    pub fn new(
        joints: Vec<JointCalibration>,
        gripper: Option<JointCalibration>,
    ) -> Result<Self, BuildError> {
        if joints.is_empty() {
            return Err(BuildError::InvalidCalibration(
                "at least one joint is required".into(),
            ));
        }
        let channels = joints.len() + usize::from(gripper.is_some());
        if channels > MAX_CHANNELS {
            return Err(BuildError::InvalidCalibration(format!(
                "{channels} channels exceed the bus limit of {MAX_CHANNELS}"
            )));
        }
        for (id, j) in joints.iter().chain(gripper.iter()).enumerate() {
            j.validate(id)?;
        }
        Ok(Self { joints, gripper })
    }

    /// The seven-joint left arm with its gripper channel.
    pub fn left_arm() -> Self {
        Self {
            joints: LEFT_ARM_JOINTS.to_vec(),
            gripper: Some(LEFT_ARM_GRIPPER),
        }
    }

    /// Number of arm joints (the length of a valid command vector).
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Number of channels read back on each publish cycle, gripper included.
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.joints.len() + usize::from(self.gripper.is_some())
    }

    /// Channel id of the gripper, if one is calibrated.
    pub fn gripper_channel(&self) -> Option<usize> {
        self.gripper.map(|_| self.joints.len())
    }

    pub fn joints(&self) -> &[JointCalibration] {
        &self.joints
    }

    pub fn gripper(&self) -> Option<&JointCalibration> {
        self.gripper.as_ref()
    }

    /// Calibration entry for a joint or the gripper channel.
    pub fn entry(&self, joint: usize) -> Result<&JointCalibration, ArmError> {
        self.joints
            .get(joint)
            .or_else(|| {
                self.gripper
                    .as_ref()
                    .filter(|_| joint == self.joints.len())
            })
            .ok_or(ArmError::OutOfRangeJoint {
                joint,
                channels: self.channel_count(),
            })
    }

    /// Every channel in id order.
    pub fn channels(&self) -> impl Iterator<Item = &JointCalibration> {
        self.joints.iter().chain(self.gripper.iter())
    }

    /// Radians to ticks for one channel.
    ///
    /// Fails with `OutOfRangeJoint` for an unknown id and with
    /// `MalformedCommand` when the angle is non-finite or maps outside `i32`.
    pub fn to_ticks(&self, joint: usize, radians: f64) -> Result<i32, ArmError> {
        self.entry(joint)?.checked_to_ticks(radians).ok_or_else(|| {
            ArmError::MalformedCommand(format!(
                "joint {joint}: {radians} rad has no tick position"
            ))
        })
    }

    pub fn to_radians(&self, joint: usize, ticks: i32) -> Result<f64, ArmError> {
        Ok(self.entry(joint)?.to_radians(ticks))
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::left_arm()
    }
}
