//! Controller state and per-command outcomes.

use crate::error::ArmError;

/// Two-state controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    /// No command applied yet beyond the startup hold.
    Idle,
    /// The most recent command vector is being applied.
    Tracking,
}

/// What the controller last asked of one joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub target_ticks: i32,
    pub speed: u32,
    pub torque_enabled: bool,
}

/// Result of issuing a batch of bus writes.
///
/// Writes are fire-and-forget: a failed write is recorded here and logged,
/// the remaining writes are still issued.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CommandOutcome {
    pub failures: Vec<ArmError>,
}

impl CommandOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
