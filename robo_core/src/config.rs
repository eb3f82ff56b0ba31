//! Configuration types for the arm controller.
//!
//! These are the runtime configuration structs used by `ArmController`.
//! They are separate from the TOML-deserialized config in `robo_config`.

/// Speed register value written alongside every target.
pub const DEFAULT_SPEED: u32 = 100;
/// Publish rate of the read-back loop.
pub const DEFAULT_PUBLISH_HZ: u32 = 10;

/// Joint the arm holds on startup, before any command arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupHold {
    pub joint: usize,
    pub target_ticks: i32,
}

impl Default for StartupHold {
    fn default() -> Self {
        // Wrist joint next to the gripper, held near its mechanical center.
        Self {
            joint: 4,
            target_ticks: 2050,
        }
    }
}

/// Controller configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmCfg {
    /// Speed register value for every commanded joint.
    pub speed: u32,
    /// Read-back and publish rate in Hz.
    pub publish_hz: u32,
    /// Names published with the joint state, one per arm joint.
    pub joint_names: Vec<String>,
    /// Optional joint enabled at startup with a fixed target.
    pub startup_hold: Option<StartupHold>,
}

impl Default for ArmCfg {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            publish_hz: DEFAULT_PUBLISH_HZ,
            joint_names: default_joint_names(7),
            startup_hold: Some(StartupHold::default()),
        }
    }
}

/// `la_1_joint`, `la_2_joint`, ...
pub fn default_joint_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("la_{i}_joint")).collect()
}
