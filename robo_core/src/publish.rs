//! Outbound joint-state publication.

use std::time::SystemTime;

use crossbeam_channel as xch;

/// Named joint positions at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct JointStateMsg {
    pub stamp: SystemTime,
    pub names: Vec<String>,
    pub positions: Vec<f64>,
}

/// Everything produced by one read-back cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishCycle {
    pub joint_state: JointStateMsg,
    /// Same positions as `joint_state`, published on its own for pose consumers.
    pub current_pose: Vec<f64>,
    /// Gripper channel in radians; `None` when no gripper is calibrated.
    pub current_gripper: Option<f64>,
    /// Channels whose read failed this cycle and carry their last-known value.
    pub degraded: Vec<usize>,
}

impl PublishCycle {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Consumer of publish cycles (topic fan-out, logging, a test recorder).
pub trait StateSink {
    fn publish(&mut self, cycle: &PublishCycle);
}

/// Channel-backed sink. Never blocks: a full or disconnected channel drops the cycle.
impl StateSink for xch::Sender<PublishCycle> {
    fn publish(&mut self, cycle: &PublishCycle) {
        if let Err(e) = self.try_send(cycle.clone()) {
            tracing::trace!(error = %e, "publish cycle dropped");
        }
    }
}
