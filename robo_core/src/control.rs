//! The arm control state machine (`ArmController`).
//!
//! Owns the actuator bus handle and the calibration table. Commands are
//! mapped joint by joint through the calibration and written to the bus;
//! `poll()` reads every channel back and produces a `PublishCycle`.

use std::time::SystemTime;

use robo_traits::ActuatorBus;

use crate::calibration::CalibrationTable;
use crate::config::ArmCfg;
use crate::error::ArmError;
use crate::hw_error::map_bus_error;
use crate::publish::{JointStateMsg, PublishCycle};
use crate::status::{ActuatorCommand, ArmState, CommandOutcome};

pub struct ArmController<B: ActuatorBus> {
    pub(crate) bus: B,
    pub(crate) calibration: CalibrationTable,
    pub(crate) cfg: ArmCfg,
    pub(crate) state: ArmState,
    /// One entry per arm joint.
    pub(crate) commanded: Vec<ActuatorCommand>,
    /// One entry per channel, gripper included. Seeded with zero offsets.
    pub(crate) last_ticks: Vec<i32>,
}

impl<B: ActuatorBus> core::fmt::Debug for ArmController<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ArmController")
            .field("state", &self.state)
            .field("joints", &self.calibration.joint_count())
            .field("commanded", &self.commanded)
            .finish()
    }
}

#[inline]
fn channel_id(channel: usize) -> u8 {
    // CalibrationTable caps the channel count below u8::MAX.
    u8::try_from(channel).unwrap_or(u8::MAX)
}

impl<B: ActuatorBus> ArmController<B> {
    pub(crate) fn new(bus: B, calibration: CalibrationTable, cfg: ArmCfg) -> Self {
        let commanded = calibration
            .joints()
            .iter()
            .map(|j| ActuatorCommand {
                target_ticks: j.zero_offset_ticks,
                speed: 0,
                torque_enabled: false,
            })
            .collect();
        let last_ticks = calibration
            .channels()
            .map(|j| j.zero_offset_ticks)
            .collect();
        Self {
            bus,
            calibration,
            cfg,
            state: ArmState::Idle,
            commanded,
            last_ticks,
        }
    }

    pub fn state(&self) -> ArmState {
        self.state
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    pub fn cfg(&self) -> &ArmCfg {
        &self.cfg
    }

    /// Last command issued per joint (or the idle defaults).
    pub fn commanded(&self) -> &[ActuatorCommand] {
        &self.commanded
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Bring the bus into the Idle state: every channel torque-disabled, then
    /// the optional startup hold joint enabled on its fixed target.
    pub fn startup(&mut self) -> CommandOutcome {
        let mut outcome = CommandOutcome::default();
        for ch in 0..self.calibration.channel_count() {
            self.write(&mut outcome, ch, |bus, id| bus.set_torque_enabled(id, false));
        }
        for cmd in &mut self.commanded {
            cmd.torque_enabled = false;
        }

        if let Some(hold) = self.cfg.startup_hold {
            let speed = self.cfg.speed;
            self.write(&mut outcome, hold.joint, |bus, id| {
                bus.set_torque_enabled(id, true)
            });
            self.write(&mut outcome, hold.joint, |bus, id| bus.set_speed(id, speed));
            self.write(&mut outcome, hold.joint, |bus, id| {
                bus.set_target_ticks(id, hold.target_ticks)
            });
            if let Some(cmd) = self.commanded.get_mut(hold.joint) {
                *cmd = ActuatorCommand {
                    target_ticks: hold.target_ticks,
                    speed,
                    torque_enabled: true,
                };
            }
            tracing::info!(
                joint = hold.joint,
                target_ticks = hold.target_ticks,
                "startup hold applied"
            );
        }
        self.state = ArmState::Idle;
        outcome
    }

    /// Apply a joint-angle vector.
    ///
    /// A vector of the wrong length, with non-finite entries, or with an angle
    /// that maps outside the tick range is rejected
    /// with `MalformedCommand` and leaves both state and commands untouched.
    /// Bus write failures do not abort the batch; they come back in the outcome.
    pub fn apply_command(&mut self, angles: &[f64]) -> Result<CommandOutcome, ArmError> {
        let n = self.calibration.joint_count();
        if angles.len() != n {
            let e = ArmError::MalformedCommand(format!(
                "expected {n} joint angles, got {}",
                angles.len()
            ));
            tracing::warn!(error = %e, "command dropped");
            return Err(e);
        }
        if let Some(i) = angles.iter().position(|a| !a.is_finite()) {
            let e = ArmError::MalformedCommand(format!("joint {i} angle is not finite"));
            tracing::warn!(error = %e, "command dropped");
            return Err(e);
        }

        let speed = self.cfg.speed;
        let next = angles
            .iter()
            .enumerate()
            .map(|(id, &rad)| {
                self.calibration.to_ticks(id, rad).map(|target_ticks| ActuatorCommand {
                    target_ticks,
                    speed,
                    torque_enabled: true,
                })
            })
            .collect::<Result<Vec<_>, _>>();
        let next = match next {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(error = %e, "command dropped");
                return Err(e);
            }
        };

        // All torques, then all speeds, then all goals.
        let mut outcome = CommandOutcome::default();
        for ch in 0..n {
            self.write(&mut outcome, ch, |bus, id| bus.set_torque_enabled(id, true));
        }
        for ch in 0..n {
            self.write(&mut outcome, ch, |bus, id| bus.set_speed(id, speed));
        }
        for (ch, cmd) in next.iter().enumerate() {
            let ticks = cmd.target_ticks;
            self.write(&mut outcome, ch, |bus, id| bus.set_target_ticks(id, ticks));
        }
        tracing::debug!(targets = ?next.iter().map(|c| c.target_ticks).collect::<Vec<_>>(), "command issued");

        self.commanded = next;
        if self.state == ArmState::Idle {
            tracing::info!("arm tracking commands");
        }
        self.state = ArmState::Tracking;
        Ok(outcome)
    }

    /// Read every channel back and convert to radians.
    ///
    /// A failed read substitutes the channel's last-known value and is listed
    /// in `PublishCycle::degraded`; the cycle itself always completes.
    pub fn poll(&mut self, stamp: SystemTime) -> PublishCycle {
        let mut degraded = Vec::new();
        for ch in 0..self.last_ticks.len() {
            match self.bus.read_current_ticks(channel_id(ch)) {
                Ok(ticks) => self.last_ticks[ch] = ticks,
                Err(e) => {
                    let err = map_bus_error(&*e);
                    tracing::debug!(channel = ch, error = %err, "read failed");
                    degraded.push(ch);
                }
            }
        }
        if !degraded.is_empty() {
            let e = ArmError::SensorReadDegraded {
                channels: degraded.clone(),
            };
            tracing::warn!(error = %e, "publishing stale values");
        }

        let positions: Vec<f64> = self
            .calibration
            .joints()
            .iter()
            .zip(&self.last_ticks)
            .map(|(j, &t)| j.to_radians(t))
            .collect();
        let current_gripper = self
            .calibration
            .gripper()
            .zip(self.calibration.gripper_channel())
            .and_then(|(g, ch)| self.last_ticks.get(ch).map(|&t| g.to_radians(t)));

        PublishCycle {
            joint_state: JointStateMsg {
                stamp,
                names: self.cfg.joint_names.clone(),
                positions: positions.clone(),
            },
            current_pose: positions,
            current_gripper,
            degraded,
        }
    }

    /// Disable torque on every channel. Meant as the explicit last action
    /// before the process exits; nothing calls it implicitly.
    pub fn shutdown(&mut self) -> CommandOutcome {
        let mut outcome = CommandOutcome::default();
        for ch in 0..self.calibration.channel_count() {
            self.write(&mut outcome, ch, |bus, id| bus.set_torque_enabled(id, false));
        }
        for cmd in &mut self.commanded {
            cmd.torque_enabled = false;
        }
        tracing::info!(failures = outcome.failures.len(), "torque disabled");
        outcome
    }

    fn write(
        &mut self,
        outcome: &mut CommandOutcome,
        channel: usize,
        op: impl FnOnce(&mut B, u8) -> Result<(), robo_traits::BoxError>,
    ) {
        if let Err(e) = op(&mut self.bus, channel_id(channel)) {
            let err = ArmError::BusWriteFailed {
                channel,
                reason: map_bus_error(&*e).to_string(),
            };
            tracing::warn!(error = %err, "bus write failed");
            outcome.failures.push(err);
        }
    }
}
