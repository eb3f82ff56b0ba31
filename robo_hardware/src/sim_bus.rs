//! In-memory servo chain for tests and dry runs.
//!
//! The bus and its `SimBusHandle` share one state, so a test can keep the
//! handle while the controller owns the bus, then inject faults or inspect
//! registers from outside.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use robo_traits::{ActuatorBus, BoxError};

use crate::error::HwError;

/// Mid-range position of a 12-bit servo.
pub const CENTER_TICKS: i32 = 2048;

/// Register state of one simulated servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimServo {
    pub torque_enabled: bool,
    pub speed: u32,
    pub target_ticks: i32,
    pub position_ticks: i32,
}

impl SimServo {
    fn at(position_ticks: i32) -> Self {
        Self {
            torque_enabled: false,
            speed: 0,
            target_ticks: position_ticks,
            position_ticks,
        }
    }
}

/// One register write, in the order the bus received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusWrite {
    Torque { channel: u8, enabled: bool },
    Speed { channel: u8, speed: u32 },
    Target { channel: u8, ticks: i32 },
}

impl BusWrite {
    pub fn channel(&self) -> u8 {
        match *self {
            Self::Torque { channel, .. } | Self::Speed { channel, .. } | Self::Target { channel, .. } => {
                channel
            }
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    servos: BTreeMap<u8, SimServo>,
    read_faults: BTreeSet<u8>,
    write_faults: BTreeSet<u8>,
    writes: Vec<BusWrite>,
    reads: u64,
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Simulated servo chain. A target written with torque enabled is reached
/// immediately; with torque off the servo stays where it is.
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    state: Arc<Mutex<SimState>>,
}

/// Inspection and fault-injection handle for a `SimulatedBus`.
#[derive(Debug, Clone)]
pub struct SimBusHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedBus {
    /// `channels` servos with ids `0..channels`, all resting at `CENTER_TICKS`.
    pub fn new(channels: u8) -> Self {
        Self::with_positions(&vec![CENTER_TICKS; usize::from(channels)])
    }

    /// One servo per entry, resting at the given tick positions.
    pub fn with_positions(positions: &[i32]) -> Self {
        let servos = positions
            .iter()
            .zip(0u8..)
            .map(|(&p, id)| (id, SimServo::at(p)))
            .collect();
        Self {
            state: Arc::new(Mutex::new(SimState {
                servos,
                ..SimState::default()
            })),
        }
    }

    pub fn handle(&self) -> SimBusHandle {
        SimBusHandle {
            state: self.state.clone(),
        }
    }

    fn write(
        &mut self,
        channel: u8,
        record: BusWrite,
        apply: impl FnOnce(&mut SimServo),
    ) -> Result<(), BoxError> {
        let mut st = lock(&self.state);
        if st.write_faults.contains(&channel) {
            return Err(Box::new(HwError::Bus(format!(
                "no status packet from servo {channel}"
            ))));
        }
        let servo = st
            .servos
            .get_mut(&channel)
            .ok_or(HwError::NoSuchChannel(channel))?;
        apply(servo);
        if servo.torque_enabled {
            servo.position_ticks = servo.target_ticks;
        }
        st.writes.push(record);
        Ok(())
    }
}

impl ActuatorBus for SimulatedBus {
    fn set_torque_enabled(&mut self, channel: u8, enabled: bool) -> Result<(), BoxError> {
        self.write(channel, BusWrite::Torque { channel, enabled }, |s| {
            s.torque_enabled = enabled;
        })
    }

    fn set_speed(&mut self, channel: u8, speed: u32) -> Result<(), BoxError> {
        self.write(channel, BusWrite::Speed { channel, speed }, |s| s.speed = speed)
    }

    fn set_target_ticks(&mut self, channel: u8, ticks: i32) -> Result<(), BoxError> {
        self.write(channel, BusWrite::Target { channel, ticks }, |s| {
            s.target_ticks = ticks;
        })
    }

    fn read_current_ticks(&mut self, channel: u8) -> Result<i32, BoxError> {
        let mut st = lock(&self.state);
        st.reads += 1;
        if st.read_faults.contains(&channel) {
            tracing::trace!(channel, "simulated read timeout");
            return Err(Box::new(HwError::Timeout));
        }
        st.servos
            .get(&channel)
            .map(|s| s.position_ticks)
            .ok_or_else(|| Box::new(HwError::NoSuchChannel(channel)) as BoxError)
    }
}

impl SimBusHandle {
    /// Make every read of `channel` time out until faults are cleared.
    pub fn fail_reads(&self, channel: u8) {
        lock(&self.state).read_faults.insert(channel);
    }

    /// Make every write to `channel` fail until faults are cleared.
    pub fn fail_writes(&self, channel: u8) {
        lock(&self.state).write_faults.insert(channel);
    }

    pub fn clear_faults(&self) {
        let mut st = lock(&self.state);
        st.read_faults.clear();
        st.write_faults.clear();
    }

    pub fn servo(&self, channel: u8) -> Option<SimServo> {
        lock(&self.state).servos.get(&channel).copied()
    }

    pub fn torque_enabled(&self, channel: u8) -> Option<bool> {
        self.servo(channel).map(|s| s.torque_enabled)
    }

    pub fn target_ticks(&self, channel: u8) -> Option<i32> {
        self.servo(channel).map(|s| s.target_ticks)
    }

    pub fn position_ticks(&self, channel: u8) -> Option<i32> {
        self.servo(channel).map(|s| s.position_ticks)
    }

    /// Move a servo by hand, as if backdriven.
    pub fn set_position(&self, channel: u8, ticks: i32) {
        if let Some(s) = lock(&self.state).servos.get_mut(&channel) {
            s.position_ticks = ticks;
        }
    }

    /// Every successful write so far.
    pub fn writes(&self) -> Vec<BusWrite> {
        lock(&self.state).writes.clone()
    }

    pub fn clear_writes(&self) {
        lock(&self.state).writes.clear();
    }

    /// Number of read attempts, failed ones included.
    pub fn read_count(&self) -> u64 {
        lock(&self.state).reads
    }
}
