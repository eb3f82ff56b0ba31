//! Simulated hardware behind the `robo_traits` seams.
//!
//! Serial servo framing and camera drivers live outside this workspace; the
//! simulations here stand in for them in tests, benches and dry runs.
pub mod error;
pub mod sim_bus;
pub mod sim_camera;
pub mod util;

pub use sim_bus::{BusWrite, CENTER_TICKS, SimBusHandle, SimServo, SimulatedBus};
pub use sim_camera::{SimulatedThermalCamera, synthetic_hot_spot, uniform_frame};
