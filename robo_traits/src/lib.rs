pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type used at every hardware trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Register-level access to a chain of position-controlled servos.
///
/// Channel ids are the servo ids on the bus; the arm maps joint `i` to channel `i`.
pub trait ActuatorBus {
    fn set_torque_enabled(&mut self, channel: u8, enabled: bool) -> Result<(), BoxError>;
    fn set_speed(&mut self, channel: u8, speed: u32) -> Result<(), BoxError>;
    fn set_target_ticks(&mut self, channel: u8, ticks: i32) -> Result<(), BoxError>;
    fn read_current_ticks(&mut self, channel: u8) -> Result<i32, BoxError>;
}

/// One 8-bit grayscale capture, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Source of thermal captures. `Ok(None)` means no new frame is available yet.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Option<GrayFrame>, BoxError>;
}
