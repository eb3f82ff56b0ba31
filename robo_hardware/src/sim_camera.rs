//! Scripted thermal camera and synthetic frame generators.
use std::collections::VecDeque;

use robo_traits::{BoxError, FrameSource, GrayFrame};

/// Replays a queue of frames, one per `capture()`. Once the queue is empty it
/// keeps reporting "no new frame".
#[derive(Debug, Default)]
pub struct SimulatedThermalCamera {
    frames: VecDeque<GrayFrame>,
    captured: u64,
}

impl SimulatedThermalCamera {
    pub fn new(frames: impl IntoIterator<Item = GrayFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            captured: 0,
        }
    }

    pub fn push(&mut self, frame: GrayFrame) {
        self.frames.push_back(frame);
    }

    /// Frames handed out so far.
    pub fn captured(&self) -> u64 {
        self.captured
    }
}

impl FrameSource for SimulatedThermalCamera {
    fn capture(&mut self) -> Result<Option<GrayFrame>, BoxError> {
        let frame = self.frames.pop_front();
        if frame.is_some() {
            self.captured += 1;
        }
        Ok(frame)
    }
}

/// Uniform frame.
pub fn uniform_frame(width: u32, height: u32, value: u8) -> GrayFrame {
    GrayFrame {
        width,
        height,
        pixels: vec![value; width as usize * height as usize],
    }
}

/// A filled disc of `hot` on a `background` field, the way a person shows up
/// against a cool room.
pub fn synthetic_hot_spot(
    width: u32,
    height: u32,
    center: (f64, f64),
    radius: f64,
    background: u8,
    hot: u8,
) -> GrayFrame {
    let mut frame = uniform_frame(width, height, background);
    let r2 = radius * radius;
    for y in 0..height {
        for x in 0..width {
            let dx = f64::from(x) - center.0;
            let dy = f64::from(y) - center.1;
            if dx * dx + dy * dy <= r2 {
                frame.pixels[(y * width + x) as usize] = hot;
            }
        }
    }
    frame
}
