//! Conversion from captured frames into `image` buffers.
use image::GrayImage;
use robo_traits::GrayFrame;

use crate::error::{Result, VisionError};

/// Take ownership of a capture as a `GrayImage`, optionally mirrored
/// left to right.
pub fn to_gray_image(frame: GrayFrame, mirror: bool) -> Result<GrayImage> {
    let GrayFrame {
        width,
        height,
        pixels,
    } = frame;
    let len = pixels.len();
    let img = GrayImage::from_raw(width, height, pixels).ok_or(VisionError::FrameSize {
        width,
        height,
        len,
    })?;
    if mirror {
        Ok(image::imageops::flip_horizontal(&img))
    } else {
        Ok(img)
    }
}
