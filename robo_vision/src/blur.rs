//! Separable Gaussian blur with reflect-101 borders.
use image::GrayImage;

use crate::error::{Result, VisionError};

/// Mirror index `i` into `0..n` without repeating the edge pixel
/// (`dcb|abcd|cba`).
pub(crate) fn reflect101(i: i64, n: i64) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let r = i.rem_euclid(period);
    (if r >= n { period - r } else { r }) as usize
}

/// Sigma used for a kernel of `ksize` taps when none is given.
pub fn sigma_for_kernel(ksize: u32) -> f64 {
    0.3 * ((f64::from(ksize) - 1.0) * 0.5 - 1.0) + 0.8
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianBlur {
    weights: Vec<f32>,
}

impl GaussianBlur {
    /// `ksize` must be odd. A non-positive `sigma` is derived from `ksize`.
    pub fn new(ksize: u32, sigma: f64) -> Result<Self> {
        if ksize == 0 || ksize % 2 == 0 {
            return Err(VisionError::InvalidParams("blur kernel size must be odd"));
        }
        let sigma = if sigma > 0.0 {
            sigma
        } else {
            sigma_for_kernel(ksize)
        };
        let half = i64::from(ksize / 2);
        let raw: Vec<f64> = (-half..=half)
            .map(|i| {
                let d = i as f64;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let sum: f64 = raw.iter().sum();
        Ok(Self {
            weights: raw.iter().map(|w| (w / sum) as f32).collect(),
        })
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn apply(&self, img: &GrayImage) -> GrayImage {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 || self.weights.len() == 1 {
            return img.clone();
        }
        let (wi, hi) = (i64::from(w), i64::from(h));
        let half = (self.weights.len() / 2) as i64;
        let src = img.as_raw();

        let mut rows = vec![0f32; src.len()];
        for y in 0..hi {
            let line = &src[(y * wi) as usize..((y + 1) * wi) as usize];
            for x in 0..wi {
                let acc: f32 = self
                    .weights
                    .iter()
                    .enumerate()
                    .map(|(k, &wk)| wk * f32::from(line[reflect101(x + k as i64 - half, wi)]))
                    .sum();
                rows[(y * wi + x) as usize] = acc;
            }
        }

        GrayImage::from_fn(w, h, |x, y| {
            let (x, y) = (i64::from(x), i64::from(y));
            let acc: f32 = self
                .weights
                .iter()
                .enumerate()
                .map(|(k, &wk)| wk * rows[reflect101(y + k as i64 - half, hi) * w as usize + x as usize])
                .sum();
            image::Luma([acc.round().clamp(0.0, 255.0) as u8])
        })
    }
}
