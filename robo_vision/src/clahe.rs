//! Contrast-limited adaptive histogram equalization.
//!
//! The image is split into a fixed grid of tiles. Each tile gets its own
//! equalization LUT, computed from a histogram whose bins are clipped at
//! `clip_limit * tile_area / 256` with the excess spread back evenly. Output
//! pixels blend the LUTs of the four nearest tile centers bilinearly. When the
//! image does not divide evenly into tiles, the last row and column of tiles
//! are filled by reflecting the image at its bottom and right edges.
use image::GrayImage;

use crate::blur::reflect101;
use crate::error::{Result, VisionError};

const BINS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clahe {
    clip_limit: f32,
    tiles_x: u32,
    tiles_y: u32,
}

impl Clahe {
    /// `grid` is `[columns, rows]`.
    pub fn new(clip_limit: f32, grid: [u32; 2]) -> Result<Self> {
        if !(clip_limit.is_finite() && clip_limit > 0.0) {
            return Err(VisionError::InvalidParams("CLAHE clip limit must be > 0"));
        }
        if grid.contains(&0) {
            return Err(VisionError::InvalidParams("CLAHE tile grid must be at least 1x1"));
        }
        Ok(Self {
            clip_limit,
            tiles_x: grid[0],
            tiles_y: grid[1],
        })
    }

    pub fn apply(&self, img: &GrayImage) -> GrayImage {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return img.clone();
        }
        let (tx, ty) = (self.tiles_x as usize, self.tiles_y as usize);
        let tile_w = w.div_ceil(self.tiles_x) as usize;
        let tile_h = h.div_ceil(self.tiles_y) as usize;
        let area = tile_w * tile_h;
        let clip = ((self.clip_limit * area as f32 / BINS as f32) as u32).max(1);
        let src = img.as_raw();
        let (wi, hi) = (i64::from(w), i64::from(h));

        let mut luts = vec![[0u8; BINS]; tx * ty];
        for (t, lut) in luts.iter_mut().enumerate() {
            let (col, row) = (t % tx, t / tx);
            let mut hist = [0u32; BINS];
            for y in row * tile_h..(row + 1) * tile_h {
                let sy = reflect101(y as i64, hi);
                for x in col * tile_w..(col + 1) * tile_w {
                    let sx = reflect101(x as i64, wi);
                    hist[usize::from(src[sy * w as usize + sx])] += 1;
                }
            }
            clip_histogram(&mut hist, clip);
            *lut = equalize(&hist, area);
        }

        let inv_tw = 1.0 / tile_w as f32;
        let inv_th = 1.0 / tile_h as f32;
        let xs: Vec<(usize, usize, f32)> = (0..w).map(|x| neighbours(x, inv_tw, tx)).collect();
        GrayImage::from_fn(w, h, |x, y| {
            let (ty1, ty2, ya) = neighbours(y, inv_th, ty);
            let (tx1, tx2, xa) = xs[x as usize];
            let v = usize::from(src[y as usize * w as usize + x as usize]);
            let at = |r: usize, c: usize| f32::from(luts[r * tx + c][v]);
            let top = at(ty1, tx1) * (1.0 - xa) + at(ty1, tx2) * xa;
            let bottom = at(ty2, tx1) * (1.0 - xa) + at(ty2, tx2) * xa;
            let out = top * (1.0 - ya) + bottom * ya;
            image::Luma([out.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// Tiles whose centers bracket pixel coordinate `p`, and the blend weight
/// of the second one.
fn neighbours(p: u32, inv_tile: f32, tiles: usize) -> (usize, usize, f32) {
    let f = p as f32 * inv_tile - 0.5;
    let lo = f.floor();
    let a = f - lo;
    let lo = lo as i64;
    let last = tiles as i64 - 1;
    let t1 = lo.clamp(0, last) as usize;
    let t2 = (lo + 1).clamp(0, last) as usize;
    (t1, t2, a)
}

fn clip_histogram(hist: &mut [u32; BINS], clip: u32) {
    let mut excess: u32 = 0;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    let batch = excess / BINS as u32;
    let mut residual = excess as usize - batch as usize * BINS;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            i += step;
            residual -= 1;
        }
    }
}

fn equalize(hist: &[u32; BINS], area: usize) -> [u8; BINS] {
    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (slot, &count) in lut.iter_mut().zip(hist) {
        sum += count;
        *slot = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}
