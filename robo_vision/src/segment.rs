//! Thermal frame → single-target centroid.
//!
//! CLAHE, Gaussian blur, band mask, connected regions, then the largest
//! region if its area falls inside the configured window.
//!
//! Area is the number of mask pixels in an 8-connected region, holes
//! excluded. That runs about half a perimeter larger than the polygon area
//! of the region's outer contour, so `min_area`/`max_area` are pixel counts.
use image::GrayImage;

use crate::blur::GaussianBlur;
use crate::clahe::Clahe;
use crate::error::{Result, VisionError};
use crate::regions::{Centroid, Region, band_mask, label_regions, largest};

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCfg {
    pub min_threshold: u8,
    pub max_threshold: u8,
    /// Exclusive lower bound on region area, in pixels.
    pub min_area: u64,
    /// Exclusive upper bound on region area, in pixels.
    pub max_area: u64,
    pub clip_limit: f32,
    /// `[columns, rows]`
    pub tile_grid: [u32; 2],
    pub blur_kernel: u32,
}

impl Default for SegmentCfg {
    fn default() -> Self {
        Self {
            min_threshold: 140,
            max_threshold: 255,
            min_area: 1000,
            max_area: 50_000,
            clip_limit: 2.0,
            tile_grid: [3, 3],
            blur_kernel: 21,
        }
    }
}

/// Segmentation stages built once from a `SegmentCfg`.
#[derive(Debug, Clone)]
pub struct Segmenter {
    cfg: SegmentCfg,
    clahe: Clahe,
    blur: GaussianBlur,
}

impl Segmenter {
    pub fn new(cfg: SegmentCfg) -> Result<Self> {
        if cfg.min_threshold > cfg.max_threshold {
            return Err(VisionError::InvalidParams("min_threshold exceeds max_threshold"));
        }
        if cfg.min_area >= cfg.max_area {
            return Err(VisionError::InvalidParams("min_area must be below max_area"));
        }
        let clahe = Clahe::new(cfg.clip_limit, cfg.tile_grid)?;
        let blur = GaussianBlur::new(cfg.blur_kernel, 0.0)?;
        Ok(Self { cfg, clahe, blur })
    }

    pub fn cfg(&self) -> &SegmentCfg {
        &self.cfg
    }

    /// The contrast-normalized, blurred band mask.
    pub fn mask(&self, img: &GrayImage) -> GrayImage {
        let normalized = self.clahe.apply(img);
        let smoothed = self.blur.apply(&normalized);
        band_mask(&smoothed, self.cfg.min_threshold, self.cfg.max_threshold)
    }

    /// Largest region, if it lies strictly inside the area window.
    pub fn detect(&self, img: &GrayImage) -> Option<Region> {
        let regions = label_regions(&self.mask(img));
        let best = *largest(&regions)?;
        if best.area > self.cfg.min_area && best.area < self.cfg.max_area {
            tracing::trace!(area = best.area, regions = regions.len(), "region accepted");
            Some(best)
        } else {
            tracing::debug!(area = best.area, "largest region outside area window");
            None
        }
    }

    pub fn segment(&self, img: &GrayImage) -> Option<Centroid> {
        self.detect(img)?.centroid()
    }
}
