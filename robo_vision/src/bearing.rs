//! Signed bearing from the optical origin to a detected centroid.
//!
//! The reference vector points from the origin to a boresight point in the
//! image. A centroid right of the origin (`x > origin.x`) gives a negative
//! bearing; anything else gives a positive one, with the x offset measured
//! as `origin.x - x`. This matches the camera as mounted on the robot and is
//! kept as a calibration constant.
use crate::error::{Result, VisionError};
use crate::regions::Centroid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoresightGeometry {
    origin: (f64, f64),
    reference: (f64, f64),
}

impl Default for BoresightGeometry {
    fn default() -> Self {
        Self {
            origin: (165.0, 0.0),
            reference: (0.0, 128.0),
        }
    }
}

impl BoresightGeometry {
    pub fn new(origin: (f64, f64), boresight_point: (f64, f64)) -> Result<Self> {
        let all = [origin.0, origin.1, boresight_point.0, boresight_point.1];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(VisionError::InvalidParams("boresight coordinates must be finite"));
        }
        let reference = (boresight_point.0 - origin.0, boresight_point.1 - origin.1);
        if reference.0.hypot(reference.1) == 0.0 {
            return Err(VisionError::DegenerateBoresight);
        }
        Ok(Self { origin, reference })
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn reference(&self) -> (f64, f64) {
        self.reference
    }

    /// Bearing in radians, in `[-pi, pi]`. A centroid on the origin gives 0.
    pub fn bearing_to(&self, c: Centroid) -> f64 {
        let (ox, oy) = self.origin;
        let (cx, cy) = (f64::from(c.x), f64::from(c.y));
        let (v, sign) = if cx > ox {
            ((cx - ox, cy - oy), -1.0)
        } else {
            ((ox - cx, cy - oy), 1.0)
        };
        let v_len = v.0.hypot(v.1);
        if v_len == 0.0 {
            return 0.0;
        }
        let (rx, ry) = self.reference;
        let cos = (v.0 * rx + v.1 * ry) / (v_len * rx.hypot(ry));
        sign * cos.clamp(-1.0, 1.0).acos()
    }

    /// `None` when nothing was detected.
    pub fn estimate(&self, centroid: Option<Centroid>) -> Option<f64> {
        centroid.map(|c| self.bearing_to(c))
    }
}
