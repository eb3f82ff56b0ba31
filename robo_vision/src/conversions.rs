//! Building vision types from `robo_config` sections.
use crate::bearing::BoresightGeometry;
use crate::error::{Result, VisionError};
use crate::segment::{SegmentCfg, Segmenter};
use std::sync::Arc;

use robo_traits::FrameSource;
use robo_traits::clock::Clock;

use crate::service::{BearingService, FramePump};

impl From<&robo_config::ThermalCfg> for SegmentCfg {
    fn from(c: &robo_config::ThermalCfg) -> Self {
        Self {
            min_threshold: c.min_threshold,
            max_threshold: c.max_threshold,
            min_area: u64::from(c.min_area),
            max_area: u64::from(c.max_area),
            clip_limit: c.clahe_clip_limit,
            tile_grid: c.clahe_tile_grid,
            blur_kernel: c.blur_kernel,
        }
    }
}

impl TryFrom<&robo_config::BoresightCfg> for BoresightGeometry {
    type Error = VisionError;

    fn try_from(c: &robo_config::BoresightCfg) -> Result<Self> {
        Self::new(
            (c.origin[0], c.origin[1]),
            (c.boresight_point[0], c.boresight_point[1]),
        )
    }
}

impl BearingService {
    pub fn from_config(cfg: &robo_config::Config) -> Result<Self> {
        let segmenter = Segmenter::new(SegmentCfg::from(&cfg.thermal))?;
        let geometry = BoresightGeometry::try_from(&cfg.boresight)?;
        Ok(Self::new(segmenter, geometry, cfg.thermal.mirror))
    }
}

impl FramePump {
    /// Pump at `thermal.capture_hz`.
    pub fn from_config<S, C>(
        source: S,
        service: Arc<BearingService>,
        thermal: &robo_config::ThermalCfg,
        clock: C,
    ) -> Self
    where
        S: FrameSource + Send + 'static,
        C: Clock + Send + 'static,
    {
        Self::spawn(source, service, thermal.capture_hz, clock)
    }
}
