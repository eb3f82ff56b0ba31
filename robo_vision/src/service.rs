//! Latest-frame bearing service and the capture pump feeding it.
//!
//! `BearingService` keeps only the most recent frame. `estimate_now()` runs
//! segmentation on it synchronously; a missing frame or a frame without a
//! qualifying region both answer `NoDetection`.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use image::GrayImage;
use robo_traits::clock::{Clock, period_for_hz};
use robo_traits::{FrameSource, GrayFrame};

use crate::bearing::BoresightGeometry;
use crate::error::Result;
use crate::frame::to_gray_image;
use crate::segment::Segmenter;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BearingResponse {
    /// Radians; positive is left of the boresight.
    Bearing(f64),
    NoDetection,
}

impl BearingResponse {
    pub fn radians(&self) -> Option<f64> {
        match *self {
            Self::Bearing(r) => Some(r),
            Self::NoDetection => None,
        }
    }
}

#[derive(Debug)]
pub struct BearingService {
    segmenter: Segmenter,
    geometry: BoresightGeometry,
    mirror: bool,
    latest: Mutex<Option<Arc<GrayImage>>>,
    frames: AtomicU64,
}

impl BearingService {
    pub fn new(segmenter: Segmenter, geometry: BoresightGeometry, mirror: bool) -> Self {
        Self {
            segmenter,
            geometry,
            mirror,
            latest: Mutex::new(None),
            frames: AtomicU64::new(0),
        }
    }

    /// Replace the stored frame. A malformed capture is rejected and the
    /// previous frame is kept.
    pub fn on_frame(&self, frame: GrayFrame) -> Result<()> {
        let img = to_gray_image(frame, self.mirror)?;
        let mut slot = self
            .latest
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(Arc::new(img));
        self.frames.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn frames_received(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn geometry(&self) -> &BoresightGeometry {
        &self.geometry
    }

    /// Estimate the bearing from the most recent frame.
    pub fn estimate_now(&self) -> BearingResponse {
        // Segment outside the lock so the pump can keep storing frames.
        let latest = self
            .latest
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        let Some(img) = latest else {
            tracing::debug!("bearing requested before any frame arrived");
            return BearingResponse::NoDetection;
        };
        let centroid = self.segmenter.segment(&img);

        match self.geometry.estimate(centroid) {
            Some(rad) => {
                tracing::info!(
                    radians = rad,
                    degrees = rad.to_degrees(),
                    cx = centroid.map(|c| c.x),
                    cy = centroid.map(|c| c.y),
                    "bearing estimated"
                );
                BearingResponse::Bearing(rad)
            }
            None => {
                tracing::info!("no detection");
                BearingResponse::NoDetection
            }
        }
    }
}

/// Background task polling a `FrameSource` into a `BearingService`.
pub struct FramePump {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    errors: Arc<AtomicU64>,
}

impl FramePump {
    /// Poll `source` at `hz` (clamped to at least 1 Hz) until stopped.
    pub fn spawn<S, C>(mut source: S, service: Arc<BearingService>, hz: u32, clock: C) -> Self
    where
        S: FrameSource + Send + 'static,
        C: Clock + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let errors = Arc::new(AtomicU64::new(0));
        let period = period_for_hz(hz);
        let handle = {
            let shutdown = shutdown.clone();
            let errors = errors.clone();
            std::thread::spawn(move || {
                while !shutdown.load(Ordering::Relaxed) {
                    let started = clock.now();
                    match source.capture() {
                        Ok(Some(frame)) => {
                            if let Err(e) = service.on_frame(frame) {
                                errors.fetch_add(1, Ordering::Relaxed);
                                tracing::warn!(error = %e, "frame dropped");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            errors.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(error = %e, "frame capture failed");
                        }
                    }
                    let spent = clock.now().saturating_duration_since(started);
                    clock.sleep(period.saturating_sub(spent));
                }
                tracing::trace!("frame pump exiting cleanly");
            })
        };
        Self {
            shutdown,
            handle: Some(handle),
            errors,
        }
    }

    /// Captures that failed or were rejected.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn stop(mut self) {
        self.join();
    }

    fn join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take()
            && let Err(e) = h.join()
        {
            tracing::warn!(?e, "frame pump panicked");
        }
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.join();
    }
}
