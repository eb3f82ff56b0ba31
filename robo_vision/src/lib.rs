#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Thermal target detection and bearing estimation.
//!
//! - `segment`: CLAHE, Gaussian blur, band mask and largest-region centroid
//! - `bearing`: signed angle from the optical origin to a centroid
//! - `service`: latest-frame request/response service and capture pump

pub mod bearing;
pub mod blur;
pub mod clahe;
pub mod conversions;
pub mod error;
pub mod frame;
pub mod regions;
pub mod segment;
pub mod service;

pub use bearing::BoresightGeometry;
pub use error::VisionError;
pub use regions::{Centroid, Region};
pub use segment::{SegmentCfg, Segmenter};
pub use service::{BearingResponse, BearingService, FramePump};
