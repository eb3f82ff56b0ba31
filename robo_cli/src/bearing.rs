//! `bearing` subcommand: one frame in, one bearing (or no detection) out.

use std::path::PathBuf;

use eyre::WrapErr;
use robo_traits::GrayFrame;
use robo_vision::{BearingResponse, BearingService};
use serde_json::json;

pub enum FrameInput {
    Image(PathBuf),
    Synthetic {
        center: (f64, f64),
        width: u32,
        height: u32,
        radius: f64,
    },
}

fn load_frame(input: FrameInput) -> eyre::Result<GrayFrame> {
    match input {
        FrameInput::Image(path) => {
            let img = image::open(&path)
                .wrap_err_with(|| format!("open image {}", path.display()))?
                .to_luma8();
            Ok(GrayFrame {
                width: img.width(),
                height: img.height(),
                pixels: img.into_raw(),
            })
        }
        FrameInput::Synthetic {
            center,
            width,
            height,
            radius,
        } => Ok(robo_hardware::synthetic_hot_spot(
            width, height, center, radius, 20, 230,
        )),
    }
}

fn estimate(cfg: &robo_config::Config, frame: GrayFrame) -> eyre::Result<BearingResponse> {
    let service = BearingService::from_config(cfg)?;
    service.on_frame(frame)?;
    Ok(service.estimate_now())
}

pub fn run_bearing(cfg: &robo_config::Config, input: FrameInput, json: bool) -> eyre::Result<()> {
    let response = estimate(cfg, load_frame(input)?)?;
    match (response, json) {
        (BearingResponse::Bearing(rad), true) => println!(
            "{}",
            json!({ "detected": true, "bearing_rad": rad, "bearing_deg": rad.to_degrees() })
        ),
        (BearingResponse::Bearing(rad), false) => {
            println!("bearing {rad:+.4} rad ({:+.2} deg)", rad.to_degrees());
        }
        (BearingResponse::NoDetection, true) => println!("{}", json!({ "detected": false })),
        (BearingResponse::NoDetection, false) => println!("no detection"),
    }
    Ok(())
}

/// A hot spot straight down from the origin must come back close to zero,
/// whatever the mirror setting. The frame is sized so the origin column is
/// its center column.
pub fn self_check_bearing(cfg: &robo_config::Config) -> eyre::Result<BearingResponse> {
    let (ox, oy) = robo_vision::BoresightGeometry::try_from(&cfg.boresight)?.origin();
    if ox < 50.0 || oy < 0.0 {
        eyre::bail!("bearing self-check needs an origin at least 50 px from the left edge");
    }
    let width = (2.0 * ox).round() as u32 + 1;
    let height = (oy + 256.0).round() as u32;
    let frame = robo_hardware::synthetic_hot_spot(width, height, (ox, oy + 128.0), 40.0, 20, 230);
    let response = estimate(cfg, frame)?;
    match response {
        BearingResponse::Bearing(rad) if rad.abs() < 0.1 => Ok(response),
        other => eyre::bail!("bearing self-check expected ~0 rad, got {other:?}"),
    }
}
