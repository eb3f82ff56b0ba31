//! Human-readable error descriptions and structured JSON error formatting.

use robo_core::error::{ArmError, BuildError};
use robo_vision::VisionError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ae) = err.downcast_ref::<ArmError>() {
        return match ae {
            ArmError::OutOfRangeJoint { joint, channels } => format!(
                "What happened: Joint {joint} is not in the calibration table ({channels} channels).\nLikely causes: Wrong joint id, or a calibration table shorter than expected.\nHow to fix: Use an id below {channels}, or extend [calibration] / the calibration CSV."
            ),
            ArmError::MalformedCommand(msg) => format!(
                "What happened: A joint command was rejected ({msg}).\nLikely causes: Wrong number of angles or a non-finite value.\nHow to fix: Send one finite angle in radians per calibrated joint."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: Servo bus wiring, power, or baud rate.\nHow to fix: Check [bus] port and baud, then re-run with --log-level=debug."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidCalibration(msg) => format!(
                "What happened: Invalid calibration ({msg}).\nLikely causes: Zero or negative ticks_per_radian, a sign other than +1/-1, or an empty table.\nHow to fix: Correct [calibration] or the calibration CSV and rerun."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            BuildError::Arm(ae) => format!(
                "What happened: {ae}.\nLikely causes: arm.startup_hold.joint points past the calibrated joints.\nHow to fix: Pick a hold joint inside the table or disable the startup hold."
            ),
        };
    }

    if let Some(ve) = err.downcast_ref::<VisionError>() {
        return match ve {
            VisionError::DegenerateBoresight => "What happened: The boresight point equals the optical origin.\nLikely causes: [boresight] origin and boresight_point set to the same pixel.\nHow to fix: Point boresight_point along the camera's zero-bearing direction.".to_string(),
            other => format!(
                "What happened: {other}.\nLikely causes: Unsupported image or [thermal] parameters.\nHow to fix: Check the input frame and the [thermal] section."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    // Calibration CSV header special-case
    if lower.contains("calibration csv must have headers") {
        return "Invalid headers in calibration CSV. Expected 'joint,zero_offset_ticks,sign,ticks_per_radian'.".to_string();
    }

    if lower.contains("invalid configuration") {
        let detail = err.root_cause();
        return format!(
            "What happened: Configuration is invalid ({detail}).\nLikely causes: Out-of-range values in the TOML or calibration CSV.\nHow to fix: Edit the config and try again."
        );
    }

    if lower.starts_with("read config") || lower.starts_with("parse config") {
        let detail = err.root_cause();
        return format!(
            "What happened: Could not load the config file ({msg}: {detail}).\nHow to fix: Check the --config path and TOML syntax."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error kind; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ae) = err.downcast_ref::<ArmError>() {
        return match ae {
            ArmError::OutOfRangeJoint { .. } => 3,
            ArmError::MalformedCommand(_) => 4,
            _ => 5,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 6;
    }
    if err.downcast_ref::<VisionError>().is_some() {
        return 7;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ae) = err.downcast_ref::<ArmError>() {
        return match ae {
            ArmError::OutOfRangeJoint { .. } => "OutOfRangeJoint",
            ArmError::MalformedCommand(_) => "MalformedCommand",
            ArmError::SensorReadDegraded { .. } => "SensorReadDegraded",
            ArmError::BusWriteFailed { .. } => "BusWriteFailed",
            ArmError::Timeout => "Timeout",
            ArmError::Bus(_) => "Bus",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidCalibration";
    }
    if err.downcast_ref::<VisionError>().is_some() {
        return "Vision";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(ArmError::OutOfRangeJoint { joint, channels }) = err.downcast_ref::<ArmError>() {
        obj["details"] = json!({ "joint": joint, "channels": channels });
    }
    obj.to_string()
}
