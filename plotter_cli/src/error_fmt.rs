//! Human-readable error descriptions and structured JSON error formatting.

use plotter_core::error::{BuildError, CalibrationMiss, MotionError};
use serde_json::json;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingResolver => {
                "What happened: No way to resolve pen positions into servo angles.\nLikely causes: Neither [arm] geometry nor a grid calibration reached the controller.\nHow to fix: Check [arm] in the config, or set runner.mode = \"grid\" with calibration.grid_json.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun `plotter self-check`."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MotionError>() {
        return match me {
            MotionError::Unreachable {
                x,
                y,
                distance,
                min_reach,
                max_reach,
            } => format!(
                "What happened: ({x:.2}, {y:.2}) is out of the arm's reach.\nLikely causes: The point is {distance:.2} mm from the shoulder; the arm reaches {min_reach:.2}..{max_reach:.2} mm.\nHow to fix: Pick a point inside the reachable ring, or check [arm] link lengths and anchor."
            ),
            MotionError::OutOfCalibratedRange(CalibrationMiss::GridCell { x, y }) => format!(
                "What happened: No complete grid cell around ({x:.2}, {y:.2}).\nLikely causes: The point lies outside the measured area or next to a missing grid point.\nHow to fix: Re-measure that region, or check calibration.grid_size_mm matches the file."
            ),
            MotionError::OutOfCalibratedRange(CalibrationMiss::Angle { angle, min, max }) => {
                format!(
                    "What happened: Joint angle {angle:.2} deg is outside the linear calibration table [{min:.2}, {max:.2}].\nLikely causes: The table does not cover the whole working area.\nHow to fix: Add calibration rows covering that angle."
                )
            }
            MotionError::OutOfCalibratedRange(CalibrationMiss::Empty) => {
                "What happened: The calibration table is empty.\nLikely causes: The file has no usable rows.\nHow to fix: Regenerate the calibration file.".to_string()
            }
            MotionError::Hardware(_) | MotionError::HardwareFault(_) => format!(
                "What happened: {me}.\nLikely causes: Joystick ADC or servo wiring, power, or GPIO/SPI permissions.\nHow to fix: Check [pins] and wiring, then rerun with --log-level=debug."
            ),
            _ => format!(
                "What happened: {me}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path.\nHow to fix: Pass --config <FILE> pointing at a plotter TOML. Details: {msg}"
        );
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [arm] section or out-of-range values.\nHow to fix: Edit the TOML config and try again. Details: {msg}"
        );
    }

    if lower.contains("linear calibration csv") {
        return format!(
            "Invalid linear calibration CSV. Expected three columns: nominal, shoulder, elbow. Details: {msg}"
        );
    }

    if lower.contains("grid calibration") {
        return format!(
            "Invalid grid calibration file. Expected a JSON object of \"x,y\": [alpha, beta]. Details: {msg}"
        );
    }

    if lower.contains("open joystick adc") || lower.contains("open servo pins") {
        return "What happened: Failed to initialize hardware.\nLikely causes: Incorrect pin numbers or insufficient GPIO/SPI permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process can access GPIO and SPI.".to_string();
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Details: {msg}"
    )
}

/// Stable exit codes: 3 unreachable, 4 outside calibration, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<MotionError>() {
        Some(MotionError::Unreachable { .. }) => 3,
        Some(MotionError::OutOfCalibratedRange(_)) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    match err.downcast_ref::<MotionError>() {
        Some(MotionError::Unreachable { .. }) => "Unreachable",
        Some(MotionError::OutOfCalibratedRange(_)) => "OutOfCalibratedRange",
        Some(MotionError::Hardware(_) | MotionError::HardwareFault(_)) => "Hardware",
        Some(MotionError::Config(_)) => "InvalidConfig",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    let details = match err.downcast_ref::<MotionError>() {
        Some(MotionError::Unreachable {
            x,
            y,
            distance,
            min_reach,
            max_reach,
        }) => Some(json!({
            "x": x,
            "y": y,
            "distance": distance,
            "min_reach": min_reach,
            "max_reach": max_reach,
        })),
        Some(MotionError::OutOfCalibratedRange(CalibrationMiss::GridCell { x, y })) => {
            Some(json!({ "x": x, "y": y }))
        }
        Some(MotionError::OutOfCalibratedRange(CalibrationMiss::Angle { angle, min, max })) => {
            Some(json!({ "angle": angle, "min": min, "max": max }))
        }
        _ => None,
    };

    let obj = match details {
        Some(d) => json!({ "reason": reason_name(err), "details": d, "message": humanize(err) }),
        None => json!({ "reason": reason_name(err), "message": humanize(err) }),
    };
    obj.to_string()
}
