//! Configuration types for the motion pipeline.
//!
//! These are the runtime configuration structs used by `MotionController`.
//! They are separate from the TOML-deserialized config in `plotter_config`.

use std::time::Duration;

use crate::geometry::{JointAngles, Point2D};

/// EMA settings for the joystick channels.
#[derive(Debug, Clone)]
pub struct SmoothingCfg {
    /// EMA weight of the newest sample. Range: (0.0, 1.0]; 1.0 disables smoothing.
    pub alpha: f64,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self { alpha: 0.3 }
    }
}

/// Paper placement relative to the arm anchor (millimeters).
#[derive(Debug, Clone, PartialEq)]
pub struct MappingCfg {
    pub paper_width: f64,
    pub paper_height: f64,
    /// Additional horizontal shift applied after centering.
    pub x_offset: f64,
    /// Additional vertical shift applied after the base offset.
    pub y_offset: f64,
    /// Distance from the anchor axis to the bottom edge of the paper.
    pub y_base_offset: f64,
}

impl Default for MappingCfg {
    fn default() -> Self {
        // US letter, landscape
        Self {
            paper_width: 279.4,
            paper_height: 215.0,
            x_offset: 0.0,
            y_offset: 0.0,
            y_base_offset: 50.0,
        }
    }
}

/// Velocity limiting for the interpolated pen position.
#[derive(Debug, Clone, PartialEq)]
pub struct LimiterCfg {
    /// Maximum distance moved per tick (mm) when `max_speed_mm_s` is unset.
    pub max_step_mm: f64,
    /// When set, the per-tick step becomes `max_speed_mm_s * elapsed`.
    pub max_speed_mm_s: Option<f64>,
    /// Starting position. When `None`, the first mapped target seeds the limiter.
    pub home: Option<Point2D>,
}

impl LimiterCfg {
    /// Step budget for a tick that took `elapsed`.
    ///
    /// Returns `None` for a zero-length tick, which must be skipped rather than
    /// processed with a degenerate step.
    pub fn max_step(&self, elapsed: Duration) -> Option<f64> {
        if elapsed.is_zero() {
            return None;
        }
        match self.max_speed_mm_s {
            Some(speed) => Some(speed * elapsed.as_secs_f64()),
            None => Some(self.max_step_mm),
        }
    }
}

impl Default for LimiterCfg {
    fn default() -> Self {
        Self {
            max_step_mm: 200.0,
            max_speed_mm_s: None,
            home: None,
        }
    }
}

/// Mounting offsets between solved joint angles and servo travel.
#[derive(Debug, Clone, PartialEq)]
pub struct ServoCfg {
    pub shoulder_offset_deg: f64,
    pub elbow_offset_deg: f64,
    /// Elbow servo mounted reversed: `elbow = 180 - (beta + offset)`.
    pub elbow_mirror: bool,
}

impl ServoCfg {
    /// Convert solver angles into servo angles.
    pub fn apply(&self, angles: JointAngles) -> JointAngles {
        let shoulder = angles.alpha + self.shoulder_offset_deg;
        let elbow = angles.beta + self.elbow_offset_deg;
        let elbow = if self.elbow_mirror {
            180.0 - elbow
        } else {
            elbow
        };
        JointAngles::new(shoulder, elbow)
    }
}

impl Default for ServoCfg {
    fn default() -> Self {
        Self {
            shoulder_offset_deg: 120.0,
            elbow_offset_deg: 30.0,
            elbow_mirror: true,
        }
    }
}
