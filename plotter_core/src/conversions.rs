//! Conversions bridging `plotter_config` types to `plotter_core` types.

use crate::calibration::{CalibrationGrid, JointCalibration};
use crate::config::{LimiterCfg, MappingCfg, ServoCfg, SmoothingCfg};
use crate::error::MotionError;
use crate::geometry::{ArmGeometry, JointAngles, Point2D};
use crate::kinematics::ElbowBend;

// ── SmoothingCfg ─────────────────────────────────────────────────────────────

impl From<&plotter_config::SmoothingCfg> for SmoothingCfg {
    fn from(c: &plotter_config::SmoothingCfg) -> Self {
        Self { alpha: c.alpha }
    }
}

// ── MappingCfg ───────────────────────────────────────────────────────────────

impl From<&plotter_config::BoardCfg> for MappingCfg {
    fn from(c: &plotter_config::BoardCfg) -> Self {
        Self {
            paper_width: c.paper_width_mm,
            paper_height: c.paper_height_mm,
            x_offset: c.x_offset_mm,
            y_offset: c.y_offset_mm,
            y_base_offset: c.y_base_offset_mm,
        }
    }
}

// ── LimiterCfg ───────────────────────────────────────────────────────────────

impl From<&plotter_config::MotionCfg> for LimiterCfg {
    fn from(c: &plotter_config::MotionCfg) -> Self {
        let home = match (c.home_x, c.home_y) {
            (Some(x), Some(y)) => Some(Point2D::new(x, y)),
            _ => None,
        };
        Self {
            max_step_mm: c.max_step_mm,
            max_speed_mm_s: c.max_speed_mm_s,
            home,
        }
    }
}

// ── ServoCfg ─────────────────────────────────────────────────────────────────

impl From<&plotter_config::ServoCfg> for ServoCfg {
    fn from(c: &plotter_config::ServoCfg) -> Self {
        Self {
            shoulder_offset_deg: c.shoulder_offset_deg,
            elbow_offset_deg: c.elbow_offset_deg,
            elbow_mirror: c.elbow_mirror,
        }
    }
}

// ── ElbowBend ────────────────────────────────────────────────────────────────

impl From<plotter_config::ElbowBendCfg> for ElbowBend {
    fn from(c: plotter_config::ElbowBendCfg) -> Self {
        match c {
            plotter_config::ElbowBendCfg::Principal => ElbowBend::Principal,
            plotter_config::ElbowBendCfg::Mirrored => ElbowBend::Mirrored,
        }
    }
}

// ── ArmGeometry ──────────────────────────────────────────────────────────────

impl TryFrom<&plotter_config::ArmCfg> for ArmGeometry {
    type Error = MotionError;
    fn try_from(c: &plotter_config::ArmCfg) -> Result<Self, Self::Error> {
        ArmGeometry::new(Point2D::new(c.anchor_x, c.anchor_y), c.link1_mm, c.link2_mm)
    }
}

// ── Calibration tables ───────────────────────────────────────────────────────

impl TryFrom<&[plotter_config::LinearCalibrationRow]> for JointCalibration {
    type Error = MotionError;
    fn try_from(rows: &[plotter_config::LinearCalibrationRow]) -> Result<Self, Self::Error> {
        let rows: Vec<(f64, f64, f64)> = rows
            .iter()
            .map(|r| (r.nominal, r.shoulder, r.elbow))
            .collect();
        JointCalibration::from_rows(&rows)
    }
}

/// Build a grid from a parsed grid file.
///
/// Points that do not sit on the `grid_size` lattice are skipped with a warning,
/// matching how malformed keys are handled by the loader.
pub fn grid_from_file(
    file: &plotter_config::GridFile,
    grid_size: f64,
) -> Result<CalibrationGrid, MotionError> {
    let mut grid = CalibrationGrid::new(grid_size)?;
    for p in &file.points {
        if let Err(e) = grid.insert(Point2D::new(p.x, p.y), JointAngles::new(p.alpha, p.beta)) {
            tracing::warn!(x = p.x, y = p.y, error = %e, "skipping grid point");
        }
    }
    for key in &file.skipped {
        tracing::warn!(key = %key, "skipped malformed grid entry");
    }
    tracing::info!(points = grid.len(), grid_size, "grid calibration loaded");
    Ok(grid)
}
