#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration file parsing for the plotter.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `load_linear_calibration_csv` reads the per-joint correction table.
//! - `load_grid_json` reads measured grid points, skipping malformed entries.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Arm geometry (millimeters, board coordinates).
#[derive(Debug, Deserialize, Clone)]
pub struct ArmCfg {
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub link1_mm: f64,
    pub link2_mm: f64,
}

/// Paper placement relative to the anchor.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoardCfg {
    pub paper_width_mm: f64,
    pub paper_height_mm: f64,
    pub x_offset_mm: f64,
    pub y_offset_mm: f64,
    /// Distance from the anchor axis to the bottom edge of the paper.
    pub y_base_offset_mm: f64,
}

impl Default for BoardCfg {
    fn default() -> Self {
        Self {
            paper_width_mm: 279.4,
            paper_height_mm: 215.0,
            x_offset_mm: 0.0,
            y_offset_mm: 0.0,
            y_base_offset_mm: 50.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SmoothingCfg {
    /// EMA weight of the newest joystick sample. Range: (0.0, 1.0].
    pub alpha: f64,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self { alpha: 0.3 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MotionCfg {
    /// Maximum pen travel per tick (mm).
    pub max_step_mm: f64,
    /// When set, the per-tick step is `max_speed_mm_s * elapsed` instead.
    pub max_speed_mm_s: Option<f64>,
    /// Optional start position; the first joystick target is used otherwise.
    pub home_x: Option<f64>,
    pub home_y: Option<f64>,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            max_step_mm: 200.0,
            max_speed_mm_s: None,
            home_x: None,
            home_y: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServoCfg {
    pub shoulder_offset_deg: f64,
    pub elbow_offset_deg: f64,
    /// Elbow servo mounted reversed: `elbow = 180 - (beta + offset)`.
    pub elbow_mirror: bool,
    /// Servo travel limits enforced by the actuation layer.
    pub min_deg: f64,
    pub max_deg: f64,
}

impl Default for ServoCfg {
    fn default() -> Self {
        Self {
            shoulder_offset_deg: 120.0,
            elbow_offset_deg: 30.0,
            elbow_mirror: true,
            min_deg: 0.0,
            max_deg: 180.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Inverse kinematics, optionally corrected by the linear table.
    #[default]
    Analytic,
    /// Bilinear lookup in the measured grid.
    Grid,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElbowBendCfg {
    #[default]
    Principal,
    Mirrored,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerCfg {
    pub tick_hz: u32,
    pub mode: ResolveMode,
    pub elbow_bend: ElbowBendCfg,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            tick_hz: 20,
            mode: ResolveMode::Analytic,
            elbow_bend: ElbowBendCfg::Principal,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Per-joint linear correction table (CSV).
    pub linear_csv: Option<PathBuf>,
    /// Measured grid (JSON object keyed by "x,y").
    pub grid_json: Option<PathBuf>,
    pub grid_size_mm: f64,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            linear_csv: None,
            grid_json: None,
            grid_size_mm: 5.0,
        }
    }
}

/// GPIO/SPI assignment for the `hardware` build.
#[derive(Debug, Deserialize, Clone)]
pub struct Pins {
    pub shoulder_servo: u8,
    pub elbow_servo: u8,
    /// MCP3008 channels wired to the joystick potentiometers.
    pub joystick_x_channel: u8,
    pub joystick_y_channel: u8,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub arm: ArmCfg,
    #[serde(default)]
    pub board: BoardCfg,
    #[serde(default)]
    pub smoothing: SmoothingCfg,
    #[serde(default)]
    pub motion: MotionCfg,
    #[serde(default)]
    pub servo: ServoCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub calibration: CalibrationCfg,
    #[serde(default)]
    pub pins: Option<Pins>,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn ensure_finite(name: &str, v: f64) -> eyre::Result<()> {
    if !v.is_finite() {
        eyre::bail!("{name} must be finite");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Arm
        ensure_finite("arm.anchor_x", self.arm.anchor_x)?;
        ensure_finite("arm.anchor_y", self.arm.anchor_y)?;
        if !(self.arm.link1_mm.is_finite() && self.arm.link1_mm > 0.0) {
            eyre::bail!("arm.link1_mm must be > 0");
        }
        if !(self.arm.link2_mm.is_finite() && self.arm.link2_mm > 0.0) {
            eyre::bail!("arm.link2_mm must be > 0");
        }

        // Board
        if !(self.board.paper_width_mm.is_finite() && self.board.paper_width_mm > 0.0) {
            eyre::bail!("board.paper_width_mm must be > 0");
        }
        if !(self.board.paper_height_mm.is_finite() && self.board.paper_height_mm > 0.0) {
            eyre::bail!("board.paper_height_mm must be > 0");
        }
        ensure_finite("board.x_offset_mm", self.board.x_offset_mm)?;
        ensure_finite("board.y_offset_mm", self.board.y_offset_mm)?;
        ensure_finite("board.y_base_offset_mm", self.board.y_base_offset_mm)?;

        // Smoothing
        if !(self.smoothing.alpha > 0.0 && self.smoothing.alpha <= 1.0) {
            eyre::bail!("smoothing.alpha must be in (0.0, 1.0]");
        }

        // Motion
        if !(self.motion.max_step_mm.is_finite() && self.motion.max_step_mm > 0.0) {
            eyre::bail!("motion.max_step_mm must be > 0");
        }
        if let Some(speed) = self.motion.max_speed_mm_s
            && !(speed.is_finite() && speed > 0.0)
        {
            eyre::bail!("motion.max_speed_mm_s must be > 0");
        }
        match (self.motion.home_x, self.motion.home_y) {
            (Some(x), Some(y)) => {
                ensure_finite("motion.home_x", x)?;
                ensure_finite("motion.home_y", y)?;
            }
            (None, None) => {}
            _ => eyre::bail!("motion.home_x and motion.home_y must be set together"),
        }

        // Servo
        ensure_finite("servo.shoulder_offset_deg", self.servo.shoulder_offset_deg)?;
        ensure_finite("servo.elbow_offset_deg", self.servo.elbow_offset_deg)?;
        ensure_finite("servo.min_deg", self.servo.min_deg)?;
        ensure_finite("servo.max_deg", self.servo.max_deg)?;
        if self.servo.min_deg >= self.servo.max_deg {
            eyre::bail!("servo.min_deg must be < servo.max_deg");
        }

        // Runner
        if self.runner.tick_hz == 0 {
            eyre::bail!("runner.tick_hz must be > 0");
        }
        if self.runner.tick_hz > 1000 {
            eyre::bail!("runner.tick_hz must be <= 1000");
        }

        // Calibration
        if !(self.calibration.grid_size_mm.is_finite() && self.calibration.grid_size_mm > 0.0) {
            eyre::bail!("calibration.grid_size_mm must be > 0");
        }
        if self.runner.mode == ResolveMode::Grid && self.calibration.grid_json.is_none() {
            eyre::bail!("runner.mode = \"grid\" requires calibration.grid_json");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of: never, daily, hourly");
        }

        Ok(())
    }
}

// ── Linear calibration (CSV) ────────────────────────────────────────────────

/// One row of the per-joint correction table.
///
/// Expected layout (header names are free-form, three columns required):
/// desired,shoulder,elbow
/// 20,21.4,18.9
/// 30,31.0,29.2
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCalibrationRow {
    pub nominal: f64,
    pub shoulder: f64,
    pub elbow: f64,
}

pub fn load_linear_calibration_csv(path: &Path) -> eyre::Result<Vec<LinearCalibrationRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open linear calibration CSV {:?}: {}", path, e))?;
    parse_linear_calibration(rdr, &format!("{path:?}"))
}

/// Parse the linear table from any reader (used by the loader and fuzzing).
pub fn parse_linear_calibration_csv(data: &[u8]) -> eyre::Result<Vec<LinearCalibrationRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);
    parse_linear_calibration(rdr, "<memory>")
}

fn parse_linear_calibration<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
    source: &str,
) -> eyre::Result<Vec<LinearCalibrationRow>> {
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {}: {}", source, e))?
        .clone();
    if headers.len() != 3 {
        eyre::bail!(
            "linear calibration CSV must have 3 columns (nominal, shoulder, elbow), got {}",
            headers.len()
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<(f64, f64, f64)>().enumerate() {
        match rec {
            Ok((nominal, shoulder, elbow)) => {
                if !(nominal.is_finite() && shoulder.is_finite() && elbow.is_finite()) {
                    eyre::bail!("invalid CSV row {}: values must be finite", idx + 2);
                }
                rows.push(LinearCalibrationRow {
                    nominal,
                    shoulder,
                    elbow,
                });
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("linear calibration CSV {} has no data rows", source);
    }
    Ok(rows)
}

// ── Grid calibration (JSON) ─────────────────────────────────────────────────

/// One measured grid point: board position and servo angles (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
    pub alpha: f64,
    pub beta: f64,
}

/// Parsed grid file. Entries that could not be parsed are listed in `skipped`.
#[derive(Debug, Clone, Default)]
pub struct GridFile {
    pub points: Vec<GridPoint>,
    pub skipped: Vec<String>,
}

fn parse_grid_key(key: &str) -> Option<(f64, f64)> {
    let (x, y) = key.split_once(',')?;
    let x: f64 = x.trim().parse().ok()?;
    let y: f64 = y.trim().parse().ok()?;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Parse `{"<x>,<y>": [alpha, beta], ...}`.
///
/// A document that is not a JSON object is an error; individual entries with a
/// malformed key or value are skipped.
pub fn parse_grid_json(s: &str) -> eyre::Result<GridFile> {
    let raw: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(s).map_err(|e| eyre::eyre!("grid calibration JSON: {}", e))?;

    let mut out = GridFile::default();
    for (key, value) in raw {
        let pos = parse_grid_key(&key);
        let angles = serde_json::from_value::<[f64; 2]>(value)
            .ok()
            .filter(|a| a[0].is_finite() && a[1].is_finite());
        match (pos, angles) {
            (Some((x, y)), Some([alpha, beta])) => out.points.push(GridPoint { x, y, alpha, beta }),
            _ => out.skipped.push(key),
        }
    }
    Ok(out)
}

pub fn load_grid_json(path: &Path) -> eyre::Result<GridFile> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read grid calibration {:?}: {}", path, e))?;
    parse_grid_json(&s)
}
