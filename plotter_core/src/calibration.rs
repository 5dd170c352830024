//! Empirical angle correction.
//!
//! Two independent, read-only lookups:
//! - `LinearCalibration`: piecewise-linear map from a nominal joint angle to the
//!   angle that actually has to be commanded, one table per joint (`JointCalibration`).
//! - `CalibrationGrid`: measured joint angles on a uniform board grid, blended
//!   bilinearly. This replaces the analytic solver entirely when available.
//!
//! Neither lookup extrapolates. Queries outside the sampled data fail with
//! `MotionError::OutOfCalibratedRange`.

use std::collections::HashMap;

use crate::error::{CalibrationMiss, MotionError};
use crate::geometry::{JointAngles, Point2D};

/// Piecewise-linear table keyed by nominal angle.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearCalibration {
    // Sorted ascending by key; keys unique.
    samples: Vec<(f64, f64)>,
}

impl LinearCalibration {
    /// Build from `(nominal, measured)` pairs in any order.
    pub fn from_samples(
        samples: impl IntoIterator<Item = (f64, f64)>,
    ) -> Result<Self, MotionError> {
        let mut samples: Vec<(f64, f64)> = samples.into_iter().collect();
        if samples.is_empty() {
            return Err(MotionError::Config(
                "linear calibration requires at least one sample".into(),
            ));
        }
        if let Some((k, v)) = samples
            .iter()
            .find(|(k, v)| !k.is_finite() || !v.is_finite())
        {
            return Err(MotionError::Config(format!(
                "linear calibration sample ({k}, {v}) is not finite"
            )));
        }
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(w) = samples.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(MotionError::Config(format!(
                "linear calibration has duplicate nominal angle {}",
                w[0].0
            )));
        }
        Ok(Self { samples })
    }

    /// Lowest and highest sampled nominal angle.
    pub fn range(&self) -> (f64, f64) {
        // Non-empty by construction
        let lo = self.samples.first().map_or(0.0, |s| s.0);
        let hi = self.samples.last().map_or(0.0, |s| s.0);
        (lo, hi)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Corrected angle for `nominal`.
    ///
    /// Exact keys return their stored value; anything else is interpolated between
    /// the bracketing keys `x0 <= nominal < x1`.
    pub fn correct(&self, nominal: f64) -> Result<f64, MotionError> {
        let (min, max) = self.range();
        let miss = || {
            MotionError::OutOfCalibratedRange(CalibrationMiss::Angle {
                angle: nominal,
                min,
                max,
            })
        };
        if !nominal.is_finite() {
            return Err(miss());
        }
        // Number of keys <= nominal
        let idx = self.samples.partition_point(|(k, _)| *k <= nominal);
        if idx == 0 {
            return Err(miss());
        }
        let (x0, y0) = self.samples[idx - 1];
        if x0 == nominal {
            return Ok(y0);
        }
        let Some(&(x1, y1)) = self.samples.get(idx) else {
            return Err(miss());
        };
        let ratio = (nominal - x0) / (x1 - x0);
        Ok(y0 + ratio * (y1 - y0))
    }
}

/// Per-joint linear correction applied to solver output.
#[derive(Debug, Clone, PartialEq)]
pub struct JointCalibration {
    pub shoulder: LinearCalibration,
    pub elbow: LinearCalibration,
}

impl JointCalibration {
    /// Build from `(nominal, shoulder, elbow)` rows sharing the nominal key.
    pub fn from_rows(rows: &[(f64, f64, f64)]) -> Result<Self, MotionError> {
        Ok(Self {
            shoulder: LinearCalibration::from_samples(rows.iter().map(|r| (r.0, r.1)))?,
            elbow: LinearCalibration::from_samples(rows.iter().map(|r| (r.0, r.2)))?,
        })
    }

    pub fn correct(&self, angles: JointAngles) -> Result<JointAngles, MotionError> {
        Ok(JointAngles::new(
            self.shoulder.correct(angles.alpha)?,
            self.elbow.correct(angles.beta)?,
        ))
    }
}

/// Tolerance (in cells) for accepting a point as lying on the grid lattice.
const LATTICE_EPS: f64 = 1e-6;
/// Cell indices beyond this magnitude cannot be represented exactly.
const MAX_CELL_INDEX: f64 = 1e15;

/// Measured joint angles on a uniform grid of spacing `grid_size`.
///
/// Points are stored by integer lattice index so lookups never compare floating
/// point keys. The grid may have holes; lookups in incomplete cells fail.
#[derive(Debug, Clone)]
pub struct CalibrationGrid {
    grid_size: f64,
    points: HashMap<(i64, i64), JointAngles>,
}

impl CalibrationGrid {
    pub fn new(grid_size: f64) -> Result<Self, MotionError> {
        if !(grid_size.is_finite() && grid_size > 0.0) {
            return Err(MotionError::Config(format!(
                "grid_size must be > 0, got {grid_size}"
            )));
        }
        Ok(Self {
            grid_size,
            points: HashMap::new(),
        })
    }

    /// Build a grid from `(position, angles)` pairs; any off-lattice point is an error.
    pub fn from_points(
        grid_size: f64,
        points: impl IntoIterator<Item = (Point2D, JointAngles)>,
    ) -> Result<Self, MotionError> {
        let mut grid = Self::new(grid_size)?;
        for (position, angles) in points {
            grid.insert(position, angles)?;
        }
        Ok(grid)
    }

    /// Add (or replace) a measured point. The position must lie on the lattice.
    pub fn insert(&mut self, position: Point2D, angles: JointAngles) -> Result<(), MotionError> {
        let (Some(i), Some(j)) = (self.lattice_index(position.x), self.lattice_index(position.y))
        else {
            return Err(MotionError::Config(format!(
                "grid point ({}, {}) is not on a {} mm lattice",
                position.x, position.y, self.grid_size
            )));
        };
        if !(angles.alpha.is_finite() && angles.beta.is_finite()) {
            return Err(MotionError::Config(format!(
                "grid point ({}, {}) has non-finite angles",
                position.x, position.y
            )));
        }
        self.points.insert((i, j), angles);
        Ok(())
    }

    #[inline]
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Stored angles at an exact lattice point, if measured.
    pub fn get(&self, position: Point2D) -> Option<JointAngles> {
        let i = self.lattice_index(position.x)?;
        let j = self.lattice_index(position.y)?;
        self.points.get(&(i, j)).copied()
    }

    /// Bilinearly interpolated angles at `position`.
    ///
    /// The containing cell's lower-left corner is `floor(p / grid_size)`, after
    /// snapping coordinates that sit on a lattice line the way `insert` does. All four
    /// corners must be present. A point exactly on a cell edge may also be served
    /// by the neighbouring cell it borders, so measured corners along the top and
    /// right edge of the grid are still returned exactly.
    pub fn lookup(&self, position: Point2D) -> Result<JointAngles, MotionError> {
        if self.points.is_empty() {
            return Err(MotionError::OutOfCalibratedRange(CalibrationMiss::Empty));
        }
        let miss = MotionError::OutOfCalibratedRange(CalibrationMiss::GridCell {
            x: position.x,
            y: position.y,
        });
        let sx = position.x / self.grid_size;
        let sy = position.y / self.grid_size;
        if !(sx.is_finite() && sy.is_finite())
            || sx.abs() > MAX_CELL_INDEX
            || sy.abs() > MAX_CELL_INDEX
        {
            return Err(miss);
        }

        let (i0, u) = split_cell(sx);
        let (j0, v) = split_cell(sy);

        for (i, u) in edge_candidates(i0, u) {
            for (j, v) in edge_candidates(j0, v) {
                if let Some(angles) = self.blend(i, j, u, v) {
                    return Ok(angles);
                }
            }
        }
        Err(miss)
    }

    fn blend(&self, i: i64, j: i64, u: f64, v: f64) -> Option<JointAngles> {
        let q00 = self.points.get(&(i, j))?;
        let q10 = self.points.get(&(i + 1, j))?;
        let q01 = self.points.get(&(i, j + 1))?;
        let q11 = self.points.get(&(i + 1, j + 1))?;

        let w00 = (1.0 - u) * (1.0 - v);
        let w10 = u * (1.0 - v);
        let w01 = (1.0 - u) * v;
        let w11 = u * v;
        Some(JointAngles::new(
            w00 * q00.alpha + w10 * q10.alpha + w01 * q01.alpha + w11 * q11.alpha,
            w00 * q00.beta + w10 * q10.beta + w01 * q01.beta + w11 * q11.beta,
        ))
    }

    fn lattice_index(&self, coord: f64) -> Option<i64> {
        let s = coord / self.grid_size;
        if !s.is_finite() || s.abs() > MAX_CELL_INDEX {
            return None;
        }
        let r = s.round();
        ((s - r).abs() <= LATTICE_EPS).then_some(r as i64)
    }
}

/// Cell index and in-cell fraction for a coordinate in cell units.
///
/// Coordinates within `LATTICE_EPS` of a lattice line snap onto it, matching
/// `insert`, so a stored corner is never pushed into the cell below.
fn split_cell(s: f64) -> (i64, f64) {
    let r = s.round();
    if (s - r).abs() <= LATTICE_EPS {
        return (r as i64, 0.0);
    }
    let f = s.floor();
    (f as i64, s - f)
}

/// Cells that contain a coordinate: the floor cell, plus the previous cell when
/// the coordinate sits exactly on its upper edge.
fn edge_candidates(index: i64, frac: f64) -> impl Iterator<Item = (i64, f64)> {
    let on_edge = frac == 0.0;
    std::iter::once((index, frac)).chain(on_edge.then_some((index - 1, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shoulder_table() -> LinearCalibration {
        LinearCalibration::from_samples([(30.0, 33.0), (20.0, 21.0), (40.0, 41.0)]).unwrap()
    }

    #[test]
    fn linear_exact_key_and_interpolation() {
        let t = shoulder_table();
        assert_eq!(t.correct(20.0).unwrap(), 21.0);
        assert_eq!(t.correct(40.0).unwrap(), 41.0);
        assert!((t.correct(25.0).unwrap() - 27.0).abs() < 1e-12);
        assert!((t.correct(37.5).unwrap() - 39.0).abs() < 1e-12);
    }

    #[test]
    fn linear_rejects_outside_range() {
        let t = shoulder_table();
        for q in [19.999, 40.001, f64::NAN] {
            match t.correct(q) {
                Err(MotionError::OutOfCalibratedRange(CalibrationMiss::Angle { min, max, .. })) => {
                    assert_eq!((min, max), (20.0, 40.0));
                }
                other => panic!("expected OutOfCalibratedRange for {q}, got {other:?}"),
            }
        }
    }

    #[test]
    fn linear_rejects_duplicates_and_empty() {
        assert!(LinearCalibration::from_samples([(10.0, 1.0), (10.0, 2.0)]).is_err());
        assert!(LinearCalibration::from_samples(Vec::<(f64, f64)>::new()).is_err());
        assert!(LinearCalibration::from_samples([(f64::NAN, 1.0)]).is_err());
    }

    #[test]
    fn single_sample_table_only_matches_its_key() {
        let t = LinearCalibration::from_samples([(90.0, 92.0)]).unwrap();
        assert_eq!(t.correct(90.0).unwrap(), 92.0);
        assert!(t.correct(90.5).is_err());
    }

    #[test]
    fn grid_rejects_off_lattice_points() {
        let mut g = CalibrationGrid::new(5.0).unwrap();
        assert!(g.insert(Point2D::new(2.0, 0.0), JointAngles::new(1.0, 1.0)).is_err());
        assert!(g.insert(Point2D::new(-5.0, 10.0), JointAngles::new(1.0, 1.0)).is_ok());
        assert_eq!(g.get(Point2D::new(-5.0, 10.0)), Some(JointAngles::new(1.0, 1.0)));
    }

    #[test]
    fn grid_negative_coordinates_floor_correctly() {
        let g = CalibrationGrid::from_points(
            5.0,
            [
                (Point2D::new(-5.0, -5.0), JointAngles::new(0.0, 0.0)),
                (Point2D::new(0.0, -5.0), JointAngles::new(10.0, 0.0)),
                (Point2D::new(-5.0, 0.0), JointAngles::new(0.0, 10.0)),
                (Point2D::new(0.0, 0.0), JointAngles::new(10.0, 10.0)),
            ],
        )
        .unwrap();
        let a = g.lookup(Point2D::new(-1.0, -4.0)).unwrap();
        assert!((a.alpha - 8.0).abs() < 1e-9);
        assert!((a.beta - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_grid_reports_empty() {
        let g = CalibrationGrid::new(5.0).unwrap();
        assert_eq!(
            g.lookup(Point2D::ORIGIN).unwrap_err(),
            MotionError::OutOfCalibratedRange(CalibrationMiss::Empty)
        );
    }
}
