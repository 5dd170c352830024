//! Plain value types shared by every stage of the pipeline.

use core::ops::{Add, Mul, Sub};

use crate::error::MotionError;

/// A position on the board, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector from the origin to this point.
    #[inline]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn distance_to(self, other: Point2D) -> f64 {
        (other - self).norm()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;
    fn mul(self, k: f64) -> Point2D {
        Point2D::new(self.x * k, self.y * k)
    }
}

/// Shoulder (`alpha`) and elbow (`beta`) angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointAngles {
    pub alpha: f64,
    pub beta: f64,
}

impl JointAngles {
    #[inline]
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }
}

/// Fixed geometry of the two-link arm.
///
/// `anchor` is the shoulder pivot in board coordinates; link lengths are in the
/// same units and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmGeometry {
    anchor: Point2D,
    link1: f64,
    link2: f64,
}

impl ArmGeometry {
    pub fn new(anchor: Point2D, link1: f64, link2: f64) -> Result<Self, MotionError> {
        if !anchor.is_finite() {
            return Err(MotionError::Config("arm anchor must be finite".into()));
        }
        if !(link1.is_finite() && link1 > 0.0) {
            return Err(MotionError::Config(format!(
                "link1 length must be > 0, got {link1}"
            )));
        }
        if !(link2.is_finite() && link2 > 0.0) {
            return Err(MotionError::Config(format!(
                "link2 length must be > 0, got {link2}"
            )));
        }
        Ok(Self {
            anchor,
            link1,
            link2,
        })
    }

    #[inline]
    pub fn anchor(&self) -> Point2D {
        self.anchor
    }

    #[inline]
    pub fn link1(&self) -> f64 {
        self.link1
    }

    #[inline]
    pub fn link2(&self) -> f64 {
        self.link2
    }

    /// Inner radius of the workspace annulus.
    #[inline]
    pub fn min_reach(&self) -> f64 {
        (self.link1 - self.link2).abs()
    }

    /// Outer radius of the workspace annulus.
    #[inline]
    pub fn max_reach(&self) -> f64 {
        self.link1 + self.link2
    }
}
