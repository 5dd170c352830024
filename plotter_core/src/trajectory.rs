//! Velocity-limited interpolation of the pen position.

use crate::geometry::Point2D;

/// Move from `current` toward `target` by at most `max_step`.
///
/// - Returns `target` exactly when it is within `max_step`.
/// - Returns `current` unchanged when already on target or when `max_step` is not
///   a positive number, so there is never a division by a zero length.
pub fn step(current: Point2D, target: Point2D, max_step: f64) -> Point2D {
    let delta = target - current;
    let dist = delta.norm();
    if dist == 0.0 || !(max_step > 0.0) {
        return current;
    }
    if dist <= max_step {
        return target;
    }
    current + delta * (max_step / dist)
}

/// Holds the last commanded (not necessarily reached) pen position across ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryLimiter {
    position: Point2D,
}

impl TrajectoryLimiter {
    pub fn new(start: Point2D) -> Self {
        Self { position: start }
    }

    #[inline]
    pub fn position(&self) -> Point2D {
        self.position
    }

    /// Advance toward `target` and return the new interpolated position.
    pub fn advance(&mut self, target: Point2D, max_step: f64) -> Point2D {
        self.position = step(self.position, target, max_step);
        self.position
    }
}
