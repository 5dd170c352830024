//! Exponential moving average over one normalized input channel.

use crate::error::MotionError;

/// EMA filter for a joystick channel.
///
/// Input is clamped to `[0, 1]` before blending, so the output stays in range.
/// The first sample seeds the filter directly to avoid a startup ramp from zero.
#[derive(Debug, Clone)]
pub struct SensorSmoother {
    alpha: f64,
    current: Option<f64>,
}

impl SensorSmoother {
    /// Create a smoother with EMA weight `alpha` in `(0, 1]`.
    pub fn new(alpha: f64) -> Result<Self, MotionError> {
        if !(alpha.is_finite() && alpha > 0.0 && alpha <= 1.0) {
            return Err(MotionError::Config(format!(
                "smoothing alpha must be in (0.0, 1.0], got {alpha}"
            )));
        }
        Ok(Self {
            alpha,
            current: None,
        })
    }

    /// Feed one raw reading and return the smoothed value.
    pub fn update(&mut self, raw: f64) -> f64 {
        // NaN/inf from a glitched read counts as "no change"
        let sample = if raw.is_finite() {
            raw.clamp(0.0, 1.0)
        } else {
            self.current.unwrap_or(0.0)
        };
        let next = match self.current {
            None => sample,
            Some(prev) => (self.alpha * sample + (1.0 - self.alpha) * prev).clamp(0.0, 1.0),
        };
        self.current = Some(next);
        next
    }

    /// Last smoothed value, if any sample has been seen.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.current
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Forget the seed; the next sample is taken as-is.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_filter() {
        let mut s = SensorSmoother::new(0.1).unwrap();
        assert_eq!(s.update(0.8), 0.8);
        let second = s.update(0.0);
        assert!((second - 0.72).abs() < 1e-12);
    }

    #[test]
    fn clamps_out_of_range_samples() {
        let mut s = SensorSmoother::new(1.0).unwrap();
        assert_eq!(s.update(1.7), 1.0);
        assert_eq!(s.update(-0.3), 0.0);
    }

    #[test]
    fn non_finite_sample_holds_value() {
        let mut s = SensorSmoother::new(0.5).unwrap();
        s.update(0.4);
        assert_eq!(s.update(f64::NAN), 0.4);
        s.reset();
        assert_eq!(s.update(f64::INFINITY), 0.0);
    }

    #[test]
    fn rejects_bad_alpha() {
        for a in [0.0, -0.1, 1.5, f64::NAN] {
            assert!(SensorSmoother::new(a).is_err(), "alpha {a} accepted");
        }
    }
}
