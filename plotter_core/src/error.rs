use thiserror::Error;

/// Errors produced while resolving or driving arm motion.
///
/// `Unreachable` and `OutOfCalibratedRange` are per-tick conditions: the controller
/// holds the last command and retries on the next tick. The remaining variants end a run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionError {
    #[error(
        "target ({x:.2}, {y:.2}) is unreachable: distance {distance:.2} outside [{min_reach:.2}, {max_reach:.2}]"
    )]
    Unreachable {
        x: f64,
        y: f64,
        distance: f64,
        min_reach: f64,
        max_reach: f64,
    },
    #[error("out of calibrated range: {0}")]
    OutOfCalibratedRange(CalibrationMiss),
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl MotionError {
    /// True for conditions the controller recovers from on a later tick.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MotionError::Unreachable { .. } | MotionError::OutOfCalibratedRange(_)
        )
    }
}

/// Why a calibration lookup could not produce a value.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CalibrationMiss {
    #[error("angle {angle:.2} outside sampled keys [{min:.2}, {max:.2}]")]
    Angle { angle: f64, min: f64, max: f64 },
    #[error("grid cell around ({x:.2}, {y:.2}) is not fully calibrated")]
    GridCell { x: f64, y: f64 },
    #[error("calibration table is empty")]
    Empty,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing resolver: provide arm geometry or a calibration grid")]
    MissingResolver,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
