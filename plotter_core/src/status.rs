//! Outcome of a single control tick.

use crate::error::MotionError;
use crate::geometry::JointAngles;

/// Public status of a single step of the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TickStatus {
    /// Servo angles to send to the arm this tick.
    Command(JointAngles),
    /// Target could not be resolved; nothing is sent and the last command persists.
    Held(MotionError),
    /// Zero-length tick; no state was touched.
    Skipped,
}

impl TickStatus {
    pub fn command(&self) -> Option<JointAngles> {
        match self {
            TickStatus::Command(a) => Some(*a),
            _ => None,
        }
    }
}
