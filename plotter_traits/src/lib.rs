pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Two-channel analog input (the joystick potentiometers).
///
/// Readings are normalized to `[0.0, 1.0]` by the implementation; values slightly
/// outside that range (ADC glitches) are tolerated and clamped downstream.
pub trait Joystick {
    fn read(&mut self) -> Result<(f64, f64), Box<dyn std::error::Error + Send + Sync>>;
}

/// Two-joint actuator (shoulder and elbow servos).
pub trait Arm {
    /// Command both joints, in degrees of servo travel.
    fn set_angles(
        &mut self,
        shoulder_deg: f64,
        elbow_deg: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
