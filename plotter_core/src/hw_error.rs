//! Maps `Box<dyn Error>` from trait boundaries to typed `MotionError`.
//!
//! `Joystick` and `Arm` return boxed errors so any driver can plug in; this
//! module turns them into `MotionError`, downcasting `plotter_hardware::HwError`
//! precisely when the `hardware-errors` feature is enabled.

use crate::error::MotionError;

/// Map a trait-boundary error to a typed `MotionError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> MotionError {
    #[cfg(feature = "hardware-errors")]
    {
        use plotter_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Disconnected(_) | HwError::Gpio(_) | HwError::Spi(_) => {
                    MotionError::HardwareFault(hw.to_string())
                }
                other => MotionError::Hardware(other.to_string()),
            };
        }
    }

    MotionError::Hardware(e.to_string())
}
