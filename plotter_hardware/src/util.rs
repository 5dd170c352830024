use crate::error::{HwError, Result};

/// Full scale of a 16-bit ADC reading.
pub const ADC_FULL_SCALE_U16: u16 = u16::MAX;
/// Full scale of the 10-bit MCP3008.
pub const ADC_FULL_SCALE_10BIT: u16 = 1023;

/// Normalize a 16-bit ADC reading to `[0.0, 1.0]`.
#[inline]
pub fn normalize_adc(raw: u16) -> f64 {
    f64::from(raw) / f64::from(ADC_FULL_SCALE_U16)
}

/// Normalize a reading against an arbitrary full scale, clamping overshoot.
#[inline]
pub fn normalize_counts(raw: u16, full_scale: u16) -> f64 {
    if full_scale == 0 {
        return 0.0;
    }
    (f64::from(raw) / f64::from(full_scale)).min(1.0)
}

/// Clamp a servo command into `[min_deg, max_deg]`.
///
/// Non-finite commands are rejected rather than clamped.
pub fn clamp_servo(deg: f64, min_deg: f64, max_deg: f64) -> Result<f64> {
    if !deg.is_finite() {
        return Err(HwError::InvalidCommand(format!("{deg} degrees")));
    }
    Ok(deg.clamp(min_deg, max_deg))
}

/// Pulse width in microseconds for a hobby servo at `deg` (0..=180 maps to 500..=2500).
#[inline]
pub fn servo_pulse_us(deg: f64) -> u64 {
    let deg = deg.clamp(0.0, 180.0);
    (500.0 + deg / 180.0 * 2000.0).round() as u64
}
