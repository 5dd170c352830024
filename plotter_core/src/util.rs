use std::time::Duration;

/// Tick period for a loop rate in Hz.
///
/// `hz = 0` is treated as 1 Hz; rates above 1 MHz floor to one microsecond.
#[inline]
pub fn period(hz: u32) -> Duration {
    Duration::from_micros((1_000_000 / u64::from(hz.max(1))).max(1))
}
