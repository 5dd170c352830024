pub mod error;
pub mod util;

use plotter_traits::{Arm, Joystick};

use crate::error::HwError;
use crate::util::clamp_servo;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
enum Pattern {
    Constant(f64, f64),
    /// Circle around the paper centre; `step` radians per read.
    Sweep { phase: f64, step: f64 },
    /// Replays the readings, holding the last one once exhausted.
    Scripted { readings: Vec<(f64, f64)>, next: usize },
}

/// Simulated joystick implementation
#[derive(Debug, Clone)]
pub struct SimulatedJoystick {
    pattern: Pattern,
    fail_after: Option<u64>,
    reads: u64,
}

impl SimulatedJoystick {
    /// Stick held at a fixed deflection.
    pub fn constant(x: f64, y: f64) -> Self {
        Self::with_pattern(Pattern::Constant(x, y))
    }

    /// Stick moved in a full circle every `reads_per_turn` reads.
    pub fn sweep(reads_per_turn: u32) -> Self {
        let step = std::f64::consts::TAU / f64::from(reads_per_turn.max(1));
        Self::with_pattern(Pattern::Sweep { phase: 0.0, step })
    }

    pub fn scripted(readings: Vec<(f64, f64)>) -> Self {
        Self::with_pattern(Pattern::Scripted { readings, next: 0 })
    }

    /// Report a disconnect on every read after the first `n`.
    pub fn failing_after(mut self, n: u64) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    fn with_pattern(pattern: Pattern) -> Self {
        Self {
            pattern,
            fail_after: None,
            reads: 0,
        }
    }
}

impl Joystick for SimulatedJoystick {
    fn read(&mut self) -> Result<(f64, f64), BoxError> {
        if self.fail_after.is_some_and(|n| self.reads >= n) {
            return Err(Box::new(HwError::Disconnected("simulated joystick".into())));
        }
        self.reads += 1;
        let reading = match &mut self.pattern {
            Pattern::Constant(x, y) => (*x, *y),
            Pattern::Sweep { phase, step } => {
                let r = (0.5 + 0.4 * phase.cos(), 0.5 + 0.4 * phase.sin());
                *phase = (*phase + *step) % std::f64::consts::TAU;
                r
            }
            Pattern::Scripted { readings, next } => {
                let idx = (*next).min(readings.len().saturating_sub(1));
                *next += 1;
                readings.get(idx).copied().unwrap_or((0.5, 0.5))
            }
        };
        tracing::trace!(x = reading.0, y = reading.1, "joystick sample (simulated)");
        Ok(reading)
    }
}

/// Simulated arm: clamps to the servo range and records every command.
#[derive(Debug, Clone)]
pub struct SimulatedArm {
    min_deg: f64,
    max_deg: f64,
    commands: Vec<(f64, f64)>,
}

impl Default for SimulatedArm {
    fn default() -> Self {
        Self::new(0.0, 180.0)
    }
}

impl SimulatedArm {
    pub fn new(min_deg: f64, max_deg: f64) -> Self {
        Self {
            min_deg,
            max_deg,
            commands: Vec::new(),
        }
    }

    /// Commands as applied (after clamping), oldest first.
    pub fn commands(&self) -> &[(f64, f64)] {
        &self.commands
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.commands.last().copied()
    }
}

impl Arm for SimulatedArm {
    fn set_angles(&mut self, shoulder_deg: f64, elbow_deg: f64) -> Result<(), BoxError> {
        let shoulder = clamp_servo(shoulder_deg, self.min_deg, self.max_deg)?;
        let elbow = clamp_servo(elbow_deg, self.min_deg, self.max_deg)?;
        if shoulder != shoulder_deg || elbow != elbow_deg {
            tracing::warn!(
                shoulder_deg,
                elbow_deg,
                min = self.min_deg,
                max = self.max_deg,
                "servo command clamped"
            );
        }
        tracing::debug!(shoulder, elbow, "servo command (simulated)");
        self.commands.push((shoulder, elbow));
        Ok(())
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hardware {
    //! Raspberry Pi devices: hobby servos on GPIO soft-PWM, joystick on an MCP3008.

    use std::time::Duration;

    use rppal::gpio::{Gpio, OutputPin};
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

    use super::BoxError;
    use crate::error::HwError;
    use crate::util::{ADC_FULL_SCALE_10BIT, clamp_servo, normalize_counts, servo_pulse_us};

    const SERVO_PERIOD: Duration = Duration::from_millis(20);

    pub struct ServoArm {
        shoulder: OutputPin,
        elbow: OutputPin,
        min_deg: f64,
        max_deg: f64,
    }

    impl ServoArm {
        pub fn try_new(
            shoulder_pin: u8,
            elbow_pin: u8,
            min_deg: f64,
            max_deg: f64,
        ) -> crate::error::Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let shoulder = gpio
                .get(shoulder_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            let elbow = gpio
                .get(elbow_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            Ok(Self {
                shoulder,
                elbow,
                min_deg,
                max_deg,
            })
        }

        fn drive(pin: &mut OutputPin, deg: f64) -> crate::error::Result<()> {
            let pulse = Duration::from_micros(servo_pulse_us(deg));
            pin.set_pwm(SERVO_PERIOD, pulse)
                .map_err(|e| HwError::Gpio(e.to_string()))
        }
    }

    impl plotter_traits::Arm for ServoArm {
        fn set_angles(&mut self, shoulder_deg: f64, elbow_deg: f64) -> Result<(), BoxError> {
            let shoulder = clamp_servo(shoulder_deg, self.min_deg, self.max_deg)?;
            let elbow = clamp_servo(elbow_deg, self.min_deg, self.max_deg)?;
            Self::drive(&mut self.shoulder, shoulder)?;
            Self::drive(&mut self.elbow, elbow)?;
            tracing::debug!(shoulder, elbow, "servo command");
            Ok(())
        }
    }

    pub struct Mcp3008Joystick {
        spi: Spi,
        x_channel: u8,
        y_channel: u8,
    }

    impl Mcp3008Joystick {
        pub fn try_new(x_channel: u8, y_channel: u8) -> crate::error::Result<Self> {
            if x_channel > 7 || y_channel > 7 {
                return Err(HwError::Spi(format!(
                    "MCP3008 channels must be 0..=7, got {x_channel} and {y_channel}"
                )));
            }
            let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_000_000, Mode::Mode0)
                .map_err(|e| HwError::Spi(e.to_string()))?;
            Ok(Self {
                spi,
                x_channel,
                y_channel,
            })
        }

        fn read_channel(&self, channel: u8) -> crate::error::Result<u16> {
            let tx = [0x01, (0x08 | channel) << 4, 0x00];
            let mut rx = [0u8; 3];
            self.spi
                .transfer(&mut rx, &tx)
                .map_err(|e| HwError::Spi(e.to_string()))?;
            let raw = ((u16::from(rx[1]) & 0x03) << 8) | u16::from(rx[2]);
            tracing::trace!(channel, raw, "mcp3008 raw read");
            Ok(raw)
        }
    }

    impl plotter_traits::Joystick for Mcp3008Joystick {
        fn read(&mut self) -> Result<(f64, f64), BoxError> {
            let x = self.read_channel(self.x_channel)?;
            let y = self.read_channel(self.y_channel)?;
            Ok((
                normalize_counts(x, ADC_FULL_SCALE_10BIT),
                normalize_counts(y, ADC_FULL_SCALE_10BIT),
            ))
        }
    }
}
