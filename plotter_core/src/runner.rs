//! Paced control loop driving a `MotionController` against device traits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use plotter_traits::{Arm, Clock, Joystick};

use crate::controller::MotionController;
use crate::error::Result;
use crate::geometry::{JointAngles, Point2D};
use crate::hw_error::map_hw_error;
use crate::status::TickStatus;

/// Loop pacing and stop conditions.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub tick_hz: u32,
    /// Stop after this many ticks (skipped ticks included).
    pub max_ticks: Option<u64>,
    /// Stop once this much clock time has passed since the run started.
    pub max_run: Option<Duration>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            tick_hz: 20,
            max_ticks: None,
            max_run: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TickLimit,
    TimeLimit,
    Shutdown,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::TickLimit => "tick_limit",
            StopReason::TimeLimit => "time_limit",
            StopReason::Shutdown => "shutdown",
        }
    }
}

/// Counters reported when a run ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub commands: u64,
    /// Ticks whose target could not be resolved.
    pub held: u64,
    pub skipped: u64,
    pub stop: StopReason,
    pub final_position: Option<Point2D>,
    pub last_command: Option<JointAngles>,
}

/// Run the controller until a stop condition is met.
///
/// The first tick is treated as one nominal period long so it is never skipped.
/// Device errors and unrecoverable resolution errors end the run; unreachable
/// targets do not.
pub fn run<J, A, C>(
    controller: &mut MotionController,
    joystick: &mut J,
    arm: &mut A,
    clock: &C,
    params: &RunParams,
    shutdown: &AtomicBool,
) -> Result<RunSummary>
where
    J: Joystick + ?Sized,
    A: Arm + ?Sized,
    C: Clock + ?Sized,
{
    let period = crate::util::period(params.tick_hz);
    let start = clock.now();
    let mut last_tick = None;
    let (mut ticks, mut commands, mut held, mut skipped) = (0u64, 0u64, 0u64, 0u64);

    tracing::info!(
        tick_hz = params.tick_hz,
        resolver = controller.resolver().name(),
        max_ticks = ?params.max_ticks,
        max_run_ms = ?params.max_run.map(|d| d.as_millis()),
        "run start"
    );

    let stop = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }
        if params.max_ticks.is_some_and(|n| ticks >= n) {
            break StopReason::TickLimit;
        }
        if params
            .max_run
            .is_some_and(|cap| clock.elapsed_since(start) >= cap)
        {
            break StopReason::TimeLimit;
        }

        let raw = joystick
            .read()
            .map_err(|e| map_hw_error(&*e))
            .wrap_err("joystick read failed")?;

        let now = clock.now();
        let elapsed = match last_tick {
            Some(prev) => now.saturating_duration_since(prev),
            None => period,
        };
        last_tick = Some(now);
        ticks += 1;

        match controller.tick(raw, elapsed) {
            TickStatus::Command(cmd) => {
                arm.set_angles(cmd.alpha, cmd.beta)
                    .map_err(|e| map_hw_error(&*e))
                    .wrap_err("arm command failed")?;
                commands += 1;
            }
            TickStatus::Held(e) if e.is_recoverable() => held += 1,
            TickStatus::Held(e) => {
                return Err(eyre::Report::new(e).wrap_err("motion resolution failed"));
            }
            TickStatus::Skipped => skipped += 1,
        }

        let spent = clock.elapsed_since(now);
        if spent < period {
            clock.sleep(period - spent);
        }
    };

    let summary = RunSummary {
        ticks,
        commands,
        held,
        skipped,
        stop,
        final_position: controller.position(),
        last_command: controller.last_command(),
    };
    tracing::info!(
        ticks,
        commands,
        held,
        skipped,
        stop = stop.as_str(),
        "run stop"
    );
    Ok(summary)
}
