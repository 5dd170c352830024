//! The per-tick motion pipeline (`MotionController`).
//!
//! smooth -> map -> limit -> resolve (IK + joint correction, or grid) -> servo offsets.
//! Smoother and limiter state persist across ticks; a tick that cannot be resolved
//! leaves both in place so motion resumes smoothly once the target is back in range.

use std::time::Duration;

use crate::calibration::{CalibrationGrid, JointCalibration};
use crate::config::{LimiterCfg, ServoCfg};
use crate::error::MotionError;
use crate::geometry::{ArmGeometry, JointAngles, Point2D};
use crate::kinematics::{self, ElbowBend};
use crate::mapping::CoordinateMapper;
use crate::smoother::SensorSmoother;
use crate::status::TickStatus;
use crate::trajectory::TrajectoryLimiter;

/// How a board position becomes servo angles.
#[derive(Debug, Clone)]
pub enum Resolver {
    /// Analytic IK, optional per-joint linear correction, then servo offsets.
    Analytic {
        geometry: ArmGeometry,
        bend: ElbowBend,
        joints: Option<JointCalibration>,
        servo: ServoCfg,
    },
    /// Measured grid; its angles are already in servo space.
    Grid(CalibrationGrid),
}

impl Resolver {
    /// Servo angles for `position`.
    pub fn resolve(&self, position: Point2D) -> Result<JointAngles, MotionError> {
        match self {
            Resolver::Analytic {
                geometry,
                bend,
                joints,
                servo,
            } => {
                let solved = kinematics::solve_with(position, geometry, *bend)?;
                let corrected = match joints {
                    Some(table) => table.correct(solved)?,
                    None => solved,
                };
                Ok(servo.apply(corrected))
            }
            Resolver::Grid(grid) => grid.lookup(position),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Resolver::Analytic { .. } => "analytic",
            Resolver::Grid(_) => "grid",
        }
    }
}

/// Controller state between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Running,
    Unreachable,
}

pub struct MotionController {
    pub(crate) smoother_x: SensorSmoother,
    pub(crate) smoother_y: SensorSmoother,
    pub(crate) mapper: CoordinateMapper,
    pub(crate) limiter_cfg: LimiterCfg,
    pub(crate) limiter: Option<TrajectoryLimiter>,
    pub(crate) resolver: Resolver,
    pub(crate) state: ControllerState,
    pub(crate) last_target: Option<Point2D>,
    pub(crate) last_command: Option<JointAngles>,
}

impl core::fmt::Debug for MotionController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MotionController")
            .field("resolver", &self.resolver.name())
            .field("state", &self.state)
            .field("position", &self.position())
            .field("last_command", &self.last_command)
            .finish()
    }
}

impl MotionController {
    /// Run one control tick on a raw joystick reading.
    ///
    /// `elapsed` is the time since the previous tick. A zero-length tick is skipped
    /// without touching any state.
    pub fn tick(&mut self, raw: (f64, f64), elapsed: Duration) -> TickStatus {
        let Some(max_step) = self.limiter_cfg.max_step(elapsed) else {
            tracing::trace!("zero-length tick skipped");
            return TickStatus::Skipped;
        };

        let x = self.smoother_x.update(raw.0);
        let y = self.smoother_y.update(raw.1);
        let target = self.mapper.map(x, y);
        self.last_target = Some(target);

        let home = self.limiter_cfg.home;
        let limiter = self
            .limiter
            .get_or_insert_with(|| TrajectoryLimiter::new(home.unwrap_or(target)));
        let position = limiter.advance(target, max_step);

        match self.resolver.resolve(position) {
            Ok(cmd) => {
                if self.state == ControllerState::Unreachable {
                    tracing::info!(x = position.x, y = position.y, "target back in range");
                }
                self.state = ControllerState::Running;
                self.last_command = Some(cmd);
                tracing::debug!(
                    x = position.x,
                    y = position.y,
                    shoulder = cmd.alpha,
                    elbow = cmd.beta,
                    "command"
                );
                TickStatus::Command(cmd)
            }
            Err(e) => {
                if self.state == ControllerState::Running {
                    tracing::warn!(error = %e, "holding position");
                }
                self.state = ControllerState::Unreachable;
                TickStatus::Held(e)
            }
        }
    }

    /// Restart: forget smoother seeds and the interpolated position.
    pub fn reset(&mut self) {
        self.smoother_x.reset();
        self.smoother_y.reset();
        self.limiter = None;
        self.state = ControllerState::Running;
        self.last_target = None;
        self.last_command = None;
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Current interpolated pen position, once the first tick has run.
    pub fn position(&self) -> Option<Point2D> {
        self.limiter.as_ref().map(TrajectoryLimiter::position)
    }

    /// Board position requested by the joystick on the last processed tick.
    pub fn last_target(&self) -> Option<Point2D> {
        self.last_target
    }

    /// Last servo command emitted (persists at the actuator while held).
    pub fn last_command(&self) -> Option<JointAngles> {
        self.last_command
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }
}
