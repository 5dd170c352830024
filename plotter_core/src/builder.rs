//! Type-state builder for `MotionController`.
//!
//! The builder enforces at compile time that exactly one resolver (arm geometry or
//! calibration grid) is provided before `build()` is available. `try_build()` is
//! always available for dynamic checks.

use std::marker::PhantomData;

use crate::calibration::{CalibrationGrid, JointCalibration};
use crate::config::{LimiterCfg, MappingCfg, ServoCfg, SmoothingCfg};
use crate::controller::{ControllerState, MotionController, Resolver};
use crate::error::{BuildError, Result};
use crate::geometry::ArmGeometry;
use crate::kinematics::ElbowBend;
use crate::mapping::CoordinateMapper;
use crate::smoother::SensorSmoother;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

enum ResolverChoice {
    Analytic(ArmGeometry),
    Grid(CalibrationGrid),
}

/// Builder for `MotionController`. All fields are validated on `build()`.
pub struct MotionControllerBuilder<R> {
    resolver: Option<ResolverChoice>,
    smoothing: Option<SmoothingCfg>,
    mapping: Option<MappingCfg>,
    limiter: Option<LimiterCfg>,
    servo: Option<ServoCfg>,
    joints: Option<JointCalibration>,
    bend: ElbowBend,
    _r: PhantomData<R>,
}

impl Default for MotionControllerBuilder<Missing> {
    fn default() -> Self {
        Self {
            resolver: None,
            smoothing: None,
            mapping: None,
            limiter: None,
            servo: None,
            joints: None,
            bend: ElbowBend::Principal,
            _r: PhantomData,
        }
    }
}

impl MotionController {
    /// Start building a controller.
    pub fn builder() -> MotionControllerBuilder<Missing> {
        MotionControllerBuilder::default()
    }
}

impl<R> MotionControllerBuilder<R> {
    fn retag<R2>(self) -> MotionControllerBuilder<R2> {
        MotionControllerBuilder {
            resolver: self.resolver,
            smoothing: self.smoothing,
            mapping: self.mapping,
            limiter: self.limiter,
            servo: self.servo,
            joints: self.joints,
            bend: self.bend,
            _r: PhantomData,
        }
    }

    pub fn with_smoothing(mut self, cfg: SmoothingCfg) -> Self {
        self.smoothing = Some(cfg);
        self
    }

    pub fn with_mapping(mut self, cfg: MappingCfg) -> Self {
        self.mapping = Some(cfg);
        self
    }

    pub fn with_limiter(mut self, cfg: LimiterCfg) -> Self {
        self.limiter = Some(cfg);
        self
    }

    /// Servo mounting offsets (analytic mode only).
    pub fn with_servo(mut self, cfg: ServoCfg) -> Self {
        self.servo = Some(cfg);
        self
    }

    /// Per-joint linear correction applied after IK (analytic mode only).
    pub fn with_joint_calibration(mut self, joints: Option<JointCalibration>) -> Self {
        self.joints = joints;
        self
    }

    pub fn with_elbow_bend(mut self, bend: ElbowBend) -> Self {
        self.bend = bend;
        self
    }

    /// Always available; returns an error when no resolver was provided.
    pub fn try_build(self) -> Result<MotionController> {
        let smoothing = self.smoothing.unwrap_or_default();
        let mapping = self.mapping.unwrap_or_default();
        let limiter = self.limiter.unwrap_or_default();

        let smoother_x = SensorSmoother::new(smoothing.alpha)
            .map_err(|_| BuildError::InvalidConfig("smoothing alpha must be in (0.0, 1.0]"))?;
        let smoother_y = smoother_x.clone();

        let mapping_values = [
            mapping.paper_width,
            mapping.paper_height,
            mapping.x_offset,
            mapping.y_offset,
            mapping.y_base_offset,
        ];
        if mapping_values.iter().any(|v| !v.is_finite()) {
            return Err(BuildError::InvalidConfig("mapping values must be finite").into());
        }
        if mapping.paper_width <= 0.0 || mapping.paper_height <= 0.0 {
            return Err(BuildError::InvalidConfig("paper size must be > 0").into());
        }

        if !(limiter.max_step_mm.is_finite() && limiter.max_step_mm > 0.0) {
            return Err(BuildError::InvalidConfig("max_step_mm must be > 0").into());
        }
        if limiter
            .max_speed_mm_s
            .is_some_and(|speed| !(speed.is_finite() && speed > 0.0))
        {
            return Err(BuildError::InvalidConfig("max_speed_mm_s must be > 0").into());
        }
        if limiter.home.is_some_and(|home| !home.is_finite()) {
            return Err(BuildError::InvalidConfig("home position must be finite").into());
        }

        let resolver = match self.resolver {
            None => return Err(BuildError::MissingResolver.into()),
            Some(ResolverChoice::Analytic(geometry)) => {
                // Mirrored solutions have beta <= 0; a table without negative
                // elbow keys would miss on every tick.
                if self.bend == ElbowBend::Mirrored
                    && self.joints.as_ref().is_some_and(|j| j.elbow.range().0 >= 0.0)
                {
                    return Err(BuildError::InvalidConfig(
                        "mirrored elbow needs an elbow calibration keyed on negative angles",
                    )
                    .into());
                }
                Resolver::Analytic {
                    geometry,
                    bend: self.bend,
                    joints: self.joints,
                    servo: self.servo.unwrap_or_default(),
                }
            }
            Some(ResolverChoice::Grid(grid)) => {
                if self.joints.is_some() {
                    return Err(BuildError::InvalidConfig(
                        "joint calibration applies to analytic mode only",
                    )
                    .into());
                }
                Resolver::Grid(grid)
            }
        };

        Ok(MotionController {
            smoother_x,
            smoother_y,
            mapper: CoordinateMapper::new(mapping),
            limiter_cfg: limiter,
            limiter: None,
            resolver,
            state: ControllerState::Running,
            last_target: None,
            last_command: None,
        })
    }
}

impl MotionControllerBuilder<Missing> {
    /// Resolve targets with the analytic IK solver.
    pub fn with_geometry(mut self, geometry: ArmGeometry) -> MotionControllerBuilder<Set> {
        self.resolver = Some(ResolverChoice::Analytic(geometry));
        self.retag()
    }

    /// Resolve targets by bilinear lookup in a measured grid.
    pub fn with_grid(mut self, grid: CalibrationGrid) -> MotionControllerBuilder<Set> {
        self.resolver = Some(ResolverChoice::Grid(grid));
        self.retag()
    }
}

impl MotionControllerBuilder<Set> {
    pub fn build(self) -> Result<MotionController> {
        self.try_build()
    }
}
