#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Motion resolution for a two-link pen-plotter arm (hardware-agnostic).
//!
//! Joystick readings enter through `plotter_traits::Joystick`, servo angles leave
//! through `plotter_traits::Arm`; everything in between lives here.
//!
//! ## Pipeline
//!
//! - **Smoothing**: per-channel EMA (`smoother`)
//! - **Mapping**: normalized stick position to board millimeters (`mapping`)
//! - **Limiting**: bounded per-tick pen travel (`trajectory`)
//! - **Resolution**: analytic IK (`kinematics`) with optional per-joint linear
//!   correction, or a measured bilinear grid (`calibration`)
//! - **Control**: the per-tick state machine (`controller`) and a paced loop (`runner`)
//!
//! Unreachable or uncalibrated targets never stop the loop: the tick is held,
//! the previous servo command stays in effect, and motion resumes once the
//! target comes back into range.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod geometry;
pub mod hw_error;
pub mod kinematics;
pub mod mapping;
pub mod runner;
pub mod smoother;
pub mod status;
pub mod trajectory;
pub mod util;

pub use builder::{MotionControllerBuilder, Missing, Set};
pub use calibration::{CalibrationGrid, JointCalibration, LinearCalibration};
pub use config::{LimiterCfg, MappingCfg, ServoCfg, SmoothingCfg};
pub use controller::{ControllerState, MotionController, Resolver};
pub use error::{BuildError, CalibrationMiss, MotionError, Report, Result};
pub use geometry::{ArmGeometry, JointAngles, Point2D};
pub use kinematics::ElbowBend;
pub use mapping::CoordinateMapper;
pub use runner::{RunParams, RunSummary, StopReason};
pub use smoother::SensorSmoother;
pub use status::TickStatus;
pub use trajectory::TrajectoryLimiter;
