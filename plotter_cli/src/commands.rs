//! Config loading, controller assembly, and command execution.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use plotter_config::{Config, ResolveMode};
use plotter_core::conversions::grid_from_file;
use plotter_core::kinematics::{self, ElbowBend};
use plotter_core::runner::{RunParams, RunSummary};
use plotter_core::{
    ArmGeometry, CalibrationGrid, JointAngles, JointCalibration, LimiterCfg, MappingCfg,
    MotionController, Point2D, Resolver, ServoCfg, SmoothingCfg,
};
use plotter_traits::{Arm, Joystick, MonotonicClock};

use crate::cli::Cli;

/// Config plus every calibration table it references, loaded and validated.
pub struct Loaded {
    pub cfg: Config,
    pub config_path: PathBuf,
    pub linear: Option<(PathBuf, JointCalibration, usize)>,
    pub grid: Option<(PathBuf, CalibrationGrid, usize)>,
}

/// Relative calibration paths in the config are taken relative to the config file.
fn resolve_path(config_path: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(p),
        None => p.to_path_buf(),
    }
}

pub fn load_config(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = plotter_config::load_toml(&text)
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    Ok(cfg)
}

pub fn load(cli: &Cli, cfg: Config) -> eyre::Result<Loaded> {
    let linear_path = cli.linear_calibration.clone().or_else(|| {
        cfg.calibration
            .linear_csv
            .as_deref()
            .map(|p| resolve_path(&cli.config, p))
    });
    let grid_path = cli.grid.clone().or_else(|| {
        cfg.calibration
            .grid_json
            .as_deref()
            .map(|p| resolve_path(&cli.config, p))
    });

    let linear = match linear_path {
        Some(path) => {
            let rows = plotter_config::load_linear_calibration_csv(&path)
                .wrap_err_with(|| format!("linear calibration CSV {}", path.display()))?;
            let table = JointCalibration::try_from(rows.as_slice())
                .wrap_err_with(|| format!("linear calibration {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = rows.len(), "linear calibration loaded");
            Some((path, table, rows.len()))
        }
        None => None,
    };

    let grid = match grid_path {
        Some(path) => {
            let file = plotter_config::load_grid_json(&path)
                .wrap_err_with(|| format!("grid calibration {}", path.display()))?;
            let grid = grid_from_file(&file, cfg.calibration.grid_size_mm)
                .wrap_err_with(|| format!("grid calibration {}", path.display()))?;
            let dropped = file.skipped.len() + file.points.len() - grid.len();
            Some((path, grid, dropped))
        }
        None => None,
    };

    Ok(Loaded {
        cfg,
        config_path: cli.config.clone(),
        linear,
        grid,
    })
}

fn analytic_resolver(loaded: &Loaded, bend: ElbowBend) -> eyre::Result<Resolver> {
    let geometry = ArmGeometry::try_from(&loaded.cfg.arm)?;
    Ok(Resolver::Analytic {
        geometry,
        bend,
        joints: loaded.linear.as_ref().map(|(_, t, _)| t.clone()),
        servo: ServoCfg::from(&loaded.cfg.servo),
    })
}

pub fn build_controller(loaded: &Loaded) -> eyre::Result<MotionController> {
    let cfg = &loaded.cfg;
    let builder = MotionController::builder()
        .with_smoothing(SmoothingCfg::from(&cfg.smoothing))
        .with_mapping(MappingCfg::from(&cfg.board))
        .with_limiter(LimiterCfg::from(&cfg.motion));

    match cfg.runner.mode {
        ResolveMode::Analytic => builder
            .with_geometry(ArmGeometry::try_from(&cfg.arm)?)
            .with_elbow_bend(cfg.runner.elbow_bend.into())
            .with_servo(ServoCfg::from(&cfg.servo))
            .with_joint_calibration(loaded.linear.as_ref().map(|(_, t, _)| t.clone()))
            .build(),
        ResolveMode::Grid => {
            let Some((_, grid, _)) = loaded.grid.as_ref() else {
                eyre::bail!("runner.mode = \"grid\" requires a grid calibration file");
            };
            if loaded.linear.is_some() {
                tracing::warn!("linear calibration is ignored in grid mode");
            }
            builder.with_grid(grid.clone()).build()
        }
    }
}

type Devices = (Box<dyn Joystick>, Box<dyn Arm>);

fn simulated_devices(cfg: &Config, stick: Option<(f64, f64)>) -> Devices {
    let joystick = match stick {
        Some((x, y)) => plotter_hardware::SimulatedJoystick::constant(x, y),
        None => plotter_hardware::SimulatedJoystick::sweep(cfg.runner.tick_hz.saturating_mul(10)),
    };
    let arm = plotter_hardware::SimulatedArm::new(cfg.servo.min_deg, cfg.servo.max_deg);
    (Box::new(joystick), Box::new(arm))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_devices(cfg: &Config, stick: Option<(f64, f64)>) -> eyre::Result<Devices> {
    use plotter_hardware::hardware::{Mcp3008Joystick, ServoArm};
    let Some(pins) = cfg.pins.as_ref() else {
        tracing::warn!("no [pins] configured; using simulated devices");
        return Ok(simulated_devices(cfg, stick));
    };
    let joystick = Mcp3008Joystick::try_new(pins.joystick_x_channel, pins.joystick_y_channel)
        .wrap_err("open joystick ADC")?;
    let arm = ServoArm::try_new(
        pins.shoulder_servo,
        pins.elbow_servo,
        cfg.servo.min_deg,
        cfg.servo.max_deg,
    )
    .wrap_err("open servo pins")?;
    Ok((Box::new(joystick), Box::new(arm)))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_devices(cfg: &Config, stick: Option<(f64, f64)>) -> eyre::Result<Devices> {
    Ok(simulated_devices(cfg, stick))
}

pub struct RunArgs {
    pub ticks: Option<u64>,
    pub max_run_ms: Option<u64>,
    pub stick: Option<(f64, f64)>,
}

pub fn run_plot(
    loaded: &Loaded,
    args: &RunArgs,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<RunSummary> {
    let mut controller = build_controller(loaded)?;
    let (mut joystick, mut arm) = make_devices(&loaded.cfg, args.stick)?;
    let params = RunParams {
        tick_hz: loaded.cfg.runner.tick_hz,
        max_ticks: args.ticks,
        max_run: args.max_run_ms.map(Duration::from_millis),
    };
    plotter_core::runner::run(
        &mut controller,
        joystick.as_mut(),
        arm.as_mut(),
        &MonotonicClock::new(),
        &params,
        &shutdown,
    )
}

/// Result of a one-off IK solve.
pub struct Solved {
    pub target: Point2D,
    pub joints: JointAngles,
    pub servo: JointAngles,
    pub reached: Point2D,
}

pub fn solve(loaded: &Loaded, target: Point2D, mirrored: bool) -> eyre::Result<Solved> {
    let bend = if mirrored {
        ElbowBend::Mirrored
    } else {
        loaded.cfg.runner.elbow_bend.into()
    };
    let geometry = ArmGeometry::try_from(&loaded.cfg.arm)?;
    let joints = kinematics::solve_with(target, &geometry, bend)?;
    let servo = analytic_resolver(loaded, bend)?.resolve(target)?;
    Ok(Solved {
        target,
        joints,
        servo,
        reached: kinematics::forward(joints, &geometry),
    })
}

pub fn lookup(loaded: &Loaded, target: Point2D) -> eyre::Result<JointAngles> {
    let Some((_, grid, _)) = loaded.grid.as_ref() else {
        eyre::bail!("lookup needs a grid: pass --grid or set calibration.grid_json");
    };
    Ok(grid.lookup(target)?)
}
