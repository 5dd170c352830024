use std::time::Duration;

use plotter_core::kinematics::{forward, solve};
use plotter_core::{
    ArmGeometry, CalibrationGrid, CalibrationMiss, ControllerState, JointAngles,
    JointCalibration, LimiterCfg, LinearCalibration, MappingCfg, MotionController, MotionError,
    Point2D, ServoCfg, SmoothingCfg, TickStatus,
};
use rstest::rstest;

const TICK: Duration = Duration::from_millis(50);

fn geometry(anchor_y: f64) -> ArmGeometry {
    ArmGeometry::new(Point2D::new(0.0, anchor_y), 155.0, 155.0).unwrap()
}

fn unsmoothed() -> SmoothingCfg {
    SmoothingCfg { alpha: 1.0 }
}

fn close(a: Point2D, b: Point2D) -> bool {
    a.distance_to(b) < 1e-9
}

#[rstest]
fn first_tick_seeds_limiter_at_target() {
    let mut c = MotionController::builder()
        .with_geometry(geometry(0.0))
        .with_smoothing(unsmoothed())
        .build()
        .unwrap();

    let status = c.tick((0.5, 0.5), TICK);
    let target = Point2D::new(0.0, 157.5);
    let expected = ServoCfg::default().apply(solve(target, &geometry(0.0)).unwrap());

    assert_eq!(status, TickStatus::Command(expected));
    assert_eq!(c.position(), Some(target));
    assert_eq!(c.last_target(), Some(target));
    assert_eq!(c.last_command(), Some(expected));
    assert_eq!(c.state(), ControllerState::Running);
}

#[rstest]
fn limiter_walks_from_home_in_bounded_steps() {
    let mut c = MotionController::builder()
        .with_geometry(geometry(0.0))
        .with_smoothing(unsmoothed())
        .with_limiter(LimiterCfg {
            max_step_mm: 10.0,
            max_speed_mm_s: None,
            home: Some(Point2D::new(0.0, 150.0)),
        })
        .build()
        .unwrap();

    // (0.5, 150/215) maps to (0, 200): 50 mm away from home.
    let raw = (0.5, 150.0 / 215.0);
    let mut positions = Vec::new();
    for _ in 0..6 {
        assert!(matches!(c.tick(raw, TICK), TickStatus::Command(_)));
        positions.push(c.position().unwrap());
    }
    assert!(close(positions[0], Point2D::new(0.0, 160.0)));
    assert!(close(positions[3], Point2D::new(0.0, 190.0)));
    assert!(close(positions[4], Point2D::new(0.0, 200.0)));
    assert!(close(positions[5], Point2D::new(0.0, 200.0)));
}

#[rstest]
fn rate_scaled_step_uses_elapsed_time() {
    let mut c = MotionController::builder()
        .with_geometry(geometry(0.0))
        .with_smoothing(unsmoothed())
        .with_limiter(LimiterCfg {
            max_step_mm: 200.0,
            max_speed_mm_s: Some(100.0),
            home: Some(Point2D::new(0.0, 150.0)),
        })
        .build()
        .unwrap();

    let raw = (0.5, 150.0 / 215.0);
    c.tick(raw, Duration::from_millis(50));
    assert!(close(c.position().unwrap(), Point2D::new(0.0, 155.0)));
    c.tick(raw, Duration::from_millis(200));
    assert!(close(c.position().unwrap(), Point2D::new(0.0, 175.0)));
}

#[rstest]
fn zero_length_tick_touches_nothing() {
    let mut c = MotionController::builder()
        .with_geometry(geometry(0.0))
        .with_limiter(LimiterCfg {
            max_speed_mm_s: Some(100.0),
            ..LimiterCfg::default()
        })
        .build()
        .unwrap();

    assert_eq!(c.tick((0.2, 0.7), Duration::ZERO), TickStatus::Skipped);
    assert_eq!(c.position(), None);
    assert_eq!(c.last_target(), None);
    assert_eq!(c.last_command(), None);

    // Fixed-step mode skips zero-length ticks too.
    let mut fixed = MotionController::builder()
        .with_geometry(geometry(0.0))
        .build()
        .unwrap();
    assert_eq!(fixed.tick((0.2, 0.7), Duration::ZERO), TickStatus::Skipped);
}

#[rstest]
fn unreachable_target_holds_then_recovers() {
    // Anchor well below the paper: the far corners are out of reach.
    let mut c = MotionController::builder()
        .with_geometry(geometry(-100.0))
        .with_smoothing(unsmoothed())
        .with_limiter(LimiterCfg {
            max_step_mm: 1000.0,
            ..LimiterCfg::default()
        })
        .build()
        .unwrap();

    let first = c.tick((0.5, 0.0), TICK).command().unwrap();

    match c.tick((1.0, 1.0), TICK) {
        TickStatus::Held(MotionError::Unreachable { distance, .. }) => assert!(distance > 310.0),
        other => panic!("expected Unreachable, got {other:?}"),
    }
    assert_eq!(c.state(), ControllerState::Unreachable);
    assert_eq!(c.last_command(), Some(first));

    // Repeated failures stay held.
    assert!(matches!(c.tick((1.0, 1.0), TICK), TickStatus::Held(_)));

    let again = c.tick((0.5, 0.0), TICK).command().unwrap();
    assert_eq!(again, first);
    assert_eq!(c.state(), ControllerState::Running);
}

#[rstest]
fn smoothing_blends_consecutive_readings() {
    let mut c = MotionController::builder()
        .with_geometry(geometry(-100.0))
        .with_smoothing(SmoothingCfg { alpha: 0.5 })
        .build()
        .unwrap();

    c.tick((0.5, 0.0), TICK);
    let before = c.last_target().unwrap();
    c.tick((1.0, 1.0), TICK);
    let during = c.last_target().unwrap();
    // Half way between the two stick positions, not a jump.
    assert!(close(during, Point2D::new(69.85, 157.5)));
    assert!(during.x > before.x);
}

#[rstest]
fn joint_calibration_is_applied_before_servo_offsets() {
    let joints =
        JointCalibration::from_rows(&[(-180.0, -178.0, -180.0), (180.0, 182.0, 180.0)]).unwrap();
    let mut c = MotionController::builder()
        .with_geometry(geometry(0.0))
        .with_smoothing(unsmoothed())
        .with_joint_calibration(Some(joints))
        .build()
        .unwrap();

    let cmd = c.tick((0.5, 0.5), TICK).command().unwrap();
    let raw = solve(Point2D::new(0.0, 157.5), &geometry(0.0)).unwrap();
    let want = ServoCfg::default().apply(JointAngles::new(raw.alpha + 2.0, raw.beta));
    assert!((cmd.alpha - want.alpha).abs() < 1e-9);
    assert!((cmd.beta - want.beta).abs() < 1e-9);
}

#[rstest]
fn joint_calibration_gap_holds_tick() {
    // Elbow table only covers 170..180 degrees.
    let joints = JointCalibration {
        shoulder: LinearCalibration::from_samples([(-180.0, -180.0), (180.0, 180.0)]).unwrap(),
        elbow: LinearCalibration::from_samples([(170.0, 170.0), (180.0, 180.0)]).unwrap(),
    };
    let mut c = MotionController::builder()
        .with_geometry(geometry(0.0))
        .with_smoothing(unsmoothed())
        .with_joint_calibration(Some(joints))
        .build()
        .unwrap();

    match c.tick((0.5, 0.5), TICK) {
        TickStatus::Held(MotionError::OutOfCalibratedRange(CalibrationMiss::Angle {
            min,
            max,
            ..
        })) => assert_eq!((min, max), (170.0, 180.0)),
        other => panic!("expected calibration miss, got {other:?}"),
    }
}

#[rstest]
fn grid_mode_emits_measured_angles_without_offsets() {
    let grid = CalibrationGrid::from_points(
        5.0,
        [
            (Point2D::new(0.0, 0.0), JointAngles::new(10.0, 10.0)),
            (Point2D::new(5.0, 0.0), JointAngles::new(20.0, 10.0)),
            (Point2D::new(0.0, 5.0), JointAngles::new(10.0, 20.0)),
            (Point2D::new(5.0, 5.0), JointAngles::new(20.0, 20.0)),
        ],
    )
    .unwrap();
    let mut c = MotionController::builder()
        .with_grid(grid)
        .with_smoothing(unsmoothed())
        .with_mapping(MappingCfg {
            paper_width: 10.0,
            paper_height: 5.0,
            x_offset: 5.0,
            y_offset: 0.0,
            y_base_offset: 0.0,
        })
        .with_limiter(LimiterCfg {
            max_step_mm: 100.0,
            ..LimiterCfg::default()
        })
        .build()
        .unwrap();

    assert_eq!(c.resolver().name(), "grid");
    assert_eq!(
        c.tick((0.25, 0.5), TICK),
        TickStatus::Command(JointAngles::new(15.0, 15.0))
    );
    assert!(matches!(
        c.tick((1.0, 1.0), TICK),
        TickStatus::Held(MotionError::OutOfCalibratedRange(_))
    ));
}

#[rstest]
fn reset_forgets_position_and_seeds() {
    let mut c = MotionController::builder()
        .with_geometry(geometry(0.0))
        .with_smoothing(SmoothingCfg { alpha: 0.2 })
        .build()
        .unwrap();
    c.tick((0.1, 0.1), TICK);
    c.tick((0.9, 0.9), TICK);
    c.reset();
    assert_eq!(c.position(), None);
    assert_eq!(c.last_command(), None);

    // After reset the next sample seeds the smoother directly.
    c.tick((0.9, 0.9), TICK);
    let target = c.last_target().unwrap();
    assert!(close(target, c.mapper().map(0.9, 0.9)));
}

#[rstest]
fn forward_kinematics_recovers_the_pen_position() {
    let geom = geometry(0.0);
    let mut c = MotionController::builder()
        .with_geometry(geom)
        .with_smoothing(unsmoothed())
        .with_servo(ServoCfg {
            shoulder_offset_deg: 0.0,
            elbow_offset_deg: 0.0,
            elbow_mirror: false,
        })
        .build()
        .unwrap();
    let cmd = c.tick((0.3, 0.6), TICK).command().unwrap();
    let pen = forward(cmd, &geom);
    assert!(pen.distance_to(c.position().unwrap()) < 1e-9);
}
