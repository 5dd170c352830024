use plotter_core::{CalibrationGrid, CalibrationMiss, JointAngles, MotionError, Point2D};
use rstest::{fixture, rstest};

#[fixture]
fn grid() -> CalibrationGrid {
    CalibrationGrid::from_points(
        5.0,
        [
            (Point2D::new(0.0, 0.0), JointAngles::new(10.0, 10.0)),
            (Point2D::new(5.0, 0.0), JointAngles::new(20.0, 10.0)),
            (Point2D::new(0.0, 5.0), JointAngles::new(10.0, 20.0)),
            (Point2D::new(5.0, 5.0), JointAngles::new(20.0, 20.0)),
        ],
    )
    .unwrap()
}

fn assert_angles(got: JointAngles, alpha: f64, beta: f64) {
    assert!(
        (got.alpha - alpha).abs() < 1e-9 && (got.beta - beta).abs() < 1e-9,
        "got {got:?}, want ({alpha}, {beta})"
    );
}

#[rstest]
#[case(2.5, 2.5, 15.0, 15.0)]
#[case(2.5, 0.0, 15.0, 10.0)]
#[case(0.0, 2.5, 10.0, 15.0)]
#[case(1.0, 4.0, 12.0, 18.0)]
fn interpolates_inside_cell(
    grid: CalibrationGrid,
    #[case] x: f64,
    #[case] y: f64,
    #[case] alpha: f64,
    #[case] beta: f64,
) {
    assert_angles(grid.lookup(Point2D::new(x, y)).unwrap(), alpha, beta);
}

#[rstest]
#[case(0.0, 0.0, 10.0, 10.0)]
#[case(5.0, 0.0, 20.0, 10.0)]
#[case(0.0, 5.0, 10.0, 20.0)]
#[case(5.0, 5.0, 20.0, 20.0)]
fn corners_are_returned_exactly(
    grid: CalibrationGrid,
    #[case] x: f64,
    #[case] y: f64,
    #[case] alpha: f64,
    #[case] beta: f64,
) {
    assert_eq!(
        grid.lookup(Point2D::new(x, y)).unwrap(),
        JointAngles::new(alpha, beta)
    );
}

#[rstest]
#[case(10.0, 10.0)]
#[case(-0.1, 2.0)]
#[case(2.0, 5.1)]
#[case(f64::NAN, 1.0)]
fn outside_calibrated_cells_is_rejected(grid: CalibrationGrid, #[case] x: f64, #[case] y: f64) {
    match grid.lookup(Point2D::new(x, y)) {
        Err(MotionError::OutOfCalibratedRange(CalibrationMiss::GridCell { .. })) => {}
        other => panic!("expected grid miss at ({x}, {y}), got {other:?}"),
    }
}

#[rstest]
fn cell_center_is_mean_of_corners() {
    let corners = [
        (Point2D::new(10.0, 20.0), JointAngles::new(31.0, 97.0)),
        (Point2D::new(15.0, 20.0), JointAngles::new(36.5, 92.0)),
        (Point2D::new(10.0, 25.0), JointAngles::new(29.0, 101.5)),
        (Point2D::new(15.0, 25.0), JointAngles::new(35.0, 95.0)),
    ];
    let grid = CalibrationGrid::from_points(5.0, corners).unwrap();
    let mean_alpha = corners.iter().map(|c| c.1.alpha).sum::<f64>() / 4.0;
    let mean_beta = corners.iter().map(|c| c.1.beta).sum::<f64>() / 4.0;
    assert_angles(
        grid.lookup(Point2D::new(12.5, 22.5)).unwrap(),
        mean_alpha,
        mean_beta,
    );
}

#[rstest]
#[case(0.3, 0.0)]
#[case(0.4, 0.0)]
#[case(0.3, 0.1)]
#[case(0.4, 0.1)]
fn fractional_grid_size_serves_stored_corners(#[case] x: f64, #[case] y: f64) {
    // 0.3 / 0.1 lands just below 3.0 in floating point.
    let grid = CalibrationGrid::from_points(
        0.1,
        [
            (Point2D::new(0.3, 0.0), JointAngles::new(1.0, 2.0)),
            (Point2D::new(0.4, 0.0), JointAngles::new(3.0, 4.0)),
            (Point2D::new(0.3, 0.1), JointAngles::new(5.0, 6.0)),
            (Point2D::new(0.4, 0.1), JointAngles::new(7.0, 8.0)),
        ],
    )
    .unwrap();
    let p = Point2D::new(x, y);
    let stored = grid.get(p).expect("corner is stored");
    assert_eq!(grid.lookup(p).unwrap(), stored);
    assert_angles(grid.lookup(Point2D::new(0.35, 0.05)).unwrap(), 4.0, 5.0);
}

#[rstest]
fn holes_only_affect_incomplete_cells() {
    // 3x2 points; the (10,5) corner is missing so the right-hand cell is incomplete.
    let mut grid = CalibrationGrid::new(5.0).unwrap();
    for (x, y) in [(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (0.0, 5.0), (5.0, 5.0)] {
        grid.insert(Point2D::new(x, y), JointAngles::new(x, y)).unwrap();
    }
    assert!(grid.lookup(Point2D::new(2.0, 2.0)).is_ok());
    assert!(grid.lookup(Point2D::new(7.0, 2.0)).is_err());
    // Shared edge of the complete cell is still served.
    assert_angles(grid.lookup(Point2D::new(5.0, 2.0)).unwrap(), 5.0, 2.0);
}

#[rstest]
fn rejects_non_positive_grid_size() {
    assert!(CalibrationGrid::new(0.0).is_err());
    assert!(CalibrationGrid::new(-5.0).is_err());
    assert!(CalibrationGrid::new(f64::INFINITY).is_err());
}
