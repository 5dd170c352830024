#![no_main]
use libfuzzer_sys::fuzz_target;
use plotter_core::conversions::grid_from_file;
use plotter_core::{JointCalibration, Point2D};

fuzz_target!(|data: &[u8]| {
    if let Ok(rows) = plotter_config::parse_linear_calibration_csv(data)
        && let Ok(table) = JointCalibration::try_from(rows.as_slice())
    {
        let _ = table.shoulder.correct(90.0);
    }

    if let Ok(text) = std::str::from_utf8(data)
        && let Ok(file) = plotter_config::parse_grid_json(text)
        && let Ok(grid) = grid_from_file(&file, 5.0)
    {
        for p in file.points.iter().take(8) {
            let _ = grid.lookup(Point2D::new(p.x + 1.0, p.y + 1.0));
        }
    }
});
