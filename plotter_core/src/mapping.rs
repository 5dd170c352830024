//! Normalized joystick position to board millimeters.

use crate::config::MappingCfg;
use crate::geometry::Point2D;

/// Maps normalized joystick coordinates onto the paper.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    cfg: MappingCfg,
}

impl CoordinateMapper {
    pub fn new(cfg: MappingCfg) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> &MappingCfg {
        &self.cfg
    }

    /// `x` spans the paper width centered on the anchor axis; `y` runs up from the base offset.
    pub fn map(&self, x: f64, y: f64) -> Point2D {
        let c = &self.cfg;
        Point2D::new(
            x * c.paper_width - c.paper_width / 2.0 + c.x_offset,
            y * c.paper_height + c.y_base_offset + c.y_offset,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_corners_of_letter_paper() {
        let m = CoordinateMapper::new(MappingCfg::default());
        assert_eq!(m.map(0.0, 0.0), Point2D::new(-139.7, 50.0));
        assert_eq!(m.map(1.0, 1.0), Point2D::new(139.7, 265.0));
        assert_eq!(m.map(0.5, 0.0), Point2D::new(0.0, 50.0));
    }

    #[test]
    fn applies_offsets() {
        let m = CoordinateMapper::new(MappingCfg {
            paper_width: 100.0,
            paper_height: 50.0,
            x_offset: 3.0,
            y_offset: -2.0,
            y_base_offset: 10.0,
        });
        assert_eq!(m.map(0.5, 0.5), Point2D::new(3.0, 33.0));
    }
}
