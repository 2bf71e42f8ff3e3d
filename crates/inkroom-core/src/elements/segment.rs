//! Two-point geometry shared by lines and arrows.

use super::ElementGeometry;
use crate::geometry::Bounds;
use kurbo::{Line, Point, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            x: start.x,
            y: start.y,
            x2: end.x,
            y2: end.y,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn set_end(&mut self, end: Point) {
        self.x2 = end.x;
        self.y2 = end.y;
    }

    /// Direction of travel from start to end, in radians.
    pub fn angle(&self) -> f64 {
        (self.y2 - self.y).atan2(self.x2 - self.x)
    }

    pub fn to_line(&self) -> Line {
        Line::new(self.start(), self.end())
    }
}

impl ElementGeometry for Segment {
    fn bounds(&self) -> Bounds {
        let min_x = self.x.min(self.x2);
        let min_y = self.y.min(self.y2);
        Bounds::new(min_x, min_y, self.x.max(self.x2) - min_x, self.y.max(self.y2) - min_y)
    }

    fn origin(&self) -> Point {
        self.start()
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        self.x2 += delta.x;
        self.y2 += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_segment_bounds_any_direction() {
        let seg = Segment::new(Point::new(50.0, 10.0), Point::new(10.0, 40.0));
        assert_eq!(seg.bounds(), Bounds::new(10.0, 10.0, 40.0, 30.0));
    }

    #[test]
    fn test_segment_angle() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        assert!((seg.angle() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_segment_translate_moves_both_ends() {
        let mut seg = Segment::new(Point::new(0.0, 0.0), Point::new(5.0, 5.0));
        seg.translate(Vec2::new(20.0, 20.0));
        assert_eq!(seg.start(), Point::new(20.0, 20.0));
        assert_eq!(seg.end(), Point::new(25.0, 25.0));
    }
}
