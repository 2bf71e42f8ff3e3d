//! Freehand pen stroke.

use super::ElementGeometry;
use crate::geometry::Bounds;
use kurbo::{BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};

/// A polyline through every sampled pointer position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pen {
    pub points: Vec<Point>,
}

impl Pen {
    pub fn new(start: Point) -> Self {
        Self { points: vec![start] }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(*first);
            for p in points {
                path.line_to(*p);
            }
        }
        path
    }
}

impl ElementGeometry for Pen {
    fn bounds(&self) -> Bounds {
        match Bounds::enclosing(self.points.iter().copied()) {
            Some(b) => b,
            None => Bounds::default(),
        }
    }

    fn origin(&self) -> Point {
        let b = self.bounds();
        Point::new(b.x, b.y)
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_bounds() {
        let mut pen = Pen::new(Point::new(10.0, 10.0));
        pen.push(Point::new(30.0, 5.0));
        pen.push(Point::new(20.0, 40.0));
        assert_eq!(pen.bounds(), Bounds::new(10.0, 5.0, 20.0, 35.0));
    }

    #[test]
    fn test_pen_translate() {
        let mut pen = Pen::new(Point::new(0.0, 0.0));
        pen.push(Point::new(4.0, 4.0));
        pen.translate(Vec2::new(1.0, 2.0));
        assert_eq!(pen.points, vec![Point::new(1.0, 2.0), Point::new(5.0, 6.0)]);
    }

    #[test]
    fn test_pen_path_segments() {
        let mut pen = Pen::new(Point::ZERO);
        pen.push(Point::new(1.0, 1.0));
        pen.push(Point::new(2.0, 0.0));
        assert_eq!(pen.to_path().elements().len(), 3);
        assert!(Pen::default().to_path().elements().is_empty());
    }
}
