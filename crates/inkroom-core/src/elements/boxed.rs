//! Box geometry for rectangles, ellipses and diamonds.

use super::ElementGeometry;
use crate::geometry::Bounds;
use kurbo::{BezPath, Ellipse, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Origin plus signed extent. The extent is negative while dragging up/left.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoxGeometry {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn at(origin: Point) -> Self {
        Self::new(origin.x, origin.y, 0.0, 0.0)
    }

    /// Sets the extent so the far corner lands on `corner`.
    pub fn stretch_to(&mut self, corner: Point) {
        self.w = corner.x - self.x;
        self.h = corner.y - self.y;
    }

    /// Ellipse inscribed in the box.
    pub fn ellipse(&self) -> Ellipse {
        Ellipse::from_rect(self.bounds().normalized())
    }

    /// Closed path through the midpoints of the four edges.
    pub fn diamond_path(&self) -> BezPath {
        let r = self.bounds().normalized();
        let c = r.center();
        let mut path = BezPath::new();
        path.move_to(Point::new(c.x, r.y0));
        path.line_to(Point::new(r.x1, c.y));
        path.line_to(Point::new(c.x, r.y1));
        path.line_to(Point::new(r.x0, c.y));
        path.close_path();
        path
    }
}

impl ElementGeometry for BoxGeometry {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.w, self.h)
    }

    fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    #[test]
    fn test_stretch_keeps_origin() {
        let mut b = BoxGeometry::at(Point::new(100.0, 100.0));
        b.stretch_to(Point::new(300.0, 200.0));
        assert_eq!(b, BoxGeometry::new(100.0, 100.0, 200.0, 100.0));

        b.stretch_to(Point::new(50.0, 80.0));
        assert_eq!(b.w, -50.0);
        assert_eq!(b.h, -20.0);
    }

    #[test]
    fn test_diamond_passes_through_edge_midpoints() {
        let b = BoxGeometry::new(0.0, 0.0, 100.0, 50.0);
        let path = b.diamond_path();
        let points: Vec<Point> = path
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            points,
            vec![
                Point::new(50.0, 0.0),
                Point::new(100.0, 25.0),
                Point::new(50.0, 50.0),
                Point::new(0.0, 25.0),
            ]
        );
    }

    #[test]
    fn test_ellipse_inscribed() {
        let b = BoxGeometry::new(10.0, 10.0, -10.0, 40.0);
        let e = b.ellipse();
        assert_eq!(e.center(), Point::new(5.0, 30.0));
        let radii = e.radii();
        assert!((radii.x - 5.0).abs() < 1e-9);
        assert!((radii.y - 20.0).abs() < 1e-9);
    }
}
