//! Raw element bounds and hit testing.

use crate::elements::Element;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds as stored on elements.
///
/// Width and height may be negative while a box is being dragged out from its
/// origin towards the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Smallest bounds enclosing every point; `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    /// Rect with positive extent.
    pub fn normalized(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h).abs()
    }

    /// Inclusive containment test against the normalized rect.
    pub fn contains(&self, point: Point) -> bool {
        let r = self.normalized();
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }
}

/// Returns the topmost element whose bounds contain `point`.
pub fn hit_test(point: Point, elements: &[Element]) -> Option<&Element> {
    elements.iter().rev().find(|el| el.bounds().contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BoxGeometry, ElementKind, ElementStyle};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(ElementKind::Rect(BoxGeometry::new(x, y, w, h)), ElementStyle::default())
    }

    #[test]
    fn test_normalized_flips_negative_extent() {
        let b = Bounds::new(100.0, 100.0, -50.0, -20.0);
        let r = b.normalized();
        assert_eq!(r, Rect::new(50.0, 80.0, 100.0, 100.0));
    }

    #[test]
    fn test_enclosing() {
        let b = Bounds::enclosing([Point::new(3.0, 8.0), Point::new(-1.0, 2.0), Point::new(5.0, 4.0)]).unwrap();
        assert_eq!(b, Bounds::new(-1.0, 2.0, 6.0, 6.0));
        assert!(Bounds::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(Point::new(0.0, 0.0)));
        assert!(b.contains(Point::new(10.0, 10.0)));
        assert!(!b.contains(Point::new(10.01, 5.0)));
    }

    #[test]
    fn test_hit_test_returns_topmost() {
        let bottom = rect(0.0, 0.0, 100.0, 100.0);
        let top = rect(50.0, 50.0, 100.0, 100.0);
        let top_id = top.id();
        let bottom_id = bottom.id();
        let elements = vec![bottom, top];

        assert_eq!(hit_test(Point::new(75.0, 75.0), &elements).map(Element::id), Some(top_id));
        assert_eq!(hit_test(Point::new(10.0, 10.0), &elements).map(Element::id), Some(bottom_id));
        assert!(hit_test(Point::new(500.0, 500.0), &elements).is_none());
    }

    #[test]
    fn test_hit_test_negative_extent() {
        let elements = vec![rect(100.0, 100.0, -40.0, -40.0)];
        assert!(hit_test(Point::new(70.0, 70.0), &elements).is_some());
    }
}
