//! Image element. The source is an opaque URL or data URI resolved by the surface.

use super::ElementGeometry;
use crate::geometry::Bounds;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub src: String,
}

impl ImageBox {
    pub fn new(rect: Rect, src: impl Into<String>) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            w: rect.width(),
            h: rect.height(),
            src: src.into(),
        }
    }
}

impl ElementGeometry for ImageBox {
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
