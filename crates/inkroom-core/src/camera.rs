//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom.
pub const MIN_ZOOM: f64 = 0.2;
/// Largest allowed zoom.
pub const MAX_ZOOM: f64 = 4.0;
/// Zoom change per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 0.1;

/// Camera manages the view transform for the canvas.
///
/// `x`/`y` are the translation in screen pixels and `z` the uniform zoom,
/// so `screen = world * z + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, z: 1.0 }
    }
}

impl Camera {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }.clamped()
    }

    /// Same camera with zoom clamped into `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn clamped(self) -> Self {
        let z = if self.z.is_finite() { self.z.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 };
        Self { z, ..self }
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// World-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.z)
    }

    /// Screen-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.z) * Affine::translate(-self.offset())
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.z, (p.y - self.y) / self.z)
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.z + self.x, p.y * self.z + self.y)
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Applies one wheel event. Translation is left untouched.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) {
        if delta_y == 0.0 || delta_y.is_nan() {
            return;
        }
        let factor = 1.0 - delta_y.signum() * WHEEL_ZOOM_STEP;
        self.z = (self.z * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// World-space rect visible through a viewport of the given screen size.
    pub fn visible_world_rect(&self, viewport: Size) -> Rect {
        let min = self.screen_to_world(Point::ZERO);
        let max = self.screen_to_world(Point::new(viewport.width, viewport.height));
        Rect::from_points(min, max)
    }
}
