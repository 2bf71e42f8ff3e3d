//! Text box element.

use super::ElementGeometry;
use crate::geometry::Bounds;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Multiplier from font size to line height.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub text: String,
    pub font_size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl TextBox {
    /// Empty single-line box at `origin`.
    pub fn new(origin: Point, width: f64, font_size: f64) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            w: width,
            h: font_size * LINE_HEIGHT_FACTOR,
            text: String::new(),
            font_size,
            bold: false,
            italic: false,
        }
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    /// Height needed for `text`: one line height per explicit line, at least one.
    pub fn fitted_height(&self, text: &str) -> f64 {
        let lh = self.line_height();
        let lines = text.split('\n').count() as f64;
        lh.max(lines * lh)
    }

    /// Replaces the text and grows or shrinks the box to fit it.
    pub fn set_text(&mut self, text: String) {
        self.h = self.fitted_height(&text);
        self.text = text;
    }
}

impl ElementGeometry for TextBox {
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

    #[test]
    fn test_new_text_box_is_one_line_high() {
        let t = TextBox::new(Point::new(5.0, 5.0), 200.0, 20.0);
        assert!((t.h - 28.0).abs() < 1e-9);
        assert!(t.text.is_empty());
    }

    #[test]
    fn test_set_text_fits_height() {
        let mut t = TextBox::new(Point::ZERO, 200.0, 10.0);
        t.set_text("a\nb\nc".to_string());
        assert!((t.h - 42.0).abs() < 1e-9);
        t.set_text(String::new());
        assert!((t.h - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_font_size_serialized_camel_case() {
        let t = TextBox::new(Point::ZERO, 200.0, 16.0);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["fontSize"], 16.0);
        assert!(json.get("font_size").is_none());
    }
}
