//! The 2D drawing target the renderer paints on.

use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use peniko::Color;

/// Font selection for text drawing and measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn with_style(mut self, bold: bool, italic: bool) -> Self {
        self.bold = bold;
        self.italic = italic;
        self
    }
}

/// Average advance of a sans-serif glyph relative to the font size.
const AVERAGE_GLYPH_WIDTH: f64 = 0.55;
const BOLD_GLYPH_WIDTH: f64 = 0.6;

/// Width estimate for surfaces without a font engine.
pub fn approximate_text_width(text: &str, font: &FontSpec) -> f64 {
    let factor = if font.bold { BOLD_GLYPH_WIDTH } else { AVERAGE_GLYPH_WIDTH };
    text.chars().count() as f64 * font.size * factor
}

/// Immediate-mode 2D surface.
///
/// Coordinates passed to drawing calls are mapped through the current
/// transform. `fill_text` places the top-left corner of the line box at `origin`.
pub trait Surface {
    fn clear(&mut self, color: Color);

    fn set_transform(&mut self, transform: Affine);

    fn stroke(&mut self, path: &BezPath, stroke: &Stroke, color: Color);

    fn fill(&mut self, path: &BezPath, color: Color);

    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color);

    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        approximate_text_width(text, font)
    }

    /// Draw the image referenced by `src` into `rect`. Returns false when the
    /// image is not available and a placeholder should be drawn instead.
    fn draw_image(&mut self, src: &str, rect: Rect) -> bool;
}
