//! A surface that records draw calls instead of rasterizing them.

use crate::surface::{FontSpec, Surface};
use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use peniko::Color;
use std::collections::HashSet;

/// One recorded draw call.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear(Color),
    SetTransform(Affine),
    Stroke {
        path: BezPath,
        width: f64,
        dashes: Vec<f64>,
        color: Color,
    },
    Fill {
        path: BezPath,
        color: Color,
    },
    Text {
        text: String,
        origin: Point,
        font: FontSpec,
        color: Color,
    },
    Image {
        src: String,
        rect: Rect,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    images: HashSet<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `src` as a loaded image.
    pub fn with_image(mut self, src: impl Into<String>) -> Self {
        self.images.insert(src.into());
        self
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Text runs in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Strokes with a dash pattern.
    pub fn dashed_strokes(&self) -> Vec<&DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { dashes, .. } if !dashes.is_empty()))
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn stroke(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            width: stroke.width,
            dashes: stroke.dash_pattern.to_vec(),
            color,
        });
    }

    fn fill(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            color,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            font: *font,
            color,
        });
    }

    fn draw_image(&mut self, src: &str, rect: Rect) -> bool {
        if !self.images.contains(src) {
            return false;
        }
        self.commands.push(DrawCommand::Image {
            src: src.to_string(),
            rect,
        });
        true
    }
}
