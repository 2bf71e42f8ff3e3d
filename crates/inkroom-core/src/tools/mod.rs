//! Tool selection and the style applied to new elements.

use crate::elements::{
    BoxGeometry, Element, ElementKind, ElementStyle, Pen, Segment, SerializableColor, TextBox,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Pen,
    Line,
    Arrow,
    Rect,
    Ellipse,
    Diamond,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Select,
        ToolKind::Hand,
        ToolKind::Pen,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Rect,
        ToolKind::Ellipse,
        ToolKind::Diamond,
        ToolKind::Text,
    ];

    /// Tools that drag out a draft element.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            ToolKind::Pen | ToolKind::Line | ToolKind::Arrow | ToolKind::Rect | ToolKind::Ellipse | ToolKind::Diamond
        )
    }

    /// Zero-extent draft for drawing tools, `None` for the rest.
    pub fn draft_element(&self, at: Point, settings: &ToolSettings) -> Option<Element> {
        let kind = match self {
            ToolKind::Pen => ElementKind::Pen(Pen::new(at)),
            ToolKind::Line => ElementKind::Line(Segment::new(at, at)),
            ToolKind::Arrow => ElementKind::Arrow(Segment::new(at, at)),
            ToolKind::Rect => ElementKind::Rect(BoxGeometry::at(at)),
            ToolKind::Ellipse => ElementKind::Ellipse(BoxGeometry::at(at)),
            ToolKind::Diamond => ElementKind::Diamond(BoxGeometry::at(at)),
            ToolKind::Select | ToolKind::Hand | ToolKind::Text => return None,
        };
        Some(Element::new(kind, settings.style()))
    }

    /// Empty text box placed by the text tool.
    pub fn text_element(at: Point, width: f64, settings: &ToolSettings) -> Element {
        Element::new(
            ElementKind::Text(TextBox::new(at, width, settings.font_size)),
            settings.style(),
        )
    }
}

/// Current drawing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub color: SerializableColor,
    pub thickness: f64,
    pub font_size: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        let style = ElementStyle::default();
        Self {
            color: style.stroke,
            thickness: style.thickness,
            font_size: 20.0,
        }
    }
}

impl ToolSettings {
    pub fn style(&self) -> ElementStyle {
        ElementStyle::new(self.color, self.thickness)
    }
}
