//! Scene elements: the closed set of drawable objects on a canvas.

mod boxed;
mod color;
mod image;
mod pen;
mod segment;
mod text;

pub use boxed::BoxGeometry;
pub use color::{ColorParseError, SerializableColor};
pub use image::ImageBox;
pub use pen::Pen;
pub use segment::Segment;
pub use text::{LINE_HEIGHT_FACTOR, TextBox};

use crate::geometry::Bounds;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Geometry shared by every element variant.
pub trait ElementGeometry {
    /// Raw bounds; box extents keep their sign.
    fn bounds(&self) -> Bounds;

    /// Anchor used when dragging.
    fn origin(&self) -> Point;

    fn translate(&mut self, delta: Vec2);
}

/// Stroke and fill properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub stroke: SerializableColor,
    pub thickness: f64,
    #[serde(default)]
    pub fill: Option<SerializableColor>,
}

impl ElementStyle {
    pub fn new(stroke: SerializableColor, thickness: f64) -> Self {
        Self {
            stroke,
            thickness,
            fill: None,
        }
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self::new(SerializableColor::rgb(0x1e, 0x1e, 0x1e), 2.0)
    }
}

/// Variant-specific geometry, tagged by `"type"` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Pen(Pen),
    Line(Segment),
    Arrow(Segment),
    Rect(BoxGeometry),
    Ellipse(BoxGeometry),
    Diamond(BoxGeometry),
    Text(TextBox),
    Image(ImageBox),
}

impl ElementKind {
    fn geometry(&self) -> &dyn ElementGeometry {
        match self {
            ElementKind::Pen(g) => g,
            ElementKind::Line(g) | ElementKind::Arrow(g) => g,
            ElementKind::Rect(g) | ElementKind::Ellipse(g) | ElementKind::Diamond(g) => g,
            ElementKind::Text(g) => g,
            ElementKind::Image(g) => g,
        }
    }

    fn geometry_mut(&mut self) -> &mut dyn ElementGeometry {
        match self {
            ElementKind::Pen(g) => g,
            ElementKind::Line(g) | ElementKind::Arrow(g) => g,
            ElementKind::Rect(g) | ElementKind::Ellipse(g) | ElementKind::Diamond(g) => g,
            ElementKind::Text(g) => g,
            ElementKind::Image(g) => g,
        }
    }

    /// Serialized variant name.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Pen(_) => "pen",
            ElementKind::Line(_) => "line",
            ElementKind::Arrow(_) => "arrow",
            ElementKind::Rect(_) => "rect",
            ElementKind::Ellipse(_) => "ellipse",
            ElementKind::Diamond(_) => "diamond",
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
        }
    }
}

/// A scene element: identity, style and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    #[serde(flatten)]
    pub style: ElementStyle,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create an element with a fresh id.
    pub fn new(kind: ElementKind, style: ElementStyle) -> Self {
        Self::with_id(Uuid::new_v4(), kind, style)
    }

    /// Rebuild an element with a known id (replica, storage, tests).
    pub fn with_id(id: ElementId, kind: ElementKind, style: ElementStyle) -> Self {
        Self { id, style, kind }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn bounds(&self) -> Bounds {
        self.kind.geometry().bounds()
    }

    pub fn origin(&self) -> Point {
        self.kind.geometry().origin()
    }

    pub fn translate(&mut self, delta: Vec2) {
        if delta != Vec2::ZERO {
            self.kind.geometry_mut().translate(delta);
        }
    }

    /// Moves the element so its origin lands on `origin`.
    pub fn move_to(&mut self, origin: Point) {
        let delta = origin - self.origin();
        self.translate(delta);
    }

    /// Grows a draft while the pointer is dragged from `start` to `current`.
    pub fn extend_draft(&mut self, start: Point, current: Point) {
        match &mut self.kind {
            ElementKind::Pen(pen) => pen.push(current),
            ElementKind::Line(seg) | ElementKind::Arrow(seg) => seg.set_end(current),
            ElementKind::Rect(b) | ElementKind::Ellipse(b) | ElementKind::Diamond(b) => b.stretch_to(current),
            ElementKind::Text(t) => {
                t.w = current.x - start.x;
                t.h = current.y - start.y;
            }
            ElementKind::Image(img) => {
                img.w = current.x - start.x;
                img.h = current.y - start.y;
            }
        }
    }

    pub fn as_text(&self) -> Option<&TextBox> {
        match &self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextBox> {
        match &mut self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_form_is_flat_and_tagged() {
        let id = Uuid::new_v4();
        let el = Element::with_id(
            id,
            ElementKind::Rect(BoxGeometry::new(1.0, 2.0, 3.0, 4.0)),
            ElementStyle::new(SerializableColor::rgb(255, 0, 0), 2.0),
        );
        let value = serde_json::to_value(&el).unwrap();
        assert_eq!(
            value,
            json!({
                "id": id.to_string(),
                "type": "rect",
                "stroke": "#ff0000",
                "thickness": 2.0,
                "fill": null,
                "x": 1.0, "y": 2.0, "w": 3.0, "h": 4.0,
            })
        );
        let back: Element = serde_json::from_value(value).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn test_deserialize_text_with_defaults() {
        let value = json!({
            "id": Uuid::new_v4().to_string(),
            "type": "text",
            "stroke": "#000",
            "thickness": 1.0,
            "x": 0.0, "y": 0.0, "w": 200.0, "h": 28.0,
            "fontSize": 20.0,
        });
        let el: Element = serde_json::from_value(value).unwrap();
        let text = el.as_text().unwrap();
        assert!(text.text.is_empty());
        assert!(!text.bold);
        assert_eq!(el.style.fill, None);
    }

    #[test]
    fn test_pen_points_serialize_as_xy() {
        let el = Element::new(ElementKind::Pen(Pen::new(Point::new(1.0, 2.0))), ElementStyle::default());
        let value = serde_json::to_value(&el).unwrap();
        assert_eq!(value["type"], "pen");
        assert_eq!(value["points"], json!([{ "x": 1.0, "y": 2.0 }]));
    }

    #[test]
    fn test_move_to_uses_origin() {
        let mut el = Element::new(
            ElementKind::Line(Segment::new(Point::new(10.0, 10.0), Point::new(20.0, 30.0))),
            ElementStyle::default(),
        );
        el.move_to(Point::new(0.0, 0.0));
        assert_eq!(el.bounds(), Bounds::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_extend_draft_per_variant() {
        let start = Point::new(100.0, 100.0);
        let end = Point::new(300.0, 200.0);

        let mut rect = Element::new(ElementKind::Rect(BoxGeometry::at(start)), ElementStyle::default());
        rect.extend_draft(start, end);
        assert_eq!(rect.kind, ElementKind::Rect(BoxGeometry::new(100.0, 100.0, 200.0, 100.0)));

        let mut arrow = Element::new(ElementKind::Arrow(Segment::new(start, start)), ElementStyle::default());
        arrow.extend_draft(start, end);
        assert_eq!(arrow.kind, ElementKind::Arrow(Segment::new(start, end)));

        let mut pen = Element::new(ElementKind::Pen(Pen::new(start)), ElementStyle::default());
        pen.extend_draft(start, end);
        pen.extend_draft(start, Point::new(320.0, 210.0));
        match &pen.kind {
            ElementKind::Pen(p) => assert_eq!(p.points.len(), 3),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_type_name_matches_tag() {
        let el = Element::new(ElementKind::Diamond(BoxGeometry::default()), ElementStyle::default());
        let value = serde_json::to_value(&el).unwrap();
        assert_eq!(value["type"], el.kind.type_name());
    }
}
