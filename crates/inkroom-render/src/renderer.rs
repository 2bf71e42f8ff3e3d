//! Immediate-mode scene renderer.

use crate::surface::{FontSpec, Surface};
use crate::text_layout::wrap_text;
use inkroom_core::elements::{BoxGeometry, Element, ElementKind, ImageBox, Segment, TextBox};
use inkroom_core::{ElementId, Presence, SceneStore};
use kurbo::{Affine, BezPath, Cap, Circle, Join, Point, Rect, Shape, Size, Stroke};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("invalid scale factor {0}")]
    InvalidScale(f64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Spacing of the background grid in world units.
pub const DEFAULT_GRID_SPACING: f64 = 20.0;

const PATH_TOLERANCE: f64 = 0.1;
const ARROW_HEAD_MIN_LENGTH: f64 = 12.0;
const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;
const CURSOR_LABEL_FONT_SIZE: f64 = 12.0;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    /// Plain background.
    None,
    #[default]
    Lines,
    /// Dots at intersections.
    Dots,
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    pub store: &'a SceneStore,
    /// Remote peers to draw cursors for.
    pub peers: &'a [Presence],
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    pub background_color: Color,
    pub grid_style: GridStyle,
    pub grid_spacing: f64,
    pub selection_color: Color,
    /// Text element under the edit overlay; the overlay draws it instead.
    pub editing: Option<ElementId>,
}

impl<'a> RenderContext<'a> {
    pub fn new(store: &'a SceneStore, viewport_size: Size) -> Self {
        Self {
            store,
            peers: &[],
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            grid_style: GridStyle::Lines,
            grid_spacing: DEFAULT_GRID_SPACING,
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            editing: None,
        }
    }

    pub fn with_peers(mut self, peers: &'a [Presence]) -> Self {
        self.peers = peers;
        self
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_grid(mut self, style: GridStyle, spacing: f64) -> Self {
        self.grid_style = style;
        self.grid_spacing = spacing;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    pub fn with_editing(mut self, id: Option<ElementId>) -> Self {
        self.editing = id;
        self
    }

    fn validate(&self) -> RenderResult<()> {
        let Size { width, height } = self.viewport_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RendererError::InvalidViewport { width, height });
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(RendererError::InvalidScale(self.scale_factor));
        }
        Ok(())
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Clear `surface` and draw one complete frame.
    fn render(&mut self, ctx: &RenderContext, surface: &mut dyn Surface) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Draws the scene, selection outline and peer cursors.
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    zoom: f64,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for SceneRenderer {
    fn render(&mut self, ctx: &RenderContext, surface: &mut dyn Surface) -> RenderResult<()> {
        ctx.validate()?;
        let camera = ctx.store.camera();
        self.zoom = camera.z;

        let device = Affine::scale(ctx.scale_factor);
        surface.set_transform(device);
        surface.clear(self.background_color(ctx));

        surface.set_transform(device * camera.transform());
        let visible = camera.visible_world_rect(ctx.viewport_size);
        self.render_grid(surface, ctx.grid_style, visible, ctx.grid_spacing);

        for element in ctx.store.elements() {
            if ctx.editing == Some(element.id()) {
                continue;
            }
            self.render_element(surface, element);
        }

        if let Some(selected) = ctx.store.selected_element() {
            self.render_selection(surface, selected, ctx.selection_color);
        }

        // Cursors stay the same size at every zoom level.
        surface.set_transform(device);
        for peer in ctx.peers {
            if let Some(point) = peer.point {
                self.draw_cursor(surface, camera.world_to_screen(point), peer);
            }
        }
        Ok(())
    }
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self { zoom: 1.0 }
    }

    fn element_stroke(element: &Element) -> Stroke {
        Stroke::new(element.style.thickness)
            .with_caps(Cap::Round)
            .with_join(Join::Round)
    }

    fn render_element(&mut self, surface: &mut dyn Surface, element: &Element) {
        let color = Color::from(element.style.stroke);
        let stroke = Self::element_stroke(element);
        match &element.kind {
            ElementKind::Pen(pen) => {
                if pen.points.len() == 1 {
                    let dot = Circle::new(pen.points[0], element.style.thickness / 2.0);
                    surface.fill(&dot.to_path(PATH_TOLERANCE), color);
                } else {
                    surface.stroke(&pen.to_path(), &stroke, color);
                }
            }
            ElementKind::Line(segment) => {
                surface.stroke(&segment.to_line().to_path(PATH_TOLERANCE), &stroke, color);
            }
            ElementKind::Arrow(segment) => {
                surface.stroke(&segment.to_line().to_path(PATH_TOLERANCE), &stroke, color);
                surface.fill(&arrow_head(segment, element.style.thickness), color);
            }
            ElementKind::Rect(geometry) => {
                let rect = geometry_rect(geometry);
                self.render_closed(surface, element, &rect.to_path(PATH_TOLERANCE), &stroke);
            }
            ElementKind::Ellipse(geometry) => {
                let ellipse = geometry.ellipse();
                self.render_closed(surface, element, &ellipse.to_path(PATH_TOLERANCE), &stroke);
            }
            ElementKind::Diamond(geometry) => {
                self.render_closed(surface, element, &geometry.diamond_path(), &stroke);
            }
            ElementKind::Text(text) => self.render_text(surface, text, color),
            ElementKind::Image(image) => self.render_image(surface, image),
        }
    }

    fn render_closed(&mut self, surface: &mut dyn Surface, element: &Element, path: &BezPath, stroke: &Stroke) {
        if let Some(fill) = element.style.fill {
            surface.fill(path, Color::from(fill));
        }
        surface.stroke(path, stroke, Color::from(element.style.stroke));
    }

    fn render_text(&mut self, surface: &mut dyn Surface, text: &TextBox, color: Color) {
        let font = FontSpec::new(text.font_size).with_style(text.bold, text.italic);
        let max_width = if text.w > 0.0 { text.w } else { f64::INFINITY };
        let lines = wrap_text(&text.text, max_width, |line| surface.measure_text(line, &font));
        let line_height = text.line_height();
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let origin = Point::new(text.x, text.y + i as f64 * line_height);
            surface.fill_text(line, origin, &font, color);
        }
    }

    fn render_image(&mut self, surface: &mut dyn Surface, image: &ImageBox) {
        let rect = Rect::new(image.x, image.y, image.x + image.w, image.y + image.h).abs();
        if surface.draw_image(&image.src, rect) {
            return;
        }
        // Placeholder: grey box with a cross.
        let path = rect.to_path(PATH_TOLERANCE);
        surface.fill(&path, Color::from_rgba8(230, 230, 230, 255));
        let border = Color::from_rgba8(160, 160, 160, 255);
        let stroke = Stroke::new(1.0 / self.zoom);
        surface.stroke(&path, &stroke, border);
        let mut cross = BezPath::new();
        cross.move_to((rect.x0, rect.y0));
        cross.line_to((rect.x1, rect.y1));
        cross.move_to((rect.x1, rect.y0));
        cross.line_to((rect.x0, rect.y1));
        surface.stroke(&cross, &stroke, border);
    }

    /// Dashed outline around the selection, constant on screen at any zoom.
    fn render_selection(&mut self, surface: &mut dyn Surface, element: &Element, color: Color) {
        let padding = 4.0 / self.zoom;
        let rect = element.bounds().normalized().inflate(padding, padding);
        let dash_len = 4.0 / self.zoom;
        let stroke = Stroke::new(1.0 / self.zoom).with_dashes(0.0, [dash_len, dash_len]);
        surface.stroke(&rect.to_path(PATH_TOLERANCE), &stroke, color);
    }

    fn render_grid(&mut self, surface: &mut dyn Surface, style: GridStyle, visible: Rect, spacing: f64) {
        if style == GridStyle::None || spacing.is_nan() || spacing <= 0.0 {
            return;
        }
        let start_x = (visible.x0 / spacing).floor() * spacing;
        let start_y = (visible.y0 / spacing).floor() * spacing;
        let end_x = (visible.x1 / spacing).ceil() * spacing;
        let end_y = (visible.y1 / spacing).ceil() * spacing;

        match style {
            GridStyle::None => {}
            GridStyle::Lines => {
                let grid_color = Color::from_rgba8(200, 200, 200, 100);
                let stroke = Stroke::new(0.5 / self.zoom);
                let mut x = start_x;
                while x <= end_x {
                    let mut path = BezPath::new();
                    path.move_to((x, start_y));
                    path.line_to((x, end_y));
                    surface.stroke(&path, &stroke, grid_color);
                    x += spacing;
                }
                let mut y = start_y;
                while y <= end_y {
                    let mut path = BezPath::new();
                    path.move_to((start_x, y));
                    path.line_to((end_x, y));
                    surface.stroke(&path, &stroke, grid_color);
                    y += spacing;
                }
            }
            GridStyle::Dots => {
                let grid_color = Color::from_rgba8(160, 160, 160, 70);
                let radius = 1.0 / self.zoom;
                let mut path = BezPath::new();
                let mut x = start_x;
                while x <= end_x {
                    let mut y = start_y;
                    while y <= end_y {
                        path.extend(Circle::new((x, y), radius).path_elements(PATH_TOLERANCE));
                        y += spacing;
                    }
                    x += spacing;
                }
                surface.fill(&path, grid_color);
            }
        }
    }

    /// Pointer triangle in the peer's color with a name tag, in screen space.
    fn draw_cursor(&mut self, surface: &mut dyn Surface, screen_pos: Point, peer: &Presence) {
        let color = Color::from(peer.color);
        let mut path = BezPath::new();
        path.move_to(screen_pos);
        path.line_to((screen_pos.x, screen_pos.y + 18.0));
        path.line_to((screen_pos.x + 14.0, screen_pos.y + 14.0));
        path.close_path();
        surface.fill(&path, color);
        surface.stroke(&path, &Stroke::new(1.5), Color::WHITE);

        let font = FontSpec::new(CURSOR_LABEL_FONT_SIZE);
        let width = surface.measure_text(&peer.name, &font);
        let label = Rect::from_origin_size((screen_pos.x + 12.0, screen_pos.y + 18.0), (width + 8.0, 18.0));
        surface.fill(&label.to_rounded_rect(4.0).to_path(PATH_TOLERANCE), color);
        surface.fill_text(&peer.name, Point::new(label.x0 + 4.0, label.y0 + 3.0), &font, Color::WHITE);
    }
}

fn geometry_rect(geometry: &BoxGeometry) -> Rect {
    Rect::new(geometry.x, geometry.y, geometry.x + geometry.w, geometry.y + geometry.h).abs()
}

/// Filled triangle at the end of `segment`, pointing along it.
fn arrow_head(segment: &Segment, thickness: f64) -> BezPath {
    let length = ARROW_HEAD_MIN_LENGTH.max(thickness * 4.0);
    let tip = segment.end();
    let angle = segment.angle();
    let wing = |offset: f64| {
        let a = angle + std::f64::consts::PI + offset;
        Point::new(tip.x + length * a.cos(), tip.y + length * a.sin())
    };
    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(wing(ARROW_HEAD_ANGLE));
    path.line_to(wing(-ARROW_HEAD_ANGLE));
    path.close_path();
    path
}
