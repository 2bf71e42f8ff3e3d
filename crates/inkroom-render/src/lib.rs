//! inkroom render library
//!
//! Immediate-mode rendering of an inkroom scene onto an abstract 2D surface,
//! plus a recording surface for tests and an SVG surface for export.

mod recording;
mod redraw;
mod renderer;
mod surface;
mod svg;
pub mod text_layout;

pub use recording::{DrawCommand, RecordingSurface};
pub use redraw::RedrawHandle;
pub use renderer::{DEFAULT_GRID_SPACING, GridStyle, RenderContext, RenderResult, Renderer, RendererError, SceneRenderer};
pub use surface::{FontSpec, Surface, approximate_text_width};
pub use svg::SvgSurface;
