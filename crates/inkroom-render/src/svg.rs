//! Standalone SVG output.

use crate::renderer::RendererError;
use crate::surface::{FontSpec, Surface};
use kurbo::{Affine, BezPath, Point, Rect, Size, Stroke};
use peniko::Color;
use std::fmt::Write as _;
use std::path::Path;

/// Builds an SVG document from draw calls.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    size: Size,
    transform: Affine,
    body: String,
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// `#rrggbb` plus opacity in `0..=1`.
fn paint(color: Color) -> (String, f64) {
    let rgba = color.to_rgba8();
    (
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b),
        f64::from(rgba.a) / 255.0,
    )
}

fn matrix(transform: Affine) -> String {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

impl SvgSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            transform: Affine::IDENTITY,
            body: String::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// The complete document.
    pub fn finish(&self) -> String {
        let Size { width, height } = self.size;
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n{}</svg>\n",
            self.body
        )
    }

    pub fn write_to(&self, path: &Path) -> Result<(), RendererError> {
        std::fs::write(path, self.finish())?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, color: Color) {
        self.body.clear();
        let (fill, opacity) = paint(color);
        let _ = writeln!(
            self.body,
            "<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"{fill}\" fill-opacity=\"{opacity}\"/>"
        );
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn stroke(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        let (paint, opacity) = paint(color);
        let dashes = if stroke.dash_pattern.is_empty() {
            String::new()
        } else {
            let pattern: Vec<String> = stroke.dash_pattern.iter().map(|d| d.to_string()).collect();
            format!(" stroke-dasharray=\"{}\"", pattern.join(" "))
        };
        let _ = writeln!(
            self.body,
            "<path d=\"{}\" transform=\"{}\" fill=\"none\" stroke=\"{paint}\" stroke-opacity=\"{opacity}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"{dashes}/>",
            path.to_svg(),
            matrix(self.transform),
            stroke.width,
        );
    }

    fn fill(&mut self, path: &BezPath, color: Color) {
        let (paint, opacity) = paint(color);
        let _ = writeln!(
            self.body,
            "<path d=\"{}\" transform=\"{}\" fill=\"{paint}\" fill-opacity=\"{opacity}\"/>",
            path.to_svg(),
            matrix(self.transform),
        );
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        let (paint, opacity) = paint(color);
        let weight = if font.bold { "bold" } else { "normal" };
        let style = if font.italic { "italic" } else { "normal" };
        let _ = writeln!(
            self.body,
            "<text x=\"{}\" y=\"{}\" transform=\"{}\" font-family=\"sans-serif\" font-size=\"{}\" font-weight=\"{weight}\" font-style=\"{style}\" fill=\"{paint}\" fill-opacity=\"{opacity}\" dominant-baseline=\"hanging\" xml:space=\"preserve\">{}</text>",
            origin.x,
            origin.y,
            matrix(self.transform),
            font.size,
            escape(text),
        );
    }

    fn draw_image(&mut self, src: &str, rect: Rect) -> bool {
        if src.is_empty() {
            return false;
        }
        let _ = writeln!(
            self.body,
            "<image href=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" transform=\"{}\" preserveAspectRatio=\"none\"/>",
            escape(src),
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
            matrix(self.transform),
        );
        true
    }
}
