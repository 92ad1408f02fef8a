//! The drawing capability the renderer works against. Hosts with their
//! own raster stack (GPU canvas, PDF page) implement this trait; the
//! built-in software implementation lives in [`crate::raster`].

use kurbo::{BezPath, Point, Rect};
use redline_core::style::{FontFamily, FontWeight, LineType, Style};
use redline_core::{Composite, PixelBuffer, Rgba};

/// Solid paint with a blend mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Rgba,
    pub composite: Composite,
    pub anti_alias: bool,
}

impl Paint {
    pub fn solid(color: Rgba) -> Self {
        Self {
            color,
            composite: Composite::SourceOver,
            anti_alias: true,
        }
    }

    pub fn with_composite(mut self, composite: Composite) -> Self {
        self.composite = composite;
        self
    }
}

/// Stroke geometry parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeParams {
    pub width: f64,
    /// Dash/gap pairs in pixels; empty means solid.
    pub dash: Vec<f64>,
    /// Round caps and joins (markup strokes want them).
    pub round: bool,
}

impl StrokeParams {
    pub fn solid(width: f64) -> Self {
        Self {
            width,
            dash: Vec::new(),
            round: true,
        }
    }

    /// Derive stroke parameters from a shape style. Cloud outlines are
    /// emitted as solid geometry by the renderer, so they carry no dash.
    pub fn from_style(style: &Style) -> Self {
        let dash = match style.line_type {
            LineType::Solid | LineType::Cloud => Vec::new(),
            LineType::Dashed => vec![8.0, 6.0],
            LineType::Dotted => vec![2.0, 6.0],
        };
        Self {
            width: style.stroke_width,
            dash,
            round: true,
        }
    }
}

/// Font request passed to the host text stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f64,
    pub weight: FontWeight,
    pub italic: bool,
}

impl FontSpec {
    pub fn from_style(style: &Style) -> Self {
        Self {
            family: style.font_family,
            size: style.font_size,
            weight: style.font_weight,
            italic: style.italic,
        }
    }
}

/// A raster target the renderer can draw into.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn clear(&mut self, color: Rgba);

    fn fill_path(&mut self, path: &BezPath, paint: &Paint);
    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, stroke: &StrokeParams);

    /// Draw `text` with its baseline starting at `origin`, rotated by
    /// `angle_rad` around the origin.
    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, paint: &Paint, angle_rad: f64);

    /// Advance width of `text` in pixels.
    fn measure_text(&self, text: &str, font: &FontSpec) -> f64;

    /// Read a region as straight-alpha RGBA. Returns `None` when the
    /// clamped region is empty.
    fn read_pixels(&self, rect: Rect) -> Option<PixelBuffer>;

    /// Write straight-alpha RGBA at (x, y) with replace semantics.
    fn draw_pixels(&mut self, x: i32, y: i32, pixels: &PixelBuffer);

    /// Capture the whole surface in its native byte layout. Only
    /// meaningful for a later [`Surface::restore`] on the same surface.
    fn snapshot(&self) -> PixelBuffer;
    fn restore(&mut self, snapshot: &PixelBuffer);

    /// A fresh transparent surface of the same size and kind, used for
    /// strokes that must blend as a unit.
    fn new_layer(&self) -> Self
    where
        Self: Sized;

    /// Composite `layer` over this surface.
    fn compose(&mut self, layer: &Self, composite: Composite, opacity: f64)
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_params_dash_patterns() {
        let mut style = Style::default();
        assert!(StrokeParams::from_style(&style).dash.is_empty());
        style.line_type = LineType::Dashed;
        assert_eq!(StrokeParams::from_style(&style).dash, vec![8.0, 6.0]);
        style.line_type = LineType::Dotted;
        assert_eq!(StrokeParams::from_style(&style).dash, vec![2.0, 6.0]);
        style.line_type = LineType::Cloud;
        assert!(StrokeParams::from_style(&style).dash.is_empty());
    }
}
