//! Software raster surface backed by a tiny-skia pixmap.

use crate::surface::{FontSpec, Paint, StrokeParams, Surface};
use kurbo::{Affine, BezPath, PathEl, Point, Rect};
use redline_core::{Composite, PixelBuffer, Rgba};
use thiserror::Error;
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, PathBuilder, Pixmap, PixmapPaint, Stroke,
    StrokeDash, Transform,
};

/// Fraction of the font size one glyph cell advances.
const GLYPH_ADVANCE: f64 = 0.6;
/// Fraction of the advance the painted glyph block occupies.
const GLYPH_INK: f64 = 0.8;
/// Glyph block height above the baseline, as a fraction of font size.
const GLYPH_ASCENT: f64 = 0.7;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// CPU surface. Text uses a deterministic fixed-advance block-glyph
/// model; hosts with a real text stack provide their own [`Surface`].
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(SurfaceError::InvalidDimensions { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha color of the pixel at (x, y), for tests and hosts
    /// that probe the output.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Rgba::new(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    fn skia_paint(paint: &Paint) -> tiny_skia::Paint<'static> {
        let mut skia = tiny_skia::Paint::default();
        skia.set_color_rgba8(paint.color.r, paint.color.g, paint.color.b, paint.color.a);
        skia.anti_alias = paint.anti_alias;
        skia.blend_mode = blend_mode(paint.composite);
        skia
    }
}

fn blend_mode(composite: Composite) -> BlendMode {
    match composite {
        Composite::SourceOver => BlendMode::SourceOver,
        Composite::Multiply => BlendMode::Multiply,
    }
}

/// Convert a kurbo path to a tiny-skia path. Returns `None` for empty
/// or degenerate input.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear(&mut self, color: Rgba) {
        self.pixmap
            .fill(Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        self.pixmap.fill_path(
            &skia_path,
            &Self::skia_paint(paint),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, stroke: &StrokeParams) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let cap = if stroke.round {
            LineCap::Round
        } else {
            LineCap::Butt
        };
        let join = if stroke.round {
            LineJoin::Round
        } else {
            LineJoin::Miter
        };
        let dash = if stroke.dash.is_empty() {
            None
        } else {
            StrokeDash::new(stroke.dash.iter().map(|d| *d as f32).collect(), 0.0)
        };
        let stroke = Stroke {
            width: stroke.width as f32,
            line_cap: cap,
            line_join: join,
            dash,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &skia_path,
            &Self::skia_paint(paint),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, paint: &Paint, angle_rad: f64) {
        let advance = font.size * GLYPH_ADVANCE;
        let mut blocks = BezPath::new();
        let mut x = 0.0;
        for c in text.chars() {
            if !c.is_whitespace() {
                let block = Rect::new(x, -font.size * GLYPH_ASCENT, x + advance * GLYPH_INK, 0.0);
                blocks.extend(kurbo::Shape::path_elements(&block, 0.1));
            }
            x += advance;
        }
        if blocks.elements().is_empty() {
            return;
        }
        let transform = Affine::translate(origin.to_vec2()) * Affine::rotate(angle_rad);
        blocks.apply_affine(transform);
        self.fill_path(&blocks, paint);
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * font.size * GLYPH_ADVANCE
    }

    fn read_pixels(&self, rect: Rect) -> Option<PixelBuffer> {
        let x0 = rect.x0.floor().max(0.0) as u32;
        let y0 = rect.y0.floor().max(0.0) as u32;
        let x1 = (rect.x1.ceil() as i64).clamp(0, self.width() as i64) as u32;
        let y1 = (rect.y1.ceil() as i64).clamp(0, self.height() as i64) as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let (w, h) = (x1 - x0, y1 - y0);
        let mut rgba = Vec::with_capacity((w * h * 4) as usize);
        for y in y0..y1 {
            for x in x0..x1 {
                let c = self.pixmap.pixel(x, y)?.demultiply();
                rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
            }
        }
        PixelBuffer::new(w, h, rgba)
    }

    fn draw_pixels(&mut self, x: i32, y: i32, pixels: &PixelBuffer) {
        let width = self.width() as i32;
        let height = self.height() as i32;
        let data = self.pixmap.data_mut();
        for row in 0..pixels.height as i32 {
            let dy = y + row;
            if dy < 0 || dy >= height {
                continue;
            }
            for col in 0..pixels.width as i32 {
                let dx = x + col;
                if dx < 0 || dx >= width {
                    continue;
                }
                let src = ((row * pixels.width as i32 + col) * 4) as usize;
                let (r, g, b, a) = (
                    pixels.rgba[src],
                    pixels.rgba[src + 1],
                    pixels.rgba[src + 2],
                    pixels.rgba[src + 3],
                );
                // Premultiply into the pixmap's native layout.
                let mul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
                let dst = ((dy * width + dx) * 4) as usize;
                data[dst] = mul(r);
                data[dst + 1] = mul(g);
                data[dst + 2] = mul(b);
                data[dst + 3] = a;
            }
        }
    }

    fn snapshot(&self) -> PixelBuffer {
        PixelBuffer {
            width: self.width(),
            height: self.height(),
            rgba: self.pixmap.data().to_vec(),
        }
    }

    fn restore(&mut self, snapshot: &PixelBuffer) {
        if snapshot.width != self.width() || snapshot.height != self.height() {
            log::warn!(
                "restore: snapshot {}x{} does not match surface {}x{}",
                snapshot.width,
                snapshot.height,
                self.width(),
                self.height()
            );
            return;
        }
        self.pixmap.data_mut().copy_from_slice(&snapshot.rgba);
    }

    fn new_layer(&self) -> Self {
        match Pixmap::new(self.pixmap.width(), self.pixmap.height()) {
            Some(pixmap) => Self { pixmap },
            None => {
                let mut pixmap = self.pixmap.clone();
                pixmap.fill(Color::TRANSPARENT);
                Self { pixmap }
            }
        }
    }

    fn compose(&mut self, layer: &Self, composite: Composite, opacity: f64) {
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            blend_mode: blend_mode(composite),
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            layer.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::style::Style;

    fn surface() -> RasterSurface {
        let mut s = RasterSurface::new(64, 64).unwrap();
        s.clear(Rgba::white());
        s
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            RasterSurface::new(0, 10),
            Err(SurfaceError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_fill_rect_sets_pixels() {
        let mut s = surface();
        let path = kurbo::Shape::to_path(&Rect::new(10.0, 10.0, 20.0, 20.0), 0.1);
        s.fill_path(&path, &Paint::solid(Rgba::opaque(255, 0, 0)));
        assert_eq!(s.pixel(15, 15), Some(Rgba::opaque(255, 0, 0)));
        assert_eq!(s.pixel(40, 40), Some(Rgba::white()));
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut s = surface();
        let before = s.snapshot();
        let path = kurbo::Shape::to_path(&Rect::new(0.0, 0.0, 64.0, 64.0), 0.1);
        s.fill_path(&path, &Paint::solid(Rgba::opaque(0, 0, 255)));
        assert_ne!(s.pixel(5, 5), Some(Rgba::white()));
        s.restore(&before);
        assert_eq!(s.pixel(5, 5), Some(Rgba::white()));
        assert_eq!(s.snapshot().rgba, before.rgba);
    }

    #[test]
    fn test_read_write_pixels() {
        let mut s = surface();
        let path = kurbo::Shape::to_path(&Rect::new(0.0, 0.0, 8.0, 8.0), 0.1);
        s.fill_path(&path, &Paint::solid(Rgba::opaque(0, 128, 0)));
        let region = s.read_pixels(Rect::new(0.0, 0.0, 8.0, 8.0)).unwrap();
        assert_eq!(region.width, 8);
        s.draw_pixels(30, 30, &region);
        assert_eq!(s.pixel(33, 33), Some(Rgba::opaque(0, 128, 0)));
    }

    #[test]
    fn test_read_pixels_outside_is_none() {
        let s = surface();
        assert!(s.read_pixels(Rect::new(100.0, 100.0, 120.0, 120.0)).is_none());
    }

    #[test]
    fn test_multiply_compose_darkens() {
        let mut s = surface();
        let mut layer = s.new_layer();
        let path = kurbo::Shape::to_path(&Rect::new(0.0, 0.0, 64.0, 64.0), 0.1);
        layer.fill_path(&path, &Paint::solid(Rgba::opaque(255, 235, 59)));
        s.compose(&layer, Composite::Multiply, 1.0);
        // Yellow multiplied over white stays yellow.
        assert_eq!(s.pixel(10, 10), Some(Rgba::opaque(255, 235, 59)));
    }

    #[test]
    fn test_block_glyph_text_metrics() {
        let s = surface();
        let font = FontSpec::from_style(&Style::default());
        assert_eq!(s.measure_text("abcd", &font), 4.0 * 16.0 * GLYPH_ADVANCE);
        assert_eq!(s.measure_text("", &font), 0.0);
    }

    #[test]
    fn test_text_paints_ink_but_not_whitespace() {
        let mut s = surface();
        let font = FontSpec::from_style(&Style::default());
        s.fill_text(
            "a a",
            Point::new(10.0, 30.0),
            &font,
            &Paint::solid(Rgba::black()),
            0.0,
        );
        // First glyph cell painted.
        assert_eq!(s.pixel(12, 25), Some(Rgba::black()));
        // The space cell stays white.
        let space_x = 10.0 + 16.0 * GLYPH_ADVANCE + 16.0 * GLYPH_ADVANCE * 0.5;
        assert_eq!(s.pixel(space_x as u32, 25), Some(Rgba::white()));
    }
}
