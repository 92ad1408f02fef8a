//! Shape renderer: turns the serializable shape model into surface
//! draw calls. Pure and idempotent; malformed shapes are skipped, never
//! panicked on.

use crate::cloud::cloud_path;
use crate::surface::{FontSpec, Paint, StrokeParams, Surface};
use crate::text::wrap_text;
use kurbo::{Affine, BezPath, Ellipse, Point, Rect, RoundedRect, Shape as KurboShape, Vec2};
use redline_core::shapes::{
    CalloutGeom, LeaderGeom, NoteGeom, PathGeom, TextAlign, TextGeom, WatermarkGeom, TAIL_WIDTH,
};
use redline_core::store::GridConfig;
use redline_core::style::RedactMode;
use redline_core::tools::Preview;
use redline_core::{Rgba, Shape, ShapeKind, Style};

/// Selection and preview accent (blue-500).
const ACCENT: Rgba = Rgba::new(59, 130, 246, 255);
const GRID_COLOR: Rgba = Rgba::new(229, 231, 235, 255);
const SOLID_REDACT_COLOR: Rgba = Rgba::new(17, 24, 39, 255);
const SHADOW_COLOR: Rgba = Rgba::new(0, 0, 0, 51);
const SHADOW_OFFSET: Vec2 = Vec2::new(3.0, 3.0);
const ARROW_WING_ANGLE: f64 = std::f64::consts::FRAC_PI_6;
const LINE_HEIGHT: f64 = 1.2;
const PATH_TOLERANCE: f64 = 0.1;

/// Render shapes in paint order, redact overlays strictly last.
pub fn render_all<S: Surface>(surface: &mut S, shapes: &[&Shape]) {
    let mut sorted: Vec<&Shape> = shapes.to_vec();
    sorted.sort_by_key(|s| (s.is_overlay(), s.layer));
    for shape in sorted {
        render_shape(surface, shape);
    }
}

/// Render one shape. Degenerate geometry is skipped; box kinds whose
/// decorated outline cannot be produced fall back to a plain rectangle.
pub fn render_shape<S: Surface>(surface: &mut S, shape: &Shape) {
    let bounds = shape.bounds();
    if !bounds.x0.is_finite() || !bounds.y0.is_finite() || !bounds.x1.is_finite() || !bounds.y1.is_finite() {
        log::warn!("skipping {} shape {} with non-finite bounds", shape.kind_name(), shape.id);
        return;
    }
    let style = &shape.style;
    match &shape.kind {
        ShapeKind::Rectangle(g) => render_box(surface, g.rect, style, false),
        ShapeKind::Ellipse(g) => render_box(surface, g.rect, style, true),
        ShapeKind::Line(g) => {
            if g.length() > f64::EPSILON {
                render_stroked(surface, &segment_path(g.start, g.end), style);
            }
        }
        ShapeKind::Arrow(g) => {
            if g.length() > f64::EPSILON {
                render_stroked(surface, &segment_path(g.start, g.end), style);
                render_arrowhead(surface, g.end, g.angle(), style);
            }
        }
        ShapeKind::Freehand(g) => {
            if g.points.len() >= 2 {
                render_stroked(surface, &smoothed_path(&g.points), style);
            }
        }
        ShapeKind::Highlighter(g) => {
            if g.points.len() >= 2 {
                render_highlight(surface, &smoothed_path(&g.points), style);
            }
        }
        ShapeKind::Polyline(g) => render_polyline(surface, g, style),
        ShapeKind::SpeechCallout(g) => render_speech_callout(surface, g, style),
        ShapeKind::LeaderCallout(g) => render_leader_callout(surface, g, style),
        ShapeKind::TextBlock(g) => render_text_block(surface, g, style),
        ShapeKind::StickyNote(g) => render_sticky_note(surface, g, style),
        ShapeKind::Watermark(g) => render_watermark(surface, g, style),
        ShapeKind::RegionSnapshot(g) => {
            if !g.pixels.is_empty() {
                surface.draw_pixels(g.rect.x0.round() as i32, g.rect.y0.round() as i32, &g.pixels);
            }
        }
        ShapeKind::Redact(g) => apply_redact(surface, g.rect, style),
    }
}

/// Dashed bounds plus corner handles around every selected shape.
/// Post-pass only; never mutates shape data.
pub fn render_selection<S: Surface>(surface: &mut S, shapes: &[&Shape]) {
    let accent = Paint::solid(ACCENT);
    let stroke = StrokeParams {
        width: 1.0,
        dash: vec![4.0, 4.0],
        round: false,
    };
    for shape in shapes {
        let bounds = shape.bounds().inflate(3.0, 3.0);
        surface.stroke_path(&bounds.to_path(PATH_TOLERANCE), &accent, &stroke);
        for corner in [
            Point::new(bounds.x0, bounds.y0),
            Point::new(bounds.x1, bounds.y0),
            Point::new(bounds.x1, bounds.y1),
            Point::new(bounds.x0, bounds.y1),
        ] {
            let handle = Rect::from_center_size(corner, kurbo::Size::new(6.0, 6.0));
            surface.fill_path(&handle.to_path(PATH_TOLERANCE), &Paint::solid(Rgba::white()));
            surface.stroke_path(
                &handle.to_path(PATH_TOLERANCE),
                &accent,
                &StrokeParams::solid(1.0),
            );
        }
    }
}

/// Background grid lines.
pub fn render_grid<S: Surface>(surface: &mut S, grid: &GridConfig) {
    if !grid.show || grid.size <= 0.0 {
        return;
    }
    let (w, h) = (surface.width() as f64, surface.height() as f64);
    let paint = Paint::solid(GRID_COLOR);
    let stroke = StrokeParams {
        width: 1.0,
        dash: Vec::new(),
        round: false,
    };
    let mut path = BezPath::new();
    let mut x = grid.size;
    while x < w {
        path.move_to(Point::new(x, 0.0));
        path.line_to(Point::new(x, h));
        x += grid.size;
    }
    let mut y = grid.size;
    while y < h {
        path.move_to(Point::new(0.0, y));
        path.line_to(Point::new(w, y));
        y += grid.size;
    }
    surface.stroke_path(&path, &paint, &stroke);
}

/// Paint an in-progress gesture on top of the restored scene.
pub fn render_preview<S: Surface>(surface: &mut S, preview: &Preview) {
    for shape in &preview.shapes {
        render_shape(surface, shape);
    }
    if let Some(rect) = preview.marquee {
        surface.stroke_path(
            &rect.to_path(PATH_TOLERANCE),
            &Paint::solid(ACCENT),
            &StrokeParams {
                width: 1.0,
                dash: vec![6.0, 4.0],
                round: false,
            },
        );
    }
    for marker in &preview.markers {
        let dot = kurbo::Circle::new(*marker, 3.0).to_path(PATH_TOLERANCE);
        surface.fill_path(&dot, &Paint::solid(Rgba::white()));
        surface.stroke_path(&dot, &Paint::solid(ACCENT), &StrokeParams::solid(1.0));
    }
}

fn render_box<S: Surface>(surface: &mut S, rect: Rect, style: &Style, ellipse: bool) {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        log::trace!("skipping zero-size box");
        return;
    }
    let path = if ellipse {
        Ellipse::from_rect(rect).to_path(PATH_TOLERANCE)
    } else if style.line_type == redline_core::LineType::Cloud {
        let corners = vec![
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        match cloud_path(&corners, style.cloud_spacing(), style.cloud_sweep_deg) {
            Some(path) => path,
            // Too small for scallops: plain outline fallback.
            None => box_path(rect, style.corner_radius),
        }
    } else {
        box_path(rect, style.corner_radius)
    };
    if let Some(fill) = style.fill_with_opacity() {
        surface.fill_path(&path, &Paint::solid(fill).with_composite(style.composite));
    }
    render_stroked(surface, &path, style);
}

fn box_path(rect: Rect, corner_radius: f64) -> BezPath {
    if corner_radius > 0.0 {
        RoundedRect::from_rect(rect, corner_radius).to_path(PATH_TOLERANCE)
    } else {
        rect.to_path(PATH_TOLERANCE)
    }
}

fn render_stroked<S: Surface>(surface: &mut S, path: &BezPath, style: &Style) {
    let paint = Paint::solid(style.stroke_with_opacity()).with_composite(style.composite);
    surface.stroke_path(path, &paint, &StrokeParams::from_style(style));
}

/// Highlighter strokes blend as a unit: the stroke is painted opaque
/// into a transparent layer and the layer is composed once, so a
/// self-crossing stroke does not darken itself.
fn render_highlight<S: Surface>(surface: &mut S, path: &BezPath, style: &Style) {
    let mut layer = surface.new_layer();
    layer.stroke_path(
        path,
        &Paint::solid(style.stroke),
        &StrokeParams::from_style(style),
    );
    surface.compose(&layer, style.composite, style.opacity);
}

fn render_polyline<S: Surface>(surface: &mut S, geom: &PathGeom, style: &Style) {
    if geom.points.len() < 2 {
        return;
    }
    if geom.closed && style.line_type == redline_core::LineType::Cloud {
        if let Some(path) = cloud_path(&geom.points, style.cloud_spacing(), style.cloud_sweep_deg) {
            if let Some(fill) = style.fill_with_opacity() {
                surface.fill_path(&path, &Paint::solid(fill));
            }
            render_stroked(surface, &path, style);
            return;
        }
    }
    let mut path = BezPath::new();
    path.move_to(geom.points[0]);
    for p in &geom.points[1..] {
        path.line_to(*p);
    }
    if geom.closed {
        path.close_path();
        if let Some(fill) = style.fill_with_opacity() {
            surface.fill_path(&path, &Paint::solid(fill));
        }
    }
    render_stroked(surface, &path, style);
}

fn render_arrowhead<S: Surface>(surface: &mut S, tip: Point, angle: f64, style: &Style) {
    let mut path = BezPath::new();
    for offset in [ARROW_WING_ANGLE, -ARROW_WING_ANGLE] {
        let back = angle + std::f64::consts::PI + offset;
        path.move_to(tip);
        path.line_to(Point::new(
            tip.x + style.head_size * back.cos(),
            tip.y + style.head_size * back.sin(),
        ));
    }
    let paint = Paint::solid(style.stroke_with_opacity()).with_composite(style.composite);
    // Arrowheads stay solid even on dashed shafts.
    surface.stroke_path(&path, &paint, &StrokeParams::solid(style.stroke_width));
}

fn render_speech_callout<S: Surface>(surface: &mut S, geom: &CalloutGeom, style: &Style) {
    if geom.rect.width() <= 0.0 || geom.rect.height() <= 0.0 {
        return;
    }
    let mut path = box_path(geom.rect, style.corner_radius);
    let base = geom.tail_base();
    let tip = geom.tail_tip();
    path.move_to(base);
    path.line_to(tip);
    path.line_to(Point::new(base.x + TAIL_WIDTH / 2.0, base.y));
    path.close_path();
    if let Some(fill) = style.fill_with_opacity() {
        surface.fill_path(&path, &Paint::solid(fill));
    }
    render_stroked(surface, &path, style);
    render_wrapped_text(surface, &geom.text, geom.rect, style, TextAlign::Left, true);
}

fn render_leader_callout<S: Surface>(surface: &mut S, geom: &LeaderGeom, style: &Style) {
    if geom.rect.width() <= 0.0 || geom.rect.height() <= 0.0 {
        return;
    }
    let leader = geom.leader_points();
    let mut path = BezPath::new();
    path.move_to(leader[2]);
    path.line_to(leader[1]);
    path.line_to(leader[0]);
    render_stroked(surface, &path, style);
    // Arrowhead points from the elbow into the anchor tip.
    let toward_tip = (geom.tip.y - leader[1].y).atan2(geom.tip.x - leader[1].x);
    render_arrowhead(surface, geom.tip, toward_tip, style);

    let body = box_path(geom.rect, style.corner_radius);
    if let Some(fill) = style.fill_with_opacity() {
        surface.fill_path(&body, &Paint::solid(fill));
    }
    render_stroked(surface, &body, style);
    render_wrapped_text(surface, &geom.text, geom.rect, style, TextAlign::Left, true);
}

fn render_text_block<S: Surface>(surface: &mut S, geom: &TextGeom, style: &Style) {
    if geom.text.is_empty() {
        return;
    }
    let font = FontSpec::from_style(style);
    let paint = Paint::solid(style.text_color.with_opacity(style.opacity));
    let angle = geom.rotation_deg.to_radians();
    let center = geom.rect.center();
    let max_width = geom.rect.width().max(font.size);
    let lines = wrap_text(&geom.text, max_width, |s| surface.measure_text(s, &font));
    for (i, line) in lines.iter().enumerate() {
        let line_width = surface.measure_text(line, &font);
        let x = match geom.align {
            TextAlign::Left => geom.rect.x0,
            TextAlign::Center => geom.rect.x0 + (geom.rect.width() - line_width) / 2.0,
            TextAlign::Right => geom.rect.x1 - line_width,
        };
        let baseline = geom.rect.y0 + font.size * LINE_HEIGHT * (i as f64 + 1.0);
        let origin = rotate_about(Point::new(x, baseline), center, angle);
        surface.fill_text(line, origin, &font, &paint, angle);
        if style.underline && !line.is_empty() {
            let mut underline = BezPath::new();
            underline.move_to(Point::new(x, baseline + 2.0));
            underline.line_to(Point::new(x + line_width, baseline + 2.0));
            underline.apply_affine(rotation_about(center, angle));
            surface.stroke_path(&underline, &paint, &StrokeParams::solid(1.0));
        }
    }
}

fn render_sticky_note<S: Surface>(surface: &mut S, geom: &NoteGeom, style: &Style) {
    if geom.rect.width() <= 0.0 || geom.rect.height() <= 0.0 {
        return;
    }
    if geom.shadow {
        let shadow_rect = geom.rect + SHADOW_OFFSET;
        surface.fill_path(
            &box_path(shadow_rect, style.corner_radius),
            &Paint::solid(SHADOW_COLOR),
        );
    }
    let fill = style
        .fill_with_opacity()
        .unwrap_or_else(|| Rgba::from_hex("#FFF9B1"));
    surface.fill_path(&box_path(geom.rect, style.corner_radius), &Paint::solid(fill));
    render_wrapped_text(surface, &geom.text, geom.rect, style, TextAlign::Left, true);
}

fn render_watermark<S: Surface>(surface: &mut S, geom: &WatermarkGeom, style: &Style) {
    if geom.text.is_empty() {
        return;
    }
    let font = FontSpec::from_style(style);
    let paint = Paint::solid(style.text_color.with_opacity(style.opacity));
    let angle = geom.rotation_deg.to_radians();
    if !geom.tiled {
        surface.fill_text(&geom.text, geom.origin, &font, &paint, angle);
        return;
    }
    let text_width = surface.measure_text(&geom.text, &font).max(font.size);
    let spacing = (font.size * geom.spacing_factor).max(font.size);
    let step_x = text_width + spacing;
    let step_y = spacing;
    // A zero or non-finite font size collapses the tile step and the
    // loops below would never advance.
    if !step_x.is_finite() || !step_y.is_finite() || step_x <= 0.0 || step_y <= 0.0 {
        log::warn!("watermark: degenerate tile step {step_x}x{step_y}, skipping");
        return;
    }
    // Overscan so rotated rows still cover the corners.
    let extent = (surface.width().max(surface.height()) as f64) * 1.5;
    let mut row = 0i32;
    let mut y = -extent;
    while y < extent * 2.0 {
        let offset = if row % 2 == 0 { 0.0 } else { step_x / 2.0 };
        let mut x = -extent + offset;
        while x < extent * 2.0 {
            surface.fill_text(&geom.text, Point::new(x, y), &font, &paint, angle);
            x += step_x;
        }
        y += step_y;
        row += 1;
    }
}

/// Wrapped text inside a padded box, optionally clipped to the box
/// bottom (sticky notes and callouts keep overflow invisible).
fn render_wrapped_text<S: Surface>(
    surface: &mut S,
    text: &str,
    rect: Rect,
    style: &Style,
    align: TextAlign,
    clip_bottom: bool,
) {
    if text.is_empty() {
        return;
    }
    let font = FontSpec::from_style(style);
    let paint = Paint::solid(style.text_color.with_opacity(style.opacity));
    let inner = rect.inflate(-style.padding, -style.padding);
    if inner.width() <= 0.0 {
        return;
    }
    let lines = wrap_text(text, inner.width(), |s| surface.measure_text(s, &font));
    for (i, line) in lines.iter().enumerate() {
        let baseline = inner.y0 + font.size * LINE_HEIGHT * (i as f64 + 1.0);
        if clip_bottom && baseline > inner.y1 + font.size * (LINE_HEIGHT - 1.0) {
            break;
        }
        let line_width = surface.measure_text(line, &font);
        let x = match align {
            TextAlign::Left => inner.x0,
            TextAlign::Center => inner.x0 + (inner.width() - line_width) / 2.0,
            TextAlign::Right => inner.x1 - line_width,
        };
        surface.fill_text(line, Point::new(x, baseline), &font, &paint, 0.0);
    }
}

/// Obscure the pixels under `rect` according to the redact mode.
fn apply_redact<S: Surface>(surface: &mut S, rect: Rect, style: &Style) {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }
    match style.redact_mode {
        RedactMode::Solid => {
            surface.fill_path(
                &box_path(rect, style.corner_radius),
                &Paint::solid(SOLID_REDACT_COLOR),
            );
        }
        RedactMode::Pixelate => {
            let Some(mut pixels) = surface.read_pixels(rect) else {
                return;
            };
            pixelate(&mut pixels, style.pixel_size.max(1));
            surface.draw_pixels(rect.x0.floor().max(0.0) as i32, rect.y0.floor().max(0.0) as i32, &pixels);
        }
        RedactMode::Blur => {
            let Some(mut pixels) = surface.read_pixels(rect) else {
                return;
            };
            box_blur(&mut pixels, style.blur_radius.max(1));
            surface.draw_pixels(rect.x0.floor().max(0.0) as i32, rect.y0.floor().max(0.0) as i32, &pixels);
        }
    }
}

/// Replace each `block`-sized cell with its average color.
fn pixelate(pixels: &mut redline_core::PixelBuffer, block: u32) {
    let (w, h) = (pixels.width as usize, pixels.height as usize);
    let block = block as usize;
    let mut by = 0;
    while by < h {
        let mut bx = 0;
        let bh = block.min(h - by);
        while bx < w {
            let bw = block.min(w - bx);
            let mut sums = [0u64; 4];
            for y in by..by + bh {
                for x in bx..bx + bw {
                    let i = (y * w + x) * 4;
                    for c in 0..4 {
                        sums[c] += pixels.rgba[i + c] as u64;
                    }
                }
            }
            let count = (bw * bh) as u64;
            let avg = [
                (sums[0] / count) as u8,
                (sums[1] / count) as u8,
                (sums[2] / count) as u8,
                (sums[3] / count) as u8,
            ];
            for y in by..by + bh {
                for x in bx..bx + bw {
                    let i = (y * w + x) * 4;
                    pixels.rgba[i..i + 4].copy_from_slice(&avg);
                }
            }
            bx += block;
        }
        by += block;
    }
}

/// Separable box blur, one horizontal and one vertical pass.
fn box_blur(pixels: &mut redline_core::PixelBuffer, radius: u32) {
    let (w, h) = (pixels.width as i64, pixels.height as i64);
    let r = radius as i64;
    let mut pass = |horizontal: bool, data: &mut Vec<u8>| {
        let source = data.clone();
        let (outer, inner) = if horizontal { (h, w) } else { (w, h) };
        for o in 0..outer {
            for i in 0..inner {
                let mut sums = [0u64; 4];
                let mut count = 0u64;
                for d in -r..=r {
                    let j = i + d;
                    if j < 0 || j >= inner {
                        continue;
                    }
                    let (x, y) = if horizontal { (j, o) } else { (o, j) };
                    let idx = ((y * w + x) * 4) as usize;
                    for c in 0..4 {
                        sums[c] += source[idx + c] as u64;
                    }
                    count += 1;
                }
                let (x, y) = if horizontal { (i, o) } else { (o, i) };
                let idx = ((y * w + x) * 4) as usize;
                for c in 0..4 {
                    data[idx + c] = (sums[c] / count) as u8;
                }
            }
        }
    };
    pass(true, &mut pixels.rgba);
    pass(false, &mut pixels.rgba);
}

fn rotation_about(center: Point, angle: f64) -> Affine {
    Affine::translate(center.to_vec2()) * Affine::rotate(angle) * Affine::translate(-center.to_vec2())
}

fn rotate_about(point: Point, center: Point, angle: f64) -> Point {
    rotation_about(center, angle) * point
}

fn segment_path(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

/// Midpoint quadratic smoothing for freehand strokes.
fn smoothed_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(points[0]);
    if points.len() == 2 {
        path.line_to(points[1]);
        return path;
    }
    for i in 1..points.len() - 1 {
        let mid = points[i].midpoint(points[i + 1]);
        path.quad_to(points[i], mid);
    }
    path.line_to(points[points.len() - 1]);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterSurface;
    use redline_core::shapes::{BoxGeom, RegionGeom, SegmentGeom};
    use redline_core::style::Style;

    fn surface() -> RasterSurface {
        let mut s = RasterSurface::new(128, 128).unwrap();
        s.clear(Rgba::white());
        s
    }

    fn filled_rect(rect: Rect, color: Rgba) -> Shape {
        let mut shape = Shape::new(ShapeKind::Rectangle(BoxGeom::new(rect)), Style::default());
        shape.style.fill_enabled = true;
        shape.style.fill = color;
        shape
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut s = surface();
        let shapes = vec![
            filled_rect(Rect::new(10.0, 10.0, 60.0, 60.0), Rgba::opaque(255, 0, 0)),
            Shape::new(
                ShapeKind::Arrow(SegmentGeom::new(Point::new(5.0, 100.0), Point::new(90.0, 80.0))),
                Style::default(),
            ),
        ];
        let refs: Vec<&Shape> = shapes.iter().collect();
        s.clear(Rgba::white());
        render_all(&mut s, &refs);
        let first = s.snapshot();
        s.clear(Rgba::white());
        render_all(&mut s, &refs);
        assert_eq!(s.snapshot().rgba, first.rgba);
    }

    #[test]
    fn test_redact_renders_after_higher_layers() {
        let mut s = surface();
        let mut redact = Shape::new(
            ShapeKind::Redact(RegionGeom::new(Rect::new(20.0, 20.0, 60.0, 60.0))),
            Style::default(),
        );
        redact.style.redact_mode = RedactMode::Solid;
        redact.layer = 0;
        let mut rect = filled_rect(Rect::new(20.0, 20.0, 60.0, 60.0), Rgba::opaque(255, 0, 0));
        rect.layer = 1;
        // Raw layers say the rect is on top; the overlay tier wins.
        let shapes = [&rect, &redact];
        render_all(&mut s, &shapes);
        assert_eq!(s.pixel(40, 40), Some(SOLID_REDACT_COLOR));
    }

    #[test]
    fn test_pixelate_averages_blocks() {
        let mut pixels = redline_core::PixelBuffer::new(
            2,
            1,
            vec![0, 0, 0, 255, 200, 200, 200, 255],
        )
        .unwrap();
        pixelate(&mut pixels, 2);
        assert_eq!(&pixels.rgba[0..4], &[100, 100, 100, 255]);
        assert_eq!(&pixels.rgba[4..8], &[100, 100, 100, 255]);
    }

    #[test]
    fn test_blur_softens_edges() {
        let mut s = surface();
        s.clear(Rgba::black());
        let white = filled_rect(Rect::new(0.0, 0.0, 64.0, 128.0), Rgba::white());
        render_shape(&mut s, &white);
        let mut redact = Shape::new(
            ShapeKind::Redact(RegionGeom::new(Rect::new(32.0, 32.0, 96.0, 96.0))),
            Style::default(),
        );
        redact.style.redact_mode = RedactMode::Blur;
        render_shape(&mut s, &redact);
        // The edge at x=64 is now a gradient.
        let edge = s.pixel(64, 64).unwrap();
        assert!(edge.r > 10 && edge.r < 245);
    }

    #[test]
    fn test_zero_font_watermark_terminates() {
        let mut s = surface();
        let before = s.snapshot();
        let mut shape = Shape::new(
            ShapeKind::Watermark(redline_core::shapes::WatermarkGeom::new(
                Point::new(40.0, 40.0),
                "DRAFT",
                -30.0,
                6.0,
            )),
            Style::default(),
        );
        shape.style.font_size = 0.0;
        render_shape(&mut s, &shape);
        assert_eq!(s.snapshot().rgba, before.rgba);
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut s = surface();
        let before = s.snapshot();
        let zero = Shape::new(
            ShapeKind::Rectangle(BoxGeom::new(Rect::new(10.0, 10.0, 10.0, 10.0))),
            Style::default(),
        );
        let nan = Shape::new(
            ShapeKind::Line(SegmentGeom::new(
                Point::new(f64::NAN, 0.0),
                Point::new(10.0, 10.0),
            )),
            Style::default(),
        );
        render_shape(&mut s, &zero);
        render_shape(&mut s, &nan);
        assert_eq!(s.snapshot().rgba, before.rgba);
    }

    #[test]
    fn test_cloud_outline_paints_outside_rect() {
        let mut s = surface();
        let mut shape = Shape::new(
            ShapeKind::Rectangle(BoxGeom::new(Rect::new(30.0, 30.0, 100.0, 90.0))),
            Style::default(),
        );
        shape.style.line_type = redline_core::LineType::Cloud;
        render_shape(&mut s, &shape);
        // Some ink lands above the nominal top edge.
        let mut found = false;
        for x in 30..100 {
            if s.pixel(x, 25) != Some(Rgba::white()) {
                found = true;
                break;
            }
        }
        assert!(found);
    }

    #[test]
    fn test_selection_overlay_does_not_touch_shape() {
        let mut s = surface();
        let shape = filled_rect(Rect::new(40.0, 40.0, 80.0, 80.0), Rgba::opaque(0, 128, 0));
        render_shape(&mut s, &shape);
        let inner_before = s.pixel(60, 60);
        render_selection(&mut s, &[&shape]);
        assert_eq!(s.pixel(60, 60), inner_before);
    }

    #[test]
    fn test_highlighter_multiply_keeps_underlying_dark() {
        let mut s = surface();
        let dark = filled_rect(Rect::new(0.0, 0.0, 128.0, 128.0), Rgba::opaque(40, 40, 40));
        render_shape(&mut s, &dark);
        let mut marker = Shape::new(
            ShapeKind::Highlighter(PathGeom::open(vec![
                Point::new(10.0, 64.0),
                Point::new(118.0, 64.0),
            ])),
            Style::default(),
        );
        marker.style.stroke = Rgba::opaque(255, 235, 59);
        marker.style.stroke_width = 12.0;
        marker.style.opacity = 0.25;
        marker.style.composite = redline_core::Composite::Multiply;
        render_shape(&mut s, &marker);
        let under = s.pixel(64, 64).unwrap();
        // Multiply never lightens.
        assert!(under.r <= 40 && under.g <= 40 && under.b <= 40);
    }
}
