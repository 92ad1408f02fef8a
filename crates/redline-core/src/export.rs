//! Document exporters: pretty JSON for persistence and a best-effort
//! SVG rendition of the vector kinds.

use crate::shapes::{Shape, ShapeKind};
use crate::style::{LineType, Style};
use kurbo::Point;
use std::fmt::Write;

/// Serialize shapes as pretty JSON.
pub fn to_json(shapes: &[Shape]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(shapes)
}

/// Render the vector kinds as a standalone SVG document. Raster-backed
/// kinds (snapshots, redact regions) and canvas-wide effects are
/// skipped; this exporter targets markup review, not pixel fidelity.
pub fn to_svg(shapes: &[Shape], width: f64, height: f64) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let mut sorted: Vec<&Shape> = shapes.iter().collect();
    sorted.sort_by_key(|s| (s.is_overlay(), s.layer));
    for shape in sorted {
        write_shape(&mut svg, shape);
    }
    svg.push_str("</svg>\n");
    svg
}

fn write_shape(svg: &mut String, shape: &Shape) {
    let style = &shape.style;
    match &shape.kind {
        ShapeKind::Rectangle(g) => {
            let r = g.rect;
            let _ = writeln!(
                svg,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{}" {}/>"#,
                r.x0,
                r.y0,
                r.width(),
                r.height(),
                style.corner_radius,
                paint_attrs(style),
            );
        }
        ShapeKind::Ellipse(g) => {
            let r = g.rect;
            let c = r.center();
            let _ = writeln!(
                svg,
                r#"  <ellipse cx="{}" cy="{}" rx="{}" ry="{}" {}/>"#,
                c.x,
                c.y,
                r.width() / 2.0,
                r.height() / 2.0,
                paint_attrs(style),
            );
        }
        ShapeKind::Line(g) => write_line(svg, g.start, g.end, style),
        ShapeKind::Arrow(g) => {
            write_line(svg, g.start, g.end, style);
            let angle = g.angle();
            for offset in [std::f64::consts::FRAC_PI_6, -std::f64::consts::FRAC_PI_6] {
                let back = angle + std::f64::consts::PI + offset;
                let wing = Point::new(
                    g.end.x + style.head_size * back.cos(),
                    g.end.y + style.head_size * back.sin(),
                );
                write_line(svg, g.end, wing, style);
            }
        }
        ShapeKind::Freehand(g) | ShapeKind::Highlighter(g) | ShapeKind::Polyline(g) => {
            let points: Vec<String> = g
                .points
                .iter()
                .map(|p| format!("{},{}", p.x, p.y))
                .collect();
            let tag = if g.closed { "polygon" } else { "polyline" };
            let _ = writeln!(
                svg,
                r#"  <{tag} points="{}" fill="none" {}/>"#,
                points.join(" "),
                stroke_attrs(style),
            );
        }
        ShapeKind::SpeechCallout(g) => {
            let r = g.rect;
            let _ = writeln!(
                svg,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{}" {}/>"#,
                r.x0,
                r.y0,
                r.width(),
                r.height(),
                style.corner_radius,
                paint_attrs(style),
            );
            let base = g.tail_base();
            let tip = g.tail_tip();
            let _ = writeln!(
                svg,
                r#"  <path d="M {} {} L {} {} L {} {} Z" {}/>"#,
                base.x,
                base.y,
                tip.x,
                tip.y,
                base.x + crate::shapes::TAIL_WIDTH / 2.0,
                base.y,
                paint_attrs(style),
            );
            write_text_lines(svg, &g.text, r.x0 + style.padding, r.y0 + style.padding, style);
        }
        ShapeKind::TextBlock(g) => {
            write_text_lines(svg, &g.text, g.rect.x0, g.rect.y0, style);
        }
        ShapeKind::StickyNote(g) => {
            let r = g.rect;
            let _ = writeln!(
                svg,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" fill-opacity="{}" stroke="none"/>"#,
                r.x0,
                r.y0,
                r.width(),
                r.height(),
                style.corner_radius,
                style.fill.to_hex(),
                style.opacity * style.fill_opacity,
            );
            write_text_lines(svg, &g.text, r.x0 + style.padding, r.y0 + style.padding, style);
        }
        ShapeKind::LeaderCallout(_)
        | ShapeKind::Watermark(_)
        | ShapeKind::RegionSnapshot(_)
        | ShapeKind::Redact(_) => {
            log::debug!("svg export: skipping {} shape {}", shape.kind_name(), shape.id);
        }
    }
}

fn write_line(svg: &mut String, a: Point, b: Point, style: &Style) {
    let _ = writeln!(
        svg,
        r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
        a.x,
        a.y,
        b.x,
        b.y,
        stroke_attrs(style),
    );
}

fn write_text_lines(svg: &mut String, text: &str, x: f64, y: f64, style: &Style) {
    for (i, line) in text.lines().enumerate() {
        let baseline = y + style.font_size * (i + 1) as f64;
        let _ = writeln!(
            svg,
            r#"  <text x="{x}" y="{baseline}" font-size="{}" fill="{}">{}</text>"#,
            style.font_size,
            style.text_color.to_hex(),
            xml_escape(line),
        );
    }
}

fn stroke_attrs(style: &Style) -> String {
    let mut attrs = format!(
        r#"stroke="{}" stroke-width="{}" stroke-opacity="{}""#,
        style.stroke.to_hex(),
        style.stroke_width,
        style.opacity,
    );
    if let Some(dash) = dash_array(style.line_type) {
        let _ = write!(attrs, r#" stroke-dasharray="{dash}""#);
    }
    attrs
}

fn paint_attrs(style: &Style) -> String {
    let fill = if style.fill_enabled {
        format!(
            r#"fill="{}" fill-opacity="{}""#,
            style.fill.to_hex(),
            style.opacity * style.fill_opacity,
        )
    } else {
        r#"fill="none""#.to_owned()
    };
    format!("{fill} {}", stroke_attrs(style))
}

fn dash_array(line_type: LineType) -> Option<&'static str> {
    match line_type {
        LineType::Solid | LineType::Cloud => None,
        LineType::Dashed => Some("8,6"),
        LineType::Dotted => Some("2,6"),
    }
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BoxGeom, CalloutGeom, PathGeom, SegmentGeom};
    use kurbo::Rect;

    fn shapes() -> Vec<Shape> {
        vec![
            Shape::new(
                ShapeKind::Rectangle(BoxGeom::new(Rect::new(10.0, 10.0, 60.0, 40.0))),
                Style::default(),
            ),
            Shape::new(
                ShapeKind::Arrow(SegmentGeom::new(
                    Point::new(0.0, 0.0),
                    Point::new(50.0, 50.0),
                )),
                Style::default(),
            ),
            Shape::new(
                ShapeKind::Freehand(PathGeom::open(vec![
                    Point::new(0.0, 0.0),
                    Point::new(5.0, 8.0),
                ])),
                Style::default(),
            ),
        ]
    }

    #[test]
    fn test_svg_covers_vector_kinds() {
        let svg = to_svg(&shapes(), 200.0, 100.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect"));
        // Arrow: shaft plus two head strokes.
        assert_eq!(svg.matches("<line").count(), 3);
        assert!(svg.contains("<polyline"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_svg_escapes_text() {
        let mut geom = CalloutGeom::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        geom.text = "a < b & c".to_owned();
        let shape = Shape::new(ShapeKind::SpeechCallout(geom), Style::default());
        let svg = to_svg(&[shape], 200.0, 100.0);
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_dashed_stroke_emits_dasharray() {
        let mut style = Style::default();
        style.line_type = LineType::Dashed;
        let shape = Shape::new(
            ShapeKind::Line(SegmentGeom::new(Point::new(0.0, 0.0), Point::new(9.0, 0.0))),
            style,
        );
        let svg = to_svg(&[shape], 20.0, 20.0);
        assert!(svg.contains(r#"stroke-dasharray="8,6""#));
    }

    #[test]
    fn test_json_round_trip() {
        let shapes = shapes();
        let json = to_json(&shapes).unwrap();
        let back: Vec<Shape> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shapes);
    }
}
