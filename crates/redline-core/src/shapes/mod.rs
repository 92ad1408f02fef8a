//! Shape definitions for the annotation layer.

mod basic;
mod callout;
mod path;
mod region;
mod text;

pub use basic::{BoxGeom, SegmentGeom};
pub use callout::{CalloutGeom, LeaderGeom, TAIL_HEIGHT, TAIL_WIDTH};
pub use path::PathGeom;
pub use region::{PixelBuffer, RegionGeom, SnapshotGeom};
pub use text::{NoteGeom, TextAlign, TextGeom, WatermarkGeom};

use crate::style::Style;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Geometry payload, one variant per annotation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle(BoxGeom),
    Ellipse(BoxGeom),
    Line(SegmentGeom),
    Arrow(SegmentGeom),
    Freehand(PathGeom),
    Highlighter(PathGeom),
    Polyline(PathGeom),
    SpeechCallout(CalloutGeom),
    LeaderCallout(LeaderGeom),
    TextBlock(TextGeom),
    StickyNote(NoteGeom),
    Watermark(WatermarkGeom),
    RegionSnapshot(SnapshotGeom),
    Redact(RegionGeom),
}

/// A single annotation object. Plain serializable data with value
/// semantics; all behavior lives in the renderer and the tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub style: Style,
    /// Z-order index. Redact shapes sort in a second tier above all
    /// other shapes regardless of raw layer value.
    pub layer: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Shape {
    pub fn new(kind: ShapeKind, style: Style) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            style,
            layer: 0,
            name: None,
        }
    }

    /// Clone with a fresh identifier, for duplicate and paste.
    pub fn with_new_id(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy
    }

    /// Redact regions composite after every other shape.
    pub fn is_overlay(&self) -> bool {
        matches!(self.kind, ShapeKind::Redact(_))
    }

    /// Stable kind label, used by the exporters and log lines.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ShapeKind::Rectangle(_) => "rectangle",
            ShapeKind::Ellipse(_) => "ellipse",
            ShapeKind::Line(_) => "line",
            ShapeKind::Arrow(_) => "arrow",
            ShapeKind::Freehand(_) => "freehand",
            ShapeKind::Highlighter(_) => "highlighter",
            ShapeKind::Polyline(_) => "polyline",
            ShapeKind::SpeechCallout(_) => "speech-callout",
            ShapeKind::LeaderCallout(_) => "leader-callout",
            ShapeKind::TextBlock(_) => "text",
            ShapeKind::StickyNote(_) => "sticky-note",
            ShapeKind::Watermark(_) => "watermark",
            ShapeKind::RegionSnapshot(_) => "snapshot",
            ShapeKind::Redact(_) => "redact",
        }
    }

    /// Bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            ShapeKind::Rectangle(g) | ShapeKind::Ellipse(g) => g.rect,
            ShapeKind::Line(g) | ShapeKind::Arrow(g) => {
                Rect::from_points(g.start, g.end)
            }
            ShapeKind::Freehand(g) | ShapeKind::Highlighter(g) | ShapeKind::Polyline(g) => {
                points_bounds(&g.points)
            }
            ShapeKind::SpeechCallout(g) => g.bounds(),
            ShapeKind::LeaderCallout(g) => g.rect.union_pt(g.tip),
            ShapeKind::TextBlock(g) => g.rect,
            ShapeKind::StickyNote(g) => g.rect,
            ShapeKind::Watermark(g) => g.anchor_bounds(self.style.font_size),
            ShapeKind::RegionSnapshot(g) => g.rect,
            ShapeKind::Redact(g) => g.rect,
        }
    }

    /// Check if a point hits this shape. Stroke-based kinds test
    /// distance to their segments with tolerance widened by half the
    /// stroke width; region kinds test containment.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let stroke_tol = tolerance + self.style.stroke_width / 2.0;
        match &self.kind {
            ShapeKind::Rectangle(g) => {
                if self.style.fill_enabled {
                    g.rect.inflate(tolerance, tolerance).contains(point)
                } else {
                    rect_border_hit(g.rect, point, stroke_tol)
                }
            }
            ShapeKind::Ellipse(g) => g.ellipse_hit(point, stroke_tol, self.style.fill_enabled),
            ShapeKind::Line(g) | ShapeKind::Arrow(g) => {
                point_to_segment_dist(point, g.start, g.end) <= stroke_tol
            }
            ShapeKind::Freehand(g) | ShapeKind::Polyline(g) => {
                g.hit_test(point, stroke_tol)
            }
            ShapeKind::Highlighter(g) => g.hit_test(point, stroke_tol),
            ShapeKind::SpeechCallout(g) => {
                g.bounds().inflate(tolerance, tolerance).contains(point)
            }
            ShapeKind::LeaderCallout(g) => g.hit_test(point, stroke_tol, tolerance),
            ShapeKind::TextBlock(g) => g.rect.inflate(tolerance, tolerance).contains(point),
            ShapeKind::StickyNote(g) => g.rect.inflate(tolerance, tolerance).contains(point),
            ShapeKind::Watermark(g) => g
                .anchor_bounds(self.style.font_size)
                .inflate(tolerance, tolerance)
                .contains(point),
            ShapeKind::RegionSnapshot(g) => {
                g.rect.inflate(tolerance, tolerance).contains(point)
            }
            ShapeKind::Redact(g) => g.rect.inflate(tolerance, tolerance).contains(point),
        }
    }

    /// Move the shape by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.kind {
            ShapeKind::Rectangle(g) | ShapeKind::Ellipse(g) => g.rect = g.rect + delta,
            ShapeKind::Line(g) | ShapeKind::Arrow(g) => {
                g.start += delta;
                g.end += delta;
            }
            ShapeKind::Freehand(g) | ShapeKind::Highlighter(g) | ShapeKind::Polyline(g) => {
                for p in &mut g.points {
                    *p += delta;
                }
            }
            ShapeKind::SpeechCallout(g) => g.rect = g.rect + delta,
            ShapeKind::LeaderCallout(g) => {
                g.rect = g.rect + delta;
                g.tip += delta;
            }
            ShapeKind::TextBlock(g) => g.rect = g.rect + delta,
            ShapeKind::StickyNote(g) => g.rect = g.rect + delta,
            ShapeKind::Watermark(g) => g.origin += delta,
            ShapeKind::RegionSnapshot(g) => g.rect = g.rect + delta,
            ShapeKind::Redact(g) => g.rect = g.rect + delta,
        }
    }

    /// Text carried by the shape, for kinds that have one.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ShapeKind::SpeechCallout(g) => Some(&g.text),
            ShapeKind::LeaderCallout(g) => Some(&g.text),
            ShapeKind::TextBlock(g) => Some(&g.text),
            ShapeKind::StickyNote(g) => Some(&g.text),
            ShapeKind::Watermark(g) => Some(&g.text),
            _ => None,
        }
    }
}

/// Bounding box of a point list. Empty lists produce a zero rect.
pub fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// Distance from a point to a line segment (a -> b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

fn rect_border_hit(rect: Rect, point: Point, tolerance: f64) -> bool {
    let outer = rect.inflate(tolerance, tolerance);
    let inner = rect.inflate(-tolerance, -tolerance);
    outer.contains(point) && !inner.contains(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_shape(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
        Shape::new(
            ShapeKind::Rectangle(BoxGeom::new(Rect::new(x0, y0, x1, y1))),
            Style::default(),
        )
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(point_to_segment_dist(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(point_to_segment_dist(Point::new(-4.0, 0.0), a, b), 4.0);
        // Degenerate segment falls back to point distance.
        assert_eq!(point_to_segment_dist(Point::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn test_outline_rect_hit_only_on_border() {
        let shape = rect_shape(0.0, 0.0, 100.0, 100.0);
        assert!(shape.hit_test(Point::new(0.0, 50.0), 2.0));
        assert!(!shape.hit_test(Point::new(50.0, 50.0), 2.0));
    }

    #[test]
    fn test_filled_rect_hit_anywhere_inside() {
        let mut shape = rect_shape(0.0, 0.0, 100.0, 100.0);
        shape.style.fill_enabled = true;
        assert!(shape.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!shape.hit_test(Point::new(150.0, 50.0), 0.0));
    }

    #[test]
    fn test_translate_moves_bounds() {
        let mut shape = rect_shape(10.0, 10.0, 20.0, 20.0);
        shape.translate(Vec2::new(5.0, -5.0));
        assert_eq!(shape.bounds(), Rect::new(15.0, 5.0, 25.0, 15.0));
    }

    #[test]
    fn test_with_new_id_changes_only_id() {
        let shape = rect_shape(0.0, 0.0, 10.0, 10.0);
        let copy = shape.with_new_id();
        assert_ne!(copy.id, shape.id);
        assert_eq!(copy.kind, shape.kind);
        assert_eq!(copy.layer, shape.layer);
    }

    #[test]
    fn test_overlay_is_redact_only() {
        let redact = Shape::new(
            ShapeKind::Redact(RegionGeom::new(Rect::new(0.0, 0.0, 10.0, 10.0))),
            Style::default(),
        );
        assert!(redact.is_overlay());
        assert!(!rect_shape(0.0, 0.0, 10.0, 10.0).is_overlay());
    }
}
