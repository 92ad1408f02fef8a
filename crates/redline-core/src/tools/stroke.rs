//! Continuous stroke tools: pencil and highlighter.

use super::{Preview, Tool, ToolCtx, ToolKind, ToolResponse};
use crate::input::{Key, KeyEvent};
use crate::shapes::{PathGeom, Shape, ShapeKind};
use crate::style::Style;
use kurbo::Point;

/// Pointer moves closer than this to the last vertex are dropped.
const MIN_MOVE: f64 = 0.6;
/// Jumps longer than this get densified with interpolated vertices, so
/// fast pointer motion still produces a gap-free stroke.
const MAX_SEGMENT: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeKind {
    Pencil,
    Highlighter,
}

impl StrokeKind {
    fn tool_kind(self) -> ToolKind {
        match self {
            StrokeKind::Pencil => ToolKind::Pencil,
            StrokeKind::Highlighter => ToolKind::Highlighter,
        }
    }
}

struct StrokeState {
    points: Vec<Point>,
    style: Style,
}

pub struct StrokeTool {
    kind: StrokeKind,
    stroke: Option<StrokeState>,
}

impl StrokeTool {
    pub fn new(kind: StrokeKind) -> Self {
        Self { kind, stroke: None }
    }

    fn append(points: &mut Vec<Point>, pos: Point) {
        let Some(&last) = points.last() else {
            points.push(pos);
            return;
        };
        let dist = (pos - last).hypot();
        if dist < MIN_MOVE {
            return;
        }
        if dist > MAX_SEGMENT {
            let steps = (dist / MAX_SEGMENT).ceil() as usize;
            for i in 1..steps {
                let t = i as f64 / steps as f64;
                points.push(last.lerp(pos, t));
            }
        }
        points.push(pos);
    }

    fn build_shape(&self, points: Vec<Point>, style: Style) -> Shape {
        let geom = PathGeom::open(points);
        let kind = match self.kind {
            StrokeKind::Pencil => ShapeKind::Freehand(geom),
            StrokeKind::Highlighter => ShapeKind::Highlighter(geom),
        };
        Shape::new(kind, style)
    }

    fn finalize(&mut self, ctx: &mut ToolCtx) -> ToolResponse {
        let Some(stroke) = self.stroke.take() else {
            return ToolResponse::None;
        };
        if stroke.points.len() < 2 {
            return ToolResponse::Cancelled;
        }
        let shape = self.build_shape(stroke.points, stroke.style);
        ToolResponse::Committed(ctx.commit(shape))
    }
}

impl Tool for StrokeTool {
    fn kind(&self) -> ToolKind {
        self.kind.tool_kind()
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        self.stroke = Some(StrokeState {
            points: vec![pos],
            style: ctx.style_for(self.kind.tool_kind()),
        });
        ToolResponse::None
    }

    fn on_pointer_move(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        if let Some(stroke) = &mut self.stroke {
            Self::append(&mut stroke.points, pos);
        }
        ToolResponse::None
    }

    fn on_pointer_up(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        if let Some(stroke) = &mut self.stroke {
            Self::append(&mut stroke.points, pos);
        }
        self.finalize(ctx)
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        if event.key == Key::Escape && self.stroke.take().is_some() {
            return ToolResponse::Cancelled;
        }
        ToolResponse::None
    }

    fn on_deactivate(&mut self, ctx: &mut ToolCtx) -> ToolResponse {
        self.finalize(ctx)
    }

    fn preview(&self) -> Preview {
        let Some(stroke) = &self.stroke else {
            return Preview::default();
        };
        if stroke.points.len() < 2 {
            return Preview::default();
        }
        Preview {
            shapes: vec![self.build_shape(stroke.points.clone(), stroke.style.clone())],
            ..Default::default()
        }
    }

    fn is_active(&self) -> bool {
        self.stroke.is_some()
    }
}
