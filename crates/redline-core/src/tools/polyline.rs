//! Multi-click polyline tool.

use super::{Preview, Tool, ToolCtx, ToolKind, ToolResponse};
use crate::input::{Key, KeyEvent};
use crate::shapes::{PathGeom, Shape, ShapeKind};
use crate::style::Style;
use kurbo::Point;

/// Double-click window in milliseconds.
const DOUBLE_CLICK_MS: f64 = 280.0;
/// Squared distance the two clicks of a double-click may be apart.
const DOUBLE_CLICK_DIST_SQ: f64 = 100.0;
/// Clicking this close to the first vertex closes the path.
const CLOSE_RADIUS: f64 = 6.0;

struct PolyState {
    vertices: Vec<Point>,
    /// Live segment endpoint, tracking the pointer.
    cursor: Option<Point>,
    style: Style,
    last_click: Option<(Point, f64)>,
}

/// Vertices on click; double-click or clicking the first vertex
/// finishes the path, Enter commits it open, Escape abandons it.
pub struct PolylineTool {
    state: Option<PolyState>,
}

impl PolylineTool {
    pub fn new() -> Self {
        Self { state: None }
    }

    fn commit(&mut self, closed: bool, ctx: &mut ToolCtx) -> ToolResponse {
        let Some(state) = self.state.take() else {
            return ToolResponse::None;
        };
        if state.vertices.len() < 2 {
            return ToolResponse::Cancelled;
        }
        let geom = if closed {
            PathGeom::closed(state.vertices)
        } else {
            PathGeom::open(state.vertices)
        };
        let shape = Shape::new(ShapeKind::Polyline(geom), state.style);
        ToolResponse::Committed(ctx.commit(shape))
    }
}

impl Default for PolylineTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PolylineTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Polyline
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        let Some(state) = &mut self.state else {
            self.state = Some(PolyState {
                vertices: vec![pos],
                cursor: None,
                style: ctx.style_for(ToolKind::Polyline),
                last_click: Some((pos, ctx.time_ms)),
            });
            return ToolResponse::None;
        };

        if let Some((prev, when)) = state.last_click {
            let quick = ctx.time_ms - when <= DOUBLE_CLICK_MS;
            if quick && (pos - prev).hypot2() <= DOUBLE_CLICK_DIST_SQ {
                let closed = ctx.registry.resolve_closed(ToolKind::Polyline);
                return self.commit(closed, ctx);
            }
        }

        if state.vertices.len() >= 3 && (pos - state.vertices[0]).hypot() <= CLOSE_RADIUS {
            return self.commit(true, ctx);
        }

        state.vertices.push(pos);
        state.last_click = Some((pos, ctx.time_ms));
        ToolResponse::None
    }

    fn on_pointer_move(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        if let Some(state) = &mut self.state {
            state.cursor = Some(pos);
        }
        ToolResponse::None
    }

    fn on_pointer_up(&mut self, _pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        ToolResponse::None
    }

    fn on_key(&mut self, event: &KeyEvent, ctx: &mut ToolCtx) -> ToolResponse {
        if self.state.is_none() {
            return ToolResponse::None;
        }
        match event.key {
            Key::Enter => self.commit(false, ctx),
            Key::Escape => {
                self.state = None;
                ToolResponse::Cancelled
            }
            _ => ToolResponse::None,
        }
    }

    fn on_deactivate(&mut self, ctx: &mut ToolCtx) -> ToolResponse {
        self.commit(false, ctx)
    }

    fn preview(&self) -> Preview {
        let Some(state) = &self.state else {
            return Preview::default();
        };
        let mut points = state.vertices.clone();
        if let Some(cursor) = state.cursor {
            points.push(cursor);
        }
        let mut shapes = Vec::new();
        if points.len() >= 2 {
            shapes.push(Shape::new(
                ShapeKind::Polyline(PathGeom::open(points)),
                state.style.clone(),
            ));
        }
        Preview {
            shapes,
            markers: state.vertices.clone(),
            marquee: None,
        }
    }

    fn is_active(&self) -> bool {
        self.state.is_some()
    }
}
