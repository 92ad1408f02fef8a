//! Drag-to-create tool covering the simple one-gesture kinds.

use super::{Tool, ToolCtx, ToolKind, ToolResponse, drag_has_extent, drag_has_length};
use crate::input::{Key, KeyEvent};
use crate::shapes::{BoxGeom, RegionGeom, SegmentGeom, Shape, ShapeKind};
use crate::style::Style;
use crate::tools::Preview;
use kurbo::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Rect,
    Ellipse,
    Line,
    Arrow,
    Redact,
}

impl DragKind {
    fn tool_kind(self) -> ToolKind {
        match self {
            DragKind::Rect => ToolKind::Rect,
            DragKind::Ellipse => ToolKind::Ellipse,
            DragKind::Line => ToolKind::Line,
            DragKind::Arrow => ToolKind::Arrow,
            DragKind::Redact => ToolKind::Redact,
        }
    }

    fn is_segment(self) -> bool {
        matches!(self, DragKind::Line | DragKind::Arrow)
    }
}

struct DragState {
    start: Point,
    current: Point,
    style: Style,
}

/// Idle -> Dragging -> Idle. Box geometry is normalized on release and
/// drags under the minimum extent are silently discarded.
pub struct ShapeDragTool {
    kind: DragKind,
    drag: Option<DragState>,
}

impl ShapeDragTool {
    pub fn new(kind: DragKind) -> Self {
        Self { kind, drag: None }
    }

    fn has_extent(&self, start: Point, end: Point) -> bool {
        if self.kind.is_segment() {
            drag_has_length(start, end)
        } else {
            drag_has_extent(start, end)
        }
    }

    fn build_shape(&self, start: Point, end: Point, style: Style) -> Shape {
        let kind = match self.kind {
            DragKind::Rect => ShapeKind::Rectangle(BoxGeom::from_corners(start, end)),
            DragKind::Ellipse => ShapeKind::Ellipse(BoxGeom::from_corners(start, end)),
            DragKind::Line => ShapeKind::Line(SegmentGeom::new(start, end)),
            DragKind::Arrow => ShapeKind::Arrow(SegmentGeom::new(start, end)),
            DragKind::Redact => ShapeKind::Redact(RegionGeom::new(Rect::from_points(start, end))),
        };
        Shape::new(kind, style)
    }
}

impl Tool for ShapeDragTool {
    fn kind(&self) -> ToolKind {
        self.kind.tool_kind()
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        self.drag = Some(DragState {
            start: pos,
            current: pos,
            style: ctx.style_for(self.kind.tool_kind()),
        });
        ToolResponse::None
    }

    fn on_pointer_move(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        if let Some(drag) = &mut self.drag {
            drag.current = pos;
        }
        ToolResponse::None
    }

    fn on_pointer_up(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        let Some(drag) = self.drag.take() else {
            return ToolResponse::None;
        };
        if !self.has_extent(drag.start, pos) {
            return ToolResponse::Cancelled;
        }
        let shape = self.build_shape(drag.start, pos, drag.style);
        ToolResponse::Committed(ctx.commit(shape))
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        if event.key == Key::Escape && self.drag.take().is_some() {
            return ToolResponse::Cancelled;
        }
        ToolResponse::None
    }

    fn on_deactivate(&mut self, ctx: &mut ToolCtx) -> ToolResponse {
        let Some(drag) = self.drag.take() else {
            return ToolResponse::None;
        };
        if !self.has_extent(drag.start, drag.current) {
            return ToolResponse::Cancelled;
        }
        let shape = self.build_shape(drag.start, drag.current, drag.style);
        ToolResponse::Committed(ctx.commit(shape))
    }

    fn preview(&self) -> Preview {
        let Some(drag) = &self.drag else {
            return Preview::default();
        };
        Preview {
            shapes: vec![self.build_shape(drag.start, drag.current, drag.style.clone())],
            ..Default::default()
        }
    }

    fn is_active(&self) -> bool {
        self.drag.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StyleRegistry;
    use crate::store::ObjectStore;

    fn ctx<'a>(registry: &'a StyleRegistry, store: &'a mut ObjectStore) -> ToolCtx<'a> {
        ToolCtx::new(registry, store)
    }

    #[test]
    fn test_drag_commits_normalized_rect() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = ShapeDragTool::new(DragKind::Rect);
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(50.0, 50.0), &mut c);
        tool.on_pointer_move(Point::new(30.0, 80.0), &mut c);
        let response = tool.on_pointer_up(Point::new(10.0, 90.0), &mut c);

        assert!(matches!(response, ToolResponse::Committed(_)));
        let shape = &store.shapes()[0];
        assert_eq!(shape.bounds(), Rect::new(10.0, 50.0, 50.0, 90.0));
    }

    #[test]
    fn test_tiny_drag_is_discarded() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = ShapeDragTool::new(DragKind::Redact);
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut c);
        let response = tool.on_pointer_up(Point::new(11.0, 11.0), &mut c);

        assert_eq!(response, ToolResponse::Cancelled);
        assert!(store.is_empty());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_style_frozen_at_gesture_start() {
        let mut registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = ShapeDragTool::new(DragKind::Rect);

        {
            let mut c = ctx(&registry, &mut store);
            tool.on_pointer_down(Point::new(0.0, 0.0), &mut c);
        }
        // Defaults change mid-gesture; the in-progress shape must not care.
        registry.set_defaults(
            ToolKind::Rect,
            crate::style::StylePatch {
                stroke_width: Some(99.0),
                ..Default::default()
            },
        );
        {
            let mut c = ctx(&registry, &mut store);
            tool.on_pointer_up(Point::new(40.0, 40.0), &mut c);
        }
        assert_ne!(store.shapes()[0].style.stroke_width, 99.0);
    }

    #[test]
    fn test_escape_abandons_drag() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = ShapeDragTool::new(DragKind::Rect);
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut c);
        tool.on_pointer_move(Point::new(80.0, 60.0), &mut c);
        let response = tool.on_key(&KeyEvent::plain(Key::Escape), &mut c);
        assert_eq!(response, ToolResponse::Cancelled);
        assert!(!tool.is_active());

        // The release after the cancel must not resurrect the shape.
        let response = tool.on_pointer_up(Point::new(80.0, 60.0), &mut c);
        assert_eq!(response, ToolResponse::None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_deactivate_commits_drag_with_extent() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = ShapeDragTool::new(DragKind::Arrow);
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(0.0, 0.0), &mut c);
        tool.on_pointer_move(Point::new(40.0, 0.0), &mut c);
        let response = tool.on_deactivate(&mut c);
        assert!(matches!(response, ToolResponse::Committed(_)));
        assert!(!tool.is_active());
    }

    #[test]
    fn test_preview_tracks_pointer() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = ShapeDragTool::new(DragKind::Ellipse);
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(0.0, 0.0), &mut c);
        tool.on_pointer_move(Point::new(20.0, 10.0), &mut c);
        let preview = tool.preview();
        assert_eq!(preview.shapes.len(), 1);
        assert_eq!(preview.shapes[0].bounds(), Rect::new(0.0, 0.0, 20.0, 10.0));
        assert!(store.is_empty());
    }
}
