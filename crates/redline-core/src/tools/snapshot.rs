//! Region snapshot tool: marquee a region, capture its pixels and stamp
//! them back as a shape.

use super::{Preview, Tool, ToolCtx, ToolKind, ToolResponse, drag_has_extent};
use crate::input::{Key, KeyEvent};
use crate::shapes::{Shape, ShapeKind, SnapshotGeom};
use crate::style::Style;
use kurbo::{Point, Rect};

struct SnapshotDrag {
    start: Point,
    current: Point,
    style: Style,
}

pub struct SnapshotTool {
    drag: Option<SnapshotDrag>,
}

impl SnapshotTool {
    pub fn new() -> Self {
        Self { drag: None }
    }
}

impl Default for SnapshotTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SnapshotTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Snapshot
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        self.drag = Some(SnapshotDrag {
            start: pos,
            current: pos,
            style: ctx.style_for(ToolKind::Snapshot),
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
        if !drag_has_extent(drag.start, pos) {
            return ToolResponse::Cancelled;
        }
        let rect = Rect::from_points(drag.start, pos);
        let Some(capture) = ctx.capture.as_mut() else {
            log::warn!("snapshot: no capture callback, discarding region");
            return ToolResponse::Cancelled;
        };
        let Some(pixels) = capture(rect) else {
            log::warn!("snapshot: capture failed for {rect:?}");
            return ToolResponse::Cancelled;
        };
        let shape = Shape::new(
            ShapeKind::RegionSnapshot(SnapshotGeom::new(rect, pixels)),
            drag.style,
        );
        ToolResponse::Committed(ctx.commit(shape))
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        if event.key == Key::Escape && self.drag.take().is_some() {
            return ToolResponse::Cancelled;
        }
        ToolResponse::None
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        if self.drag.take().is_some() {
            ToolResponse::Cancelled
        } else {
            ToolResponse::None
        }
    }

    fn preview(&self) -> Preview {
        let Some(drag) = &self.drag else {
            return Preview::default();
        };
        Preview {
            marquee: Some(Rect::from_points(drag.start, drag.current)),
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
    use crate::shapes::PixelBuffer;
    use crate::store::ObjectStore;

    #[test]
    fn test_snapshot_captures_region() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = SnapshotTool::new();
        let mut capture = |rect: Rect| {
            let w = rect.width() as u32;
            let h = rect.height() as u32;
            PixelBuffer::new(w, h, vec![255; (w * h * 4) as usize])
        };
        let mut ctx = ToolCtx::new(&registry, &mut store);
        ctx.capture = Some(&mut capture);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut ctx);
        let response = tool.on_pointer_up(Point::new(20.0, 20.0), &mut ctx);
        assert!(matches!(response, ToolResponse::Committed(_)));
        match &store.shapes()[0].kind {
            ShapeKind::RegionSnapshot(geom) => {
                assert_eq!(geom.pixels.width, 10);
                assert_eq!(geom.pixels.height, 10);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_without_capture_is_discarded() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = SnapshotTool::new();
        let mut ctx = ToolCtx::new(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut ctx);
        let response = tool.on_pointer_up(Point::new(40.0, 40.0), &mut ctx);
        assert_eq!(response, ToolResponse::Cancelled);
        assert!(store.is_empty());
    }

    #[test]
    fn test_escape_abandons_marquee() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = SnapshotTool::new();
        let mut ctx = ToolCtx::new(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut ctx);
        tool.on_pointer_move(Point::new(60.0, 60.0), &mut ctx);
        let response = tool.on_key(&KeyEvent::plain(Key::Escape), &mut ctx);
        assert_eq!(response, ToolResponse::Cancelled);
        assert!(!tool.is_active());
        assert!(tool.preview().marquee.is_none());
    }

    #[test]
    fn test_marquee_preview() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = SnapshotTool::new();
        let mut ctx = ToolCtx::new(&registry, &mut store);

        tool.on_pointer_down(Point::new(0.0, 0.0), &mut ctx);
        tool.on_pointer_move(Point::new(30.0, 20.0), &mut ctx);
        assert_eq!(
            tool.preview().marquee,
            Some(Rect::new(0.0, 0.0, 30.0, 20.0))
        );
    }
}
