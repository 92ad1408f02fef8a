//! Text-entry tools: text blocks, sticky notes and watermarks. All of
//! them hand off to the host's overlay editor and only commit once text
//! arrives.

use super::{Preview, TextRequest, Tool, ToolCtx, ToolKind, ToolResponse, drag_has_extent};
use crate::input::{Key, KeyEvent};
use crate::shapes::{NoteGeom, Shape, ShapeKind, TextGeom, WatermarkGeom};
use crate::style::Style;
use kurbo::{Point, Rect, Size};

/// Box spawned by a click without a drag.
const DEFAULT_TEXT_SIZE: Size = Size::new(160.0, 40.0);
const DEFAULT_NOTE_SIZE: Size = Size::new(160.0, 120.0);

/// Watermark tiling defaults.
const WATERMARK_ROTATION_DEG: f64 = -30.0;
const WATERMARK_SPACING_FACTOR: f64 = 6.0;

enum BoxTextState {
    Dragging {
        start: Point,
        current: Point,
        style: Style,
    },
    AwaitingText {
        rect: Rect,
        style: Style,
    },
}

/// Shared drag-or-click state machine for the boxed text kinds.
struct BoxTextMachine {
    state: Option<BoxTextState>,
    default_size: Size,
    tool: ToolKind,
}

impl BoxTextMachine {
    fn new(tool: ToolKind, default_size: Size) -> Self {
        Self {
            state: None,
            default_size,
            tool,
        }
    }

    fn pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        if matches!(self.state, Some(BoxTextState::AwaitingText { .. })) {
            return ToolResponse::None;
        }
        self.state = Some(BoxTextState::Dragging {
            start: pos,
            current: pos,
            style: ctx.style_for(self.tool),
        });
        ToolResponse::None
    }

    fn pointer_move(&mut self, pos: Point) -> ToolResponse {
        if let Some(BoxTextState::Dragging { current, .. }) = &mut self.state {
            *current = pos;
        }
        ToolResponse::None
    }

    fn pointer_up(&mut self, pos: Point) -> ToolResponse {
        match self.state.take() {
            Some(BoxTextState::Dragging { start, style, .. }) => {
                // Click without a drag spawns a default-size box.
                let rect = if drag_has_extent(start, pos) {
                    Rect::from_points(start, pos)
                } else {
                    Rect::from_origin_size(start, self.default_size)
                };
                self.state = Some(BoxTextState::AwaitingText { rect, style });
                ToolResponse::RequestText(TextRequest {
                    rect,
                    prefill: String::new(),
                })
            }
            other => {
                self.state = other;
                ToolResponse::None
            }
        }
    }

    fn take_pending(&mut self) -> Option<(Rect, Style)> {
        match self.state.take() {
            Some(BoxTextState::AwaitingText { rect, style }) => Some((rect, style)),
            other => {
                self.state = other;
                None
            }
        }
    }

    fn key(&mut self, event: &KeyEvent) -> ToolResponse {
        if event.key == Key::Escape {
            return self.cancel();
        }
        ToolResponse::None
    }

    fn cancel(&mut self) -> ToolResponse {
        if self.state.take().is_some() {
            ToolResponse::Cancelled
        } else {
            ToolResponse::None
        }
    }

    fn preview_rect(&self) -> Option<(Rect, &Style)> {
        match &self.state {
            Some(BoxTextState::Dragging {
                start,
                current,
                style,
            }) => Some((Rect::from_points(*start, *current), style)),
            Some(BoxTextState::AwaitingText { rect, style }) => Some((*rect, style)),
            None => None,
        }
    }

    fn is_active(&self) -> bool {
        self.state.is_some()
    }
}

pub struct TextTool {
    machine: BoxTextMachine,
}

impl TextTool {
    pub fn new() -> Self {
        Self {
            machine: BoxTextMachine::new(ToolKind::Text, DEFAULT_TEXT_SIZE),
        }
    }
}

impl Default for TextTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.pointer_down(pos, ctx)
    }

    fn on_pointer_move(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.pointer_move(pos)
    }

    fn on_pointer_up(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.pointer_up(pos)
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.key(event)
    }

    fn on_text_commit(&mut self, text: &str, ctx: &mut ToolCtx) -> ToolResponse {
        let Some((rect, style)) = self.machine.take_pending() else {
            return ToolResponse::None;
        };
        if text.trim().is_empty() {
            return ToolResponse::Cancelled;
        }
        let shape = Shape::new(ShapeKind::TextBlock(TextGeom::new(rect, text)), style);
        ToolResponse::Committed(ctx.commit(shape))
    }

    fn on_text_cancel(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.cancel()
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.cancel()
    }

    fn preview(&self) -> Preview {
        let Some((rect, style)) = self.machine.preview_rect() else {
            return Preview::default();
        };
        Preview {
            marquee: Some(rect),
            shapes: vec![Shape::new(
                ShapeKind::TextBlock(TextGeom::new(rect, "")),
                style.clone(),
            )],
            ..Default::default()
        }
    }

    fn is_active(&self) -> bool {
        self.machine.is_active()
    }
}

pub struct StickyNoteTool {
    machine: BoxTextMachine,
}

impl StickyNoteTool {
    pub fn new() -> Self {
        Self {
            machine: BoxTextMachine::new(ToolKind::StickyNote, DEFAULT_NOTE_SIZE),
        }
    }
}

impl Default for StickyNoteTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for StickyNoteTool {
    fn kind(&self) -> ToolKind {
        ToolKind::StickyNote
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.pointer_down(pos, ctx)
    }

    fn on_pointer_move(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.pointer_move(pos)
    }

    fn on_pointer_up(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.pointer_up(pos)
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.key(event)
    }

    fn on_text_commit(&mut self, text: &str, ctx: &mut ToolCtx) -> ToolResponse {
        let Some((rect, style)) = self.machine.take_pending() else {
            return ToolResponse::None;
        };
        if text.trim().is_empty() {
            return ToolResponse::Cancelled;
        }
        let shape = Shape::new(ShapeKind::StickyNote(NoteGeom::new(rect, text)), style);
        ToolResponse::Committed(ctx.commit(shape))
    }

    fn on_text_cancel(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.cancel()
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        self.machine.cancel()
    }

    fn preview(&self) -> Preview {
        let Some((rect, style)) = self.machine.preview_rect() else {
            return Preview::default();
        };
        Preview {
            shapes: vec![Shape::new(
                ShapeKind::StickyNote(NoteGeom::new(rect, "")),
                style.clone(),
            )],
            ..Default::default()
        }
    }

    fn is_active(&self) -> bool {
        self.machine.is_active()
    }
}

/// Caret-style placement: a click drops the stamp origin, then the
/// overlay editor collects the watermark text.
pub struct WatermarkTool {
    pending: Option<(Point, Style)>,
}

impl WatermarkTool {
    pub fn new() -> Self {
        Self { pending: None }
    }
}

impl Default for WatermarkTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WatermarkTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Watermark
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        if self.pending.is_some() {
            return ToolResponse::None;
        }
        let style = ctx.style_for(ToolKind::Watermark);
        let editor_rect = Rect::from_origin_size(
            Point::new(pos.x, pos.y - style.font_size),
            Size::new(240.0, style.font_size * 1.5),
        );
        self.pending = Some((pos, style));
        ToolResponse::RequestText(TextRequest {
            rect: editor_rect,
            prefill: String::new(),
        })
    }

    fn on_pointer_move(&mut self, _pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        ToolResponse::None
    }

    fn on_pointer_up(&mut self, _pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        ToolResponse::None
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        if event.key == Key::Escape && self.pending.take().is_some() {
            return ToolResponse::Cancelled;
        }
        ToolResponse::None
    }

    fn on_text_commit(&mut self, text: &str, ctx: &mut ToolCtx) -> ToolResponse {
        let Some((origin, style)) = self.pending.take() else {
            return ToolResponse::None;
        };
        if text.trim().is_empty() {
            return ToolResponse::Cancelled;
        }
        let geom = WatermarkGeom::new(
            origin,
            text,
            WATERMARK_ROTATION_DEG,
            WATERMARK_SPACING_FACTOR,
        );
        ToolResponse::Committed(ctx.commit(Shape::new(ShapeKind::Watermark(geom), style)))
    }

    fn on_text_cancel(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        if self.pending.take().is_some() {
            ToolResponse::Cancelled
        } else {
            ToolResponse::None
        }
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        if self.pending.take().is_some() {
            ToolResponse::Cancelled
        } else {
            ToolResponse::None
        }
    }

    fn preview(&self) -> Preview {
        let Some((origin, _)) = &self.pending else {
            return Preview::default();
        };
        Preview {
            markers: vec![*origin],
            ..Default::default()
        }
    }

    fn is_active(&self) -> bool {
        self.pending.is_some()
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
    fn test_click_spawns_default_size_text_box() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = TextTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(30.0, 40.0), &mut c);
        let response = tool.on_pointer_up(Point::new(30.0, 40.0), &mut c);
        match response {
            ToolResponse::RequestText(request) => {
                assert_eq!(request.rect.origin(), Point::new(30.0, 40.0));
                assert_eq!(request.rect.size(), DEFAULT_TEXT_SIZE);
            }
            other => panic!("expected text request, got {other:?}"),
        }

        tool.on_text_commit("note", &mut c);
        assert_eq!(store.shapes()[0].text(), Some("note"));
    }

    #[test]
    fn test_drag_sizes_the_text_box() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = TextTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut c);
        let response = tool.on_pointer_up(Point::new(210.0, 90.0), &mut c);
        match response {
            ToolResponse::RequestText(request) => {
                assert_eq!(request.rect, Rect::new(10.0, 10.0, 210.0, 90.0));
            }
            other => panic!("expected text request, got {other:?}"),
        }
    }

    #[test]
    fn test_sticky_note_defaults() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = StickyNoteTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(0.0, 0.0), &mut c);
        tool.on_pointer_up(Point::new(0.0, 0.0), &mut c);
        tool.on_text_commit("todo", &mut c);

        let shape = &store.shapes()[0];
        assert_eq!(shape.bounds().size(), DEFAULT_NOTE_SIZE);
        assert!(shape.style.fill_enabled);
        assert_eq!(shape.style.corner_radius, 10.0);
    }

    #[test]
    fn test_watermark_click_places_origin() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = WatermarkTool::new();
        let mut c = ctx(&registry, &mut store);

        let response = tool.on_pointer_down(Point::new(100.0, 200.0), &mut c);
        assert!(matches!(response, ToolResponse::RequestText(_)));
        tool.on_text_commit("CONFIDENTIAL", &mut c);

        match &store.shapes()[0].kind {
            ShapeKind::Watermark(geom) => {
                assert_eq!(geom.origin, Point::new(100.0, 200.0));
                assert!(geom.tiled);
                assert_eq!(geom.rotation_deg, WATERMARK_ROTATION_DEG);
                assert_eq!(geom.spacing_factor, WATERMARK_SPACING_FACTOR);
            }
            other => panic!("expected watermark, got {other:?}"),
        }
        assert_eq!(store.shapes()[0].style.opacity, 0.18);
    }

    #[test]
    fn test_escape_abandons_text_box_drag() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = StickyNoteTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut c);
        tool.on_pointer_move(Point::new(120.0, 80.0), &mut c);
        let response = tool.on_key(&KeyEvent::plain(Key::Escape), &mut c);
        assert_eq!(response, ToolResponse::Cancelled);
        assert!(!tool.is_active());

        // The release must not spawn the default-size box either.
        let response = tool.on_pointer_up(Point::new(120.0, 80.0), &mut c);
        assert_eq!(response, ToolResponse::None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_text_cancel_leaves_store_untouched() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = TextTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(0.0, 0.0), &mut c);
        tool.on_pointer_up(Point::new(0.0, 0.0), &mut c);
        assert_eq!(tool.on_text_cancel(&mut c), ToolResponse::Cancelled);
        assert!(store.is_empty());
        assert!(!tool.is_active());
    }
}
