//! Callout tools: drag-a-bubble speech callouts and the staged leader
//! callout (place the tip, drag the box, type the label).

use super::{Preview, TextRequest, Tool, ToolCtx, ToolKind, ToolResponse, drag_has_extent};
use crate::input::{Key, KeyEvent};
use crate::shapes::{CalloutGeom, LeaderGeom, Shape, ShapeKind};
use crate::style::Style;
use kurbo::{Point, Rect};

enum SpeechState {
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

/// Drag a bubble, then type into the overlay editor. Committing empty
/// text abandons the bubble.
pub struct SpeechCalloutTool {
    state: Option<SpeechState>,
}

impl SpeechCalloutTool {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for SpeechCalloutTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SpeechCalloutTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SpeechCallout
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        if matches!(self.state, Some(SpeechState::AwaitingText { .. })) {
            return ToolResponse::None;
        }
        self.state = Some(SpeechState::Dragging {
            start: pos,
            current: pos,
            style: ctx.style_for(ToolKind::SpeechCallout),
        });
        ToolResponse::None
    }

    fn on_pointer_move(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        if let Some(SpeechState::Dragging { current, .. }) = &mut self.state {
            *current = pos;
        }
        ToolResponse::None
    }

    fn on_pointer_up(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        match self.state.take() {
            Some(SpeechState::Dragging { start, style, .. }) => {
                if !drag_has_extent(start, pos) {
                    return ToolResponse::Cancelled;
                }
                let rect = Rect::from_points(start, pos);
                self.state = Some(SpeechState::AwaitingText { rect, style });
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

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        if event.key == Key::Escape && self.state.take().is_some() {
            return ToolResponse::Cancelled;
        }
        ToolResponse::None
    }

    fn on_text_commit(&mut self, text: &str, ctx: &mut ToolCtx) -> ToolResponse {
        let Some(SpeechState::AwaitingText { rect, style }) = self.state.take() else {
            return ToolResponse::None;
        };
        if text.trim().is_empty() {
            return ToolResponse::Cancelled;
        }
        let mut geom = CalloutGeom::new(rect);
        geom.text = text.to_owned();
        ToolResponse::Committed(ctx.commit(Shape::new(ShapeKind::SpeechCallout(geom), style)))
    }

    fn on_text_cancel(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        if self.state.take().is_some() {
            ToolResponse::Cancelled
        } else {
            ToolResponse::None
        }
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        // Without text there is no callout worth keeping.
        if self.state.take().is_some() {
            ToolResponse::Cancelled
        } else {
            ToolResponse::None
        }
    }

    fn preview(&self) -> Preview {
        let (rect, style) = match &self.state {
            Some(SpeechState::Dragging {
                start,
                current,
                style,
            }) => (Rect::from_points(*start, *current), style),
            Some(SpeechState::AwaitingText { rect, style }) => (*rect, style),
            None => return Preview::default(),
        };
        Preview {
            shapes: vec![Shape::new(
                ShapeKind::SpeechCallout(CalloutGeom::new(rect)),
                style.clone(),
            )],
            ..Default::default()
        }
    }

    fn is_active(&self) -> bool {
        self.state.is_some()
    }
}

enum LeaderState {
    /// The anchor tip is placed, waiting for the box drag to start.
    TipPlaced { tip: Point, style: Style },
    BoxDrag {
        tip: Point,
        start: Point,
        current: Point,
        style: Style,
    },
    AwaitingText { geom: LeaderGeom, style: Style },
}

/// Staged gesture: first click marks the point being called out, a
/// second press-and-drag places the text box, then the overlay editor
/// collects the label. A box smaller than the minimum extent cancels
/// the whole gesture, tip included.
pub struct LeaderCalloutTool {
    state: Option<LeaderState>,
}

impl LeaderCalloutTool {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for LeaderCalloutTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for LeaderCalloutTool {
    fn kind(&self) -> ToolKind {
        ToolKind::LeaderCallout
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        match self.state.take() {
            None => {
                self.state = Some(LeaderState::TipPlaced {
                    tip: pos,
                    style: ctx.style_for(ToolKind::LeaderCallout),
                });
            }
            Some(LeaderState::TipPlaced { tip, style }) => {
                self.state = Some(LeaderState::BoxDrag {
                    tip,
                    start: pos,
                    current: pos,
                    style,
                });
            }
            other => self.state = other,
        }
        ToolResponse::None
    }

    fn on_pointer_move(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        if let Some(LeaderState::BoxDrag { current, .. }) = &mut self.state {
            *current = pos;
        }
        ToolResponse::None
    }

    fn on_pointer_up(&mut self, pos: Point, _ctx: &mut ToolCtx) -> ToolResponse {
        match self.state.take() {
            Some(LeaderState::BoxDrag {
                tip, start, style, ..
            }) => {
                // A box below the minimum extent cancels the whole
                // gesture, the placed tip included.
                if !drag_has_extent(start, pos) {
                    return ToolResponse::Cancelled;
                }
                let geom = LeaderGeom::new(Rect::from_points(start, pos), tip);
                let rect = geom.rect;
                self.state = Some(LeaderState::AwaitingText { geom, style });
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

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        if event.key == Key::Escape && self.state.take().is_some() {
            return ToolResponse::Cancelled;
        }
        ToolResponse::None
    }

    fn on_text_commit(&mut self, text: &str, ctx: &mut ToolCtx) -> ToolResponse {
        let Some(LeaderState::AwaitingText { mut geom, style }) = self.state.take() else {
            return ToolResponse::None;
        };
        if text.trim().is_empty() {
            return ToolResponse::Cancelled;
        }
        geom.text = text.to_owned();
        ToolResponse::Committed(ctx.commit(Shape::new(ShapeKind::LeaderCallout(geom), style)))
    }

    fn on_text_cancel(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        if self.state.take().is_some() {
            ToolResponse::Cancelled
        } else {
            ToolResponse::None
        }
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        if self.state.take().is_some() {
            ToolResponse::Cancelled
        } else {
            ToolResponse::None
        }
    }

    fn preview(&self) -> Preview {
        match &self.state {
            Some(LeaderState::TipPlaced { tip, .. }) => Preview {
                markers: vec![*tip],
                ..Default::default()
            },
            Some(LeaderState::BoxDrag {
                tip,
                start,
                current,
                style,
            }) => {
                let geom = LeaderGeom::new(Rect::from_points(*start, *current), *tip);
                Preview {
                    shapes: vec![Shape::new(ShapeKind::LeaderCallout(geom), style.clone())],
                    markers: vec![*tip],
                    marquee: None,
                }
            }
            Some(LeaderState::AwaitingText { geom, style }) => Preview {
                shapes: vec![Shape::new(
                    ShapeKind::LeaderCallout(geom.clone()),
                    style.clone(),
                )],
                ..Default::default()
            },
            None => Preview::default(),
        }
    }

    fn is_active(&self) -> bool {
        self.state.is_some()
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
    fn test_speech_callout_needs_text() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = SpeechCalloutTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut c);
        let response = tool.on_pointer_up(Point::new(110.0, 70.0), &mut c);
        assert!(matches!(response, ToolResponse::RequestText(_)));
        assert!(store.is_empty());

        let mut c = ctx(&registry, &mut store);
        let response = tool.on_text_commit("Check this", &mut c);
        assert!(matches!(response, ToolResponse::Committed(_)));
        assert_eq!(store.shapes()[0].text(), Some("Check this"));
    }

    #[test]
    fn test_empty_text_abandons_callout() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = SpeechCalloutTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut c);
        tool.on_pointer_up(Point::new(110.0, 70.0), &mut c);
        let response = tool.on_text_commit("   ", &mut c);
        assert_eq!(response, ToolResponse::Cancelled);
        assert!(store.is_empty());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_speech_escape_abandons_drag() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = SpeechCalloutTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut c);
        tool.on_pointer_move(Point::new(90.0, 60.0), &mut c);
        let response = tool.on_key(&KeyEvent::plain(Key::Escape), &mut c);
        assert_eq!(response, ToolResponse::Cancelled);
        assert!(!tool.is_active());

        let response = tool.on_pointer_up(Point::new(90.0, 60.0), &mut c);
        assert_eq!(response, ToolResponse::None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_leader_staged_gesture() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = LeaderCalloutTool::new();
        let mut c = ctx(&registry, &mut store);

        // Click the anchor tip.
        tool.on_pointer_down(Point::new(20.0, 125.0), &mut c);
        tool.on_pointer_up(Point::new(20.0, 125.0), &mut c);
        assert!(tool.is_active());

        // Drag the text box.
        tool.on_pointer_down(Point::new(100.0, 100.0), &mut c);
        tool.on_pointer_move(Point::new(180.0, 140.0), &mut c);
        let response = tool.on_pointer_up(Point::new(200.0, 150.0), &mut c);
        assert!(matches!(response, ToolResponse::RequestText(_)));

        let response = tool.on_text_commit("leak here", &mut c);
        assert!(matches!(response, ToolResponse::Committed(_)));
        match &store.shapes()[0].kind {
            ShapeKind::LeaderCallout(geom) => {
                assert_eq!(geom.tip, Point::new(20.0, 125.0));
                assert_eq!(geom.elbow(), Point::new(20.0, 125.0));
            }
            other => panic!("expected leader callout, got {other:?}"),
        }
    }

    #[test]
    fn test_leader_tiny_box_cancels_everything() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = LeaderCalloutTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(20.0, 20.0), &mut c);
        tool.on_pointer_up(Point::new(20.0, 20.0), &mut c);
        tool.on_pointer_down(Point::new(100.0, 100.0), &mut c);
        let response = tool.on_pointer_up(Point::new(101.0, 101.0), &mut c);
        assert_eq!(response, ToolResponse::Cancelled);
        assert!(!tool.is_active());
        assert!(store.is_empty());
    }

    #[test]
    fn test_leader_escape_cancels_tip() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let mut tool = LeaderCalloutTool::new();
        let mut c = ctx(&registry, &mut store);

        tool.on_pointer_down(Point::new(20.0, 20.0), &mut c);
        let response = tool.on_key(&KeyEvent::plain(Key::Escape), &mut c);
        assert_eq!(response, ToolResponse::Cancelled);
        assert!(!tool.is_active());
    }
}
