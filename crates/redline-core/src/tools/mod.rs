//! Tool state machines: each tool turns pointer and keyboard input into
//! committed shapes, publishing a declarative preview while a gesture is
//! in progress.

mod callout;
mod drag;
mod polyline;
mod select;
mod snapshot;
mod stroke;
mod text;

pub use callout::{LeaderCalloutTool, SpeechCalloutTool};
pub use drag::{DragKind, ShapeDragTool};
pub use polyline::PolylineTool;
pub use select::SelectTool;
pub use snapshot::SnapshotTool;
pub use stroke::{StrokeKind, StrokeTool};
pub use text::{StickyNoteTool, TextTool, WatermarkTool};

use crate::input::{KeyEvent, Modifiers};
use crate::registry::StyleRegistry;
use crate::shapes::{PixelBuffer, Shape, ShapeId};
use crate::store::ObjectStore;
use crate::style::Style;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Drags smaller than this on both axes (or shorter than this in total
/// movement, for segment kinds) are discarded as accidental clicks.
pub const MIN_DRAG_EXTENT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Select,
    Pencil,
    Highlighter,
    Line,
    Rect,
    Ellipse,
    Arrow,
    Polyline,
    SpeechCallout,
    LeaderCallout,
    Text,
    StickyNote,
    Watermark,
    Snapshot,
    Redact,
}

impl ToolKind {
    pub const ALL: [ToolKind; 15] = [
        ToolKind::Select,
        ToolKind::Pencil,
        ToolKind::Highlighter,
        ToolKind::Line,
        ToolKind::Rect,
        ToolKind::Ellipse,
        ToolKind::Arrow,
        ToolKind::Polyline,
        ToolKind::SpeechCallout,
        ToolKind::LeaderCallout,
        ToolKind::Text,
        ToolKind::StickyNote,
        ToolKind::Watermark,
        ToolKind::Snapshot,
        ToolKind::Redact,
    ];

    /// Instantiate the state machine for this tool.
    pub fn create(self) -> Box<dyn Tool> {
        match self {
            ToolKind::Select => Box::new(SelectTool::new()),
            ToolKind::Pencil => Box::new(StrokeTool::new(StrokeKind::Pencil)),
            ToolKind::Highlighter => Box::new(StrokeTool::new(StrokeKind::Highlighter)),
            ToolKind::Line => Box::new(ShapeDragTool::new(DragKind::Line)),
            ToolKind::Rect => Box::new(ShapeDragTool::new(DragKind::Rect)),
            ToolKind::Ellipse => Box::new(ShapeDragTool::new(DragKind::Ellipse)),
            ToolKind::Arrow => Box::new(ShapeDragTool::new(DragKind::Arrow)),
            ToolKind::Polyline => Box::new(PolylineTool::new()),
            ToolKind::SpeechCallout => Box::new(SpeechCalloutTool::new()),
            ToolKind::LeaderCallout => Box::new(LeaderCalloutTool::new()),
            ToolKind::Text => Box::new(TextTool::new()),
            ToolKind::StickyNote => Box::new(StickyNoteTool::new()),
            ToolKind::Watermark => Box::new(WatermarkTool::new()),
            ToolKind::Snapshot => Box::new(SnapshotTool::new()),
            ToolKind::Redact => Box::new(ShapeDragTool::new(DragKind::Redact)),
        }
    }
}

/// Callback the engine supplies for tools that read canvas pixels.
pub type CaptureFn<'a> = &'a mut dyn FnMut(Rect) -> Option<PixelBuffer>;

/// Everything a tool may touch while handling an event.
pub struct ToolCtx<'a> {
    pub registry: &'a StyleRegistry,
    pub store: &'a mut ObjectStore,
    /// Region pixel capture, present when the host renders.
    pub capture: Option<CaptureFn<'a>>,
    /// Monotonic event time in milliseconds, for double-click windows.
    pub time_ms: f64,
    /// Modifier keys held during the event.
    pub mods: Modifiers,
}

impl<'a> ToolCtx<'a> {
    pub fn new(registry: &'a StyleRegistry, store: &'a mut ObjectStore) -> Self {
        Self {
            registry,
            store,
            capture: None,
            time_ms: 0.0,
            mods: Modifiers::NONE,
        }
    }

    /// Resolve the style a shape created by `tool` starts with. Tools
    /// call this once at gesture start and keep the frozen copy.
    pub fn style_for(&self, tool: ToolKind) -> Style {
        self.registry.resolve(tool)
    }

    /// Commit a finished shape on top of its tier.
    pub fn commit(&mut self, shape: Shape) -> ShapeId {
        self.store.add(shape)
    }
}

/// Text the host should collect in an overlay editor.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    /// Where the editor should appear, in canvas coordinates.
    pub rect: Rect,
    pub prefill: String,
}

/// What an event did, so the engine can update previews and re-render.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    None,
    /// A shape was committed to the store.
    Committed(ShapeId),
    /// The gesture needs text input before it can finish.
    RequestText(TextRequest),
    /// The in-progress gesture was discarded.
    Cancelled,
}

/// Declarative picture of an in-progress gesture. The engine restores
/// the gesture-start snapshot and paints this on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preview {
    pub shapes: Vec<Shape>,
    /// Vertex dots (polyline family).
    pub markers: Vec<Point>,
    /// Dashed marquee (snapshot, rubber-band selection).
    pub marquee: Option<Rect>,
}

impl Preview {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.markers.is_empty() && self.marquee.is_none()
    }
}

/// A pointer-gesture state machine. Implementations freeze their style
/// from the registry when a gesture starts and never re-resolve
/// mid-gesture.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse;
    fn on_pointer_move(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse;
    fn on_pointer_up(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse;

    fn on_key(&mut self, _event: &KeyEvent, _ctx: &mut ToolCtx) -> ToolResponse {
        ToolResponse::None
    }

    /// The host finished the overlay editor with `text`.
    fn on_text_commit(&mut self, _text: &str, _ctx: &mut ToolCtx) -> ToolResponse {
        ToolResponse::None
    }

    /// The host dismissed the overlay editor.
    fn on_text_cancel(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        ToolResponse::None
    }

    /// Called when the tool is switched away mid-gesture: commit what
    /// has content, discard the rest.
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        ToolResponse::None
    }

    fn preview(&self) -> Preview {
        Preview::default()
    }

    /// Whether a gesture is in progress.
    fn is_active(&self) -> bool;
}

/// Normalize drag extents: true when the drag is big enough to keep.
pub(crate) fn drag_has_extent(start: Point, end: Point) -> bool {
    (end.x - start.x).abs() >= MIN_DRAG_EXTENT && (end.y - start.y).abs() >= MIN_DRAG_EXTENT
}

/// For segment kinds the total movement is what matters.
pub(crate) fn drag_has_length(start: Point, end: Point) -> bool {
    (end - start).hypot() >= MIN_DRAG_EXTENT
}
