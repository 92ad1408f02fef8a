//! Editor orchestrator: owns the surface, the document store, the style
//! registry and the tool set, routes host events to the active tool and
//! keeps the canvas pixels in sync.
//!
//! Previews use a gesture-start snapshot of the surface: every pointer
//! event restores the snapshot and paints the tool's declarative preview
//! on top, so previews never accumulate ink. The select tool mutates the
//! store mid-gesture and re-renders from the model instead.

use crate::renderer::{render_all, render_grid, render_preview, render_selection};
use crate::surface::Surface;
use kurbo::{Point, Rect};
use redline_core::input::{Key, KeyEvent, Modifiers};
use redline_core::shapes::{PixelBuffer, Shape, ShapeId, ShapeKind};
use redline_core::store::ObjectStore;
use redline_core::tools::{TextRequest, Tool, ToolCtx, ToolKind, ToolResponse};
use redline_core::{Rgba, StyleRegistry};
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;

/// How long a transient status message stays up.
pub const TOAST_MS: f64 = 1100.0;

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Host clipboard integration. Copies are fire-and-forget: a failure is
/// logged and surfaced as a toast, never an editor error.
pub trait ClipboardSink {
    fn copy_pixels(&mut self, pixels: &PixelBuffer) -> Result<(), ClipboardError>;
}

pub struct Engine<S: Surface> {
    surface: S,
    store: ObjectStore,
    registry: StyleRegistry,
    tools: HashMap<ToolKind, Box<dyn Tool>>,
    active: ToolKind,
    /// Surface pixels at gesture start, restored before each preview.
    gesture_snapshot: Option<PixelBuffer>,
    pending_text: Option<TextRequest>,
    clipboard: Option<Box<dyn ClipboardSink>>,
    toast: Option<(String, f64)>,
    epoch: Instant,
    background: Rgba,
}

impl<S: Surface> Engine<S> {
    pub fn new(surface: S) -> Self {
        let tools: HashMap<ToolKind, Box<dyn Tool>> =
            ToolKind::ALL.iter().map(|k| (*k, k.create())).collect();
        let mut engine = Self {
            surface,
            store: ObjectStore::new(),
            registry: StyleRegistry::new(),
            tools,
            active: ToolKind::Select,
            gesture_snapshot: None,
            pending_text: None,
            clipboard: None,
            toast: None,
            epoch: Instant::now(),
            background: Rgba::white(),
        };
        engine.render();
        engine
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Direct document access. Callers that mutate through this should
    /// follow up with [`Engine::render`].
    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut StyleRegistry {
        &mut self.registry
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active
    }

    /// The overlay text editor the host should be showing, if any.
    pub fn pending_text(&self) -> Option<&TextRequest> {
        self.pending_text.as_ref()
    }

    pub fn set_clipboard(&mut self, sink: Box<dyn ClipboardSink>) {
        self.clipboard = Some(sink);
    }

    pub fn set_background(&mut self, color: Rgba) {
        self.background = color;
        self.render();
    }

    /// Current status message, or `None` once it has expired.
    pub fn toast(&self) -> Option<&str> {
        let now = self.now_ms();
        match &self.toast {
            Some((message, deadline)) if *deadline > now => Some(message),
            _ => None,
        }
    }

    /// Replace the document, dropping any in-progress gesture.
    pub fn load(&mut self, store: ObjectStore) {
        self.gesture_snapshot = None;
        self.pending_text = None;
        self.store = store;
        self.render();
    }

    /// Switch the active tool, force-finalizing any in-progress gesture
    /// first: content-bearing gestures commit, the rest are discarded.
    pub fn set_tool(&mut self, kind: ToolKind) {
        if kind == self.active {
            return;
        }
        let response = self.dispatch(Modifiers::NONE, |tool, ctx| tool.on_deactivate(ctx));
        if let ToolResponse::Committed(id) = response {
            self.handle_commit(id);
        }
        self.gesture_snapshot = None;
        self.pending_text = None;
        log::debug!("active tool: {kind:?}");
        self.active = kind;
        self.render();
    }

    pub fn pointer_down(&mut self, pos: Point, mods: Modifiers) {
        let pos = self.snap(pos);
        if self.active != ToolKind::Select && self.gesture_snapshot.is_none() {
            self.gesture_snapshot = Some(self.surface.snapshot());
        }
        let response = self.dispatch(mods, |tool, ctx| tool.on_pointer_down(pos, ctx));
        self.after_event(response);
    }

    pub fn pointer_move(&mut self, pos: Point, mods: Modifiers) {
        let pos = self.snap(pos);
        let response = self.dispatch(mods, |tool, ctx| tool.on_pointer_move(pos, ctx));
        self.after_event(response);
    }

    pub fn pointer_up(&mut self, pos: Point, mods: Modifiers) {
        let pos = self.snap(pos);
        let response = self.dispatch_pointer_up(pos, mods);
        self.after_event(response);
    }

    /// Keyboard entry point. Editor-level shortcuts are handled here;
    /// everything else is forwarded to the active tool.
    pub fn key_down(&mut self, event: KeyEvent) {
        match (event.key, event.mods) {
            (Key::Char('z'), Modifiers::CTRL) => {
                self.store.undo();
                self.repaint();
            }
            (Key::Char('z'), Modifiers::CTRL_SHIFT) | (Key::Char('y'), Modifiers::CTRL) => {
                self.store.redo();
                self.repaint();
            }
            (Key::Char('d'), Modifiers::CTRL) => {
                self.store.duplicate_selected();
                self.repaint();
            }
            (Key::Char(']'), Modifiers::CTRL) => {
                self.store.bring_forward();
                self.repaint();
            }
            (Key::Char('['), Modifiers::CTRL) => {
                self.store.send_backward();
                self.repaint();
            }
            (Key::Char(']'), Modifiers::CTRL_SHIFT) => {
                self.store.bring_to_front();
                self.repaint();
            }
            (Key::Char('['), Modifiers::CTRL_SHIFT) => {
                self.store.send_to_back();
                self.repaint();
            }
            _ => {
                let response = self.dispatch(event.mods, |tool, ctx| tool.on_key(&event, ctx));
                self.after_event(response);
            }
        }
    }

    /// The host finished the overlay text editor.
    pub fn commit_text(&mut self, text: &str) {
        self.pending_text = None;
        let response = self.dispatch(Modifiers::NONE, |tool, ctx| tool.on_text_commit(text, ctx));
        self.after_event(response);
    }

    /// The host dismissed the overlay text editor.
    pub fn cancel_text(&mut self) {
        self.pending_text = None;
        let response = self.dispatch(Modifiers::NONE, |tool, ctx| tool.on_text_cancel(ctx));
        self.after_event(response);
    }

    /// The canvas lost focus. A pending text editor resolves with
    /// whatever the host hands over; any other gesture force-finalizes.
    pub fn focus_lost(&mut self, pending: Option<&str>) {
        if self.pending_text.is_some() {
            match pending {
                Some(text) => self.commit_text(text),
                None => self.cancel_text(),
            }
            return;
        }
        let response = self.dispatch(Modifiers::NONE, |tool, ctx| tool.on_deactivate(ctx));
        self.after_event(response);
    }

    /// Re-render the whole scene from the document.
    pub fn render(&mut self) {
        let Self {
            surface,
            store,
            background,
            ..
        } = self;
        surface.clear(*background);
        render_grid(surface, &store.grid);
        let ordered = store.ordered();
        render_all(surface, &ordered);
        let selected: Vec<&Shape> = ordered
            .into_iter()
            .filter(|s| store.is_selected(s.id))
            .collect();
        render_selection(surface, &selected);
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn snap(&self, pos: Point) -> Point {
        let grid = &self.store.grid;
        if !grid.snap || grid.size <= 0.0 {
            return pos;
        }
        Point::new(
            (pos.x / grid.size).round() * grid.size,
            (pos.y / grid.size).round() * grid.size,
        )
    }

    fn dispatch<F>(&mut self, mods: Modifiers, f: F) -> ToolResponse
    where
        F: FnOnce(&mut dyn Tool, &mut ToolCtx) -> ToolResponse,
    {
        let time_ms = self.now_ms();
        let Self {
            store,
            registry,
            tools,
            active,
            ..
        } = self;
        let Some(tool) = tools.get_mut(active) else {
            return ToolResponse::None;
        };
        let mut ctx = ToolCtx {
            registry,
            store,
            capture: None,
            time_ms,
            mods,
        };
        f(tool.as_mut(), &mut ctx)
    }

    /// Pointer-up carries the pixel-capture callback. The gesture
    /// snapshot is restored first so a capture reads the clean scene,
    /// free of preview ink.
    fn dispatch_pointer_up(&mut self, pos: Point, mods: Modifiers) -> ToolResponse {
        let time_ms = self.now_ms();
        let Self {
            surface,
            store,
            registry,
            tools,
            active,
            gesture_snapshot,
            ..
        } = self;
        if let Some(snapshot) = gesture_snapshot.as_ref() {
            surface.restore(snapshot);
        }
        let Some(tool) = tools.get_mut(active) else {
            return ToolResponse::None;
        };
        let mut capture = |rect: Rect| surface.read_pixels(rect);
        let mut ctx = ToolCtx {
            registry,
            store,
            capture: Some(&mut capture),
            time_ms,
            mods,
        };
        tool.on_pointer_up(pos, &mut ctx)
    }

    fn after_event(&mut self, response: ToolResponse) {
        match response {
            ToolResponse::Committed(id) => {
                self.gesture_snapshot = None;
                self.handle_commit(id);
            }
            ToolResponse::RequestText(request) => {
                self.pending_text = Some(request);
            }
            ToolResponse::Cancelled => {
                self.gesture_snapshot = None;
                self.pending_text = None;
            }
            ToolResponse::None => {}
        }
        self.repaint();
    }

    fn handle_commit(&mut self, id: ShapeId) {
        let message = {
            let Some(shape) = self.store.get(id) else {
                return;
            };
            let ShapeKind::RegionSnapshot(geom) = &shape.kind else {
                return;
            };
            match self.clipboard.as_mut() {
                Some(sink) => match sink.copy_pixels(&geom.pixels) {
                    Ok(()) => "Snapshot copied to clipboard",
                    Err(err) => {
                        log::warn!("clipboard copy failed: {err}");
                        "Snapshot captured (clipboard unavailable)"
                    }
                },
                None => "Snapshot captured",
            }
        };
        self.show_toast(message);
    }

    fn show_toast(&mut self, message: &str) {
        self.toast = Some((message.to_owned(), self.now_ms() + TOAST_MS));
    }

    fn tool_is_active(&self) -> bool {
        self.tools
            .get(&self.active)
            .is_some_and(|tool| tool.is_active())
    }

    /// Bring the pixels up to date after an event: restore-and-preview
    /// while a snapshot gesture runs, full model render otherwise.
    fn repaint(&mut self) {
        if !self.tool_is_active() && self.pending_text.is_none() {
            self.gesture_snapshot = None;
        }
        if self.gesture_snapshot.is_some() {
            let Self {
                surface,
                tools,
                active,
                gesture_snapshot,
                ..
            } = self;
            if let Some(snapshot) = gesture_snapshot.as_ref() {
                surface.restore(snapshot);
            }
            if let Some(tool) = tools.get(active) {
                let preview = tool.preview();
                if !preview.is_empty() {
                    render_preview(surface, &preview);
                }
            }
        } else {
            self.render();
            if let Some(tool) = self.tools.get(&self.active) {
                let preview = tool.preview();
                if !preview.is_empty() {
                    render_preview(&mut self.surface, &preview);
                }
            }
        }
    }
}
