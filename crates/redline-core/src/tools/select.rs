//! Selection tool: click to select, drag to move, drag on empty canvas
//! to rubber-band select.

use super::{Preview, Tool, ToolCtx, ToolKind, ToolResponse};
use crate::input::{Key, KeyEvent};
use kurbo::{Point, Rect};

/// Hit-test slack around shape outlines.
const HIT_TOLERANCE: f64 = 5.0;

enum SelectState {
    Idle,
    /// Dragging the current selection. The store checkpoint is taken
    /// lazily on the first real movement so a plain click stays
    /// history-free.
    Moving { last: Point, moved: bool },
    Marquee { start: Point, current: Point },
}

pub struct SelectTool {
    state: SelectState,
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            state: SelectState::Idle,
        }
    }
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn on_pointer_down(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        match ctx.store.hit_test_top(pos, HIT_TOLERANCE) {
            Some(id) => {
                if ctx.mods.shift {
                    ctx.store.toggle_select(id);
                } else if !ctx.store.is_selected(id) {
                    ctx.store.select(id);
                }
                self.state = SelectState::Moving {
                    last: pos,
                    moved: false,
                };
            }
            None => {
                if !ctx.mods.shift {
                    ctx.store.clear_selection();
                }
                self.state = SelectState::Marquee {
                    start: pos,
                    current: pos,
                };
            }
        }
        ToolResponse::None
    }

    fn on_pointer_move(&mut self, pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        match &mut self.state {
            SelectState::Moving { last, moved } => {
                let delta = pos - *last;
                if delta.hypot2() == 0.0 {
                    return ToolResponse::None;
                }
                if !*moved {
                    ctx.store.checkpoint();
                    *moved = true;
                }
                ctx.store.translate_selected(delta);
                *last = pos;
            }
            SelectState::Marquee { current, .. } => *current = pos,
            SelectState::Idle => {}
        }
        ToolResponse::None
    }

    fn on_pointer_up(&mut self, _pos: Point, ctx: &mut ToolCtx) -> ToolResponse {
        let state = std::mem::replace(&mut self.state, SelectState::Idle);
        if let SelectState::Marquee { start, current } = state {
            let rect = Rect::from_points(start, current);
            if rect.area() > 0.0 {
                let hits: Vec<_> = ctx
                    .store
                    .shapes()
                    .iter()
                    .filter(|s| !rect.intersect(s.bounds().inflate(1.0, 1.0)).is_zero_area())
                    .map(|s| s.id)
                    .collect();
                for id in hits {
                    if !ctx.store.is_selected(id) {
                        ctx.store.toggle_select(id);
                    }
                }
            }
        }
        ToolResponse::None
    }

    fn on_key(&mut self, event: &KeyEvent, ctx: &mut ToolCtx) -> ToolResponse {
        match event.key {
            Key::Delete | Key::Backspace => {
                ctx.store.remove_selected();
                ToolResponse::None
            }
            Key::Escape => {
                ctx.store.clear_selection();
                self.state = SelectState::Idle;
                ToolResponse::None
            }
            _ => ToolResponse::None,
        }
    }

    fn on_deactivate(&mut self, _ctx: &mut ToolCtx) -> ToolResponse {
        self.state = SelectState::Idle;
        ToolResponse::None
    }

    fn preview(&self) -> Preview {
        match self.state {
            SelectState::Marquee { start, current } => Preview {
                marquee: Some(Rect::from_points(start, current)),
                ..Default::default()
            },
            _ => Preview::default(),
        }
    }

    fn is_active(&self) -> bool {
        !matches!(self.state, SelectState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::registry::StyleRegistry;
    use crate::shapes::{BoxGeom, Shape, ShapeKind};
    use crate::store::ObjectStore;
    use crate::style::Style;

    fn filled_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
        let mut shape = Shape::new(
            ShapeKind::Rectangle(BoxGeom::new(Rect::new(x0, y0, x1, y1))),
            Style::default(),
        );
        shape.style.fill_enabled = true;
        shape
    }

    #[test]
    fn test_click_selects_topmost() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        store.add(filled_rect(0.0, 0.0, 50.0, 50.0));
        let top = store.add(filled_rect(25.0, 25.0, 75.0, 75.0));
        let mut tool = SelectTool::new();
        let mut ctx = ToolCtx::new(&registry, &mut store);

        tool.on_pointer_down(Point::new(40.0, 40.0), &mut ctx);
        tool.on_pointer_up(Point::new(40.0, 40.0), &mut ctx);
        assert_eq!(store.selected().iter().copied().collect::<Vec<_>>(), vec![top]);
    }

    #[test]
    fn test_shift_click_toggles() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let a = store.add(filled_rect(0.0, 0.0, 20.0, 20.0));
        let b = store.add(filled_rect(40.0, 0.0, 60.0, 20.0));
        let mut tool = SelectTool::new();

        let mut ctx = ToolCtx::new(&registry, &mut store);
        tool.on_pointer_down(Point::new(10.0, 10.0), &mut ctx);
        tool.on_pointer_up(Point::new(10.0, 10.0), &mut ctx);

        let mut ctx = ToolCtx::new(&registry, &mut store);
        ctx.mods = Modifiers::SHIFT;
        tool.on_pointer_down(Point::new(50.0, 10.0), &mut ctx);
        tool.on_pointer_up(Point::new(50.0, 10.0), &mut ctx);

        assert!(store.is_selected(a));
        assert!(store.is_selected(b));
    }

    #[test]
    fn test_drag_moves_selection_with_one_undo_step() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let id = store.add(filled_rect(0.0, 0.0, 20.0, 20.0));
        let mut tool = SelectTool::new();
        let mut ctx = ToolCtx::new(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut ctx);
        tool.on_pointer_move(Point::new(20.0, 10.0), &mut ctx);
        tool.on_pointer_move(Point::new(30.0, 15.0), &mut ctx);
        tool.on_pointer_up(Point::new(30.0, 15.0), &mut ctx);

        assert_eq!(store.get(id).unwrap().bounds(), Rect::new(20.0, 5.0, 40.0, 25.0));
        // One checkpoint for the whole drag: a single undo restores.
        store.undo();
        assert_eq!(store.get(id).unwrap().bounds(), Rect::new(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn test_plain_click_leaves_history_untouched() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        store.add(filled_rect(0.0, 0.0, 20.0, 20.0));
        let history_before = store.can_undo();
        let mut tool = SelectTool::new();
        let mut ctx = ToolCtx::new(&registry, &mut store);

        tool.on_pointer_down(Point::new(10.0, 10.0), &mut ctx);
        tool.on_pointer_up(Point::new(10.0, 10.0), &mut ctx);
        assert_eq!(store.can_undo(), history_before);
    }

    #[test]
    fn test_marquee_selects_intersecting() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let a = store.add(filled_rect(0.0, 0.0, 20.0, 20.0));
        let b = store.add(filled_rect(100.0, 100.0, 120.0, 120.0));
        let mut tool = SelectTool::new();
        let mut ctx = ToolCtx::new(&registry, &mut store);

        tool.on_pointer_down(Point::new(60.0, 60.0), &mut ctx);
        tool.on_pointer_move(Point::new(130.0, 130.0), &mut ctx);
        tool.on_pointer_up(Point::new(130.0, 130.0), &mut ctx);

        assert!(!store.is_selected(a));
        assert!(store.is_selected(b));
    }

    #[test]
    fn test_click_empty_clears_selection() {
        let registry = StyleRegistry::new();
        let mut store = ObjectStore::new();
        let id = store.add(filled_rect(0.0, 0.0, 20.0, 20.0));
        store.select(id);
        let mut tool = SelectTool::new();
        let mut ctx = ToolCtx::new(&registry, &mut store);

        tool.on_pointer_down(Point::new(200.0, 200.0), &mut ctx);
        tool.on_pointer_up(Point::new(200.0, 200.0), &mut ctx);
        assert!(store.selected().is_empty());
    }
}
