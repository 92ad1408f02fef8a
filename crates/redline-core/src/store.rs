//! Object store: the annotation list plus selection, undo/redo history
//! and z-order management.

use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum number of undo snapshots to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Offset applied to duplicated shapes.
const DUPLICATE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// Background grid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub show: bool,
    pub snap: bool,
    pub size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            show: false,
            snap: false,
            size: 20.0,
        }
    }
}

/// The annotation document. Undo and redo operate on whole-list
/// snapshots; selection and history are transient and never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectStore {
    objects: Vec<Shape>,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(skip)]
    selected: BTreeSet<ShapeId>,
    #[serde(skip)]
    history: Vec<Vec<Shape>>,
    #[serde(skip)]
    redo_stack: Vec<Vec<Shape>>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.iter().find(|s| s.id == id)
    }

    /// Shapes in paint order: every non-redact shape first, redact
    /// overlays after, each tier by ascending layer.
    pub fn ordered(&self) -> Vec<&Shape> {
        let mut sorted: Vec<&Shape> = self.objects.iter().collect();
        sorted.sort_by_key(|s| (s.is_overlay(), s.layer));
        sorted
    }

    /// Record the current object list as an undo point and invalidate
    /// the redo stack. Called by every mutating operation; drag-style
    /// edits call it once up front and then mutate freely.
    pub fn checkpoint(&mut self) {
        self.history.push(self.objects.clone());
        if self.history.len() > MAX_UNDO_HISTORY {
            self.history.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.redo_stack.push(std::mem::replace(&mut self.objects, previous));
        self.prune_selection();
        log::debug!("undo: {} shapes, {} undo levels left", self.objects.len(), self.history.len());
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.history.push(std::mem::replace(&mut self.objects, next));
        self.prune_selection();
        log::debug!("redo: {} shapes", self.objects.len());
        true
    }

    /// Add a shape on top of its tier. Returns the shape id.
    pub fn add(&mut self, mut shape: Shape) -> ShapeId {
        self.checkpoint();
        let id = shape.id;
        shape.layer = self.next_layer();
        log::debug!("add {} shape {id} at layer {}", shape.kind_name(), shape.layer);
        self.objects.push(shape);
        self.reindex_layers();
        id
    }

    pub fn max_layer(&self) -> i32 {
        self.objects.iter().map(|s| s.layer).max().unwrap_or(-1)
    }

    pub fn next_layer(&self) -> i32 {
        self.max_layer() + 1
    }

    pub fn remove_selected(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        self.checkpoint();
        let selected = std::mem::take(&mut self.selected);
        self.objects.retain(|s| !selected.contains(&s.id));
        self.reindex_layers();
    }

    pub fn clear(&mut self) {
        if self.objects.is_empty() {
            return;
        }
        self.checkpoint();
        self.objects.clear();
        self.selected.clear();
    }

    /// Clone the selection with fresh ids, offset slightly and stacked
    /// on top. The duplicates become the new selection.
    pub fn duplicate_selected(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        self.checkpoint();
        let mut clones: Vec<Shape> = self
            .ordered()
            .into_iter()
            .filter(|s| self.selected.contains(&s.id))
            .map(Shape::with_new_id)
            .collect();
        let mut layer = self.next_layer();
        self.selected.clear();
        for clone in &mut clones {
            clone.translate(DUPLICATE_OFFSET);
            clone.layer = layer;
            layer += 1;
            self.selected.insert(clone.id);
        }
        self.objects.extend(clones);
        self.reindex_layers();
    }

    /// In-place property edit with an undo point.
    pub fn update_shape(&mut self, id: ShapeId, f: impl FnOnce(&mut Shape)) -> bool {
        let Some(index) = self.objects.iter().position(|s| s.id == id) else {
            return false;
        };
        self.checkpoint();
        f(&mut self.objects[index]);
        true
    }

    /// Move every selected shape. Callers record one checkpoint per
    /// drag, not one per pointer event.
    pub fn translate_selected(&mut self, delta: Vec2) {
        for shape in &mut self.objects {
            if self.selected.contains(&shape.id) {
                shape.translate(delta);
            }
        }
    }

    /// Topmost shape under `point`, honoring paint order.
    pub fn hit_test_top(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.ordered()
            .into_iter()
            .rev()
            .find(|s| s.hit_test(point, tolerance))
            .map(|s| s.id)
    }

    pub fn selected(&self) -> &BTreeSet<ShapeId> {
        &self.selected
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn select(&mut self, id: ShapeId) {
        self.selected.clear();
        if self.get(id).is_some() {
            self.selected.insert(id);
        }
    }

    pub fn toggle_select(&mut self, id: ShapeId) {
        if !self.selected.remove(&id) && self.get(id).is_some() {
            self.selected.insert(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn bring_forward(&mut self) {
        self.reorder(|order, selected| {
            for i in (0..order.len().saturating_sub(1)).rev() {
                if selected.contains(&order[i]) && !selected.contains(&order[i + 1]) {
                    order.swap(i, i + 1);
                }
            }
        });
    }

    pub fn send_backward(&mut self) {
        self.reorder(|order, selected| {
            for i in 1..order.len() {
                if selected.contains(&order[i]) && !selected.contains(&order[i - 1]) {
                    order.swap(i, i - 1);
                }
            }
        });
    }

    pub fn bring_to_front(&mut self) {
        self.reorder(|order, selected| {
            order.sort_by_key(|id| selected.contains(id));
        });
    }

    pub fn send_to_back(&mut self) {
        self.reorder(|order, selected| {
            order.sort_by_key(|id| !selected.contains(id));
        });
    }

    /// Apply `f` to the paint order of each tier independently, then
    /// reassign dense layers. Redact overlays never drop below a
    /// non-redact shape no matter what the caller asks for.
    fn reorder(&mut self, f: impl Fn(&mut Vec<ShapeId>, &BTreeSet<ShapeId>)) {
        if self.selected.is_empty() {
            return;
        }
        self.checkpoint();
        let mut base: Vec<ShapeId> = Vec::new();
        let mut overlay: Vec<ShapeId> = Vec::new();
        for shape in self.ordered() {
            if shape.is_overlay() {
                overlay.push(shape.id);
            } else {
                base.push(shape.id);
            }
        }
        f(&mut base, &self.selected);
        f(&mut overlay, &self.selected);
        for (layer, id) in base.iter().chain(overlay.iter()).enumerate() {
            if let Some(shape) = self.objects.iter_mut().find(|s| s.id == *id) {
                shape.layer = layer as i32;
            }
        }
    }

    /// Reassign dense layers in paint order: non-redact shapes take
    /// 0..n-1, redact overlays continue from n.
    fn reindex_layers(&mut self) {
        let order: Vec<ShapeId> = self.ordered().into_iter().map(|s| s.id).collect();
        for (layer, id) in order.into_iter().enumerate() {
            if let Some(shape) = self.objects.iter_mut().find(|s| s.id == id) {
                shape.layer = layer as i32;
            }
        }
    }

    fn prune_selection(&mut self) {
        let ids: BTreeSet<ShapeId> = self.objects.iter().map(|s| s.id).collect();
        self.selected.retain(|id| ids.contains(id));
    }

    /// Serialize shapes and grid configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Restore a store from JSON. History and selection start empty.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
