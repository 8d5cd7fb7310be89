//! Shape store: the single source of truth for what is on the board now.
//!
//! A flat id → shape map with replace-by-id semantics. No ordering is
//! enforced here — sequencing is the sync bridge's job; the store only
//! answers "what does the board look like" and produces the render list
//! handed to presentation layers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wire::{OperationKind, Shape, ShapeId};

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

/// One entry of the render list handed to presentation layers: the shape
/// plus the operation that produced it, so a renderer can draw, restyle, or
/// erase without diffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderShape {
    /// The shape to draw (for delete: its last known state).
    pub shape: Shape,
    /// What happened to it.
    pub op: OperationKind,
}

/// In-memory store of live board shapes.
pub struct ShapeStore {
    shapes: HashMap<ShapeId, Shape>,
}

impl ShapeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { shapes: HashMap::new() }
    }

    /// Return a reference to a shape by id.
    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// Insert or replace a shape. A shape with the same `id` is overwritten.
    pub fn put(&mut self, shape: Shape) {
        self.shapes.insert(shape.id, shape);
    }

    /// Remove a shape by id, returning it if it was present.
    pub fn delete(&mut self, id: &ShapeId) -> Option<Shape> {
        self.shapes.remove(id)
    }

    /// Replace all shapes with a full snapshot.
    pub fn load_snapshot(&mut self, shapes: Vec<Shape>) {
        self.shapes.clear();
        for shape in shapes {
            self.shapes.insert(shape.id, shape);
        }
    }

    /// All shapes cloned and sorted by `(z_index, id)` — the order used for
    /// both render lists and checkpoint snapshots.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Shape> {
        let mut shapes: Vec<Shape> = self.shapes.values().cloned().collect();
        shapes.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        shapes
    }

    /// The full board as a render list: every shape tagged `Create`, in
    /// draw order. What a freshly subscribed client needs to paint from
    /// scratch.
    #[must_use]
    pub fn render_list(&self) -> Vec<RenderShape> {
        self.snapshot()
            .into_iter()
            .map(|shape| RenderShape { shape, op: OperationKind::Create })
            .collect()
    }

    /// Number of shapes currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if the store contains no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Default for ShapeStore {
    fn default() -> Self {
        Self::new()
    }
}
