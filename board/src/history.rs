//! History engine: bounded undo/redo over reversible board operations.
//!
//! DESIGN
//! ======
//! Each locally issued operation is recorded as a [`BoardOp`] carrying
//! enough state to invert itself (updates keep both before- and
//! after-images). Undo pops the newest entry, applies its inverse to the
//! store, and parks the forward operation on the redo stack; redo is
//! symmetric. Both stacks are bounded at [`HISTORY_CAPACITY`] entries with
//! ring-buffer eviction, so the oldest rewind point silently falls away
//! once the bound is hit — beyond it only a checkpoint restore can go
//! further back. Recording a fresh operation clears the redo stack: there
//! is no branching history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use wire::{OperationKind, OperationMessage, Shape, ShapeId, UserId};

use crate::error::BoardError;
use crate::store::{RenderShape, ShapeStore};

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

/// How many operations a user can rewind. Older entries are evicted.
pub const HISTORY_CAPACITY: usize = 7;

/// A reversible shape mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoardOp {
    /// A shape was added to the board.
    Create(Shape),
    /// A shape changed; both images are kept so the op can invert.
    Update { before: Shape, after: Shape },
    /// A shape was removed; its last state is kept so delete can invert.
    Delete(Shape),
}

impl BoardOp {
    /// Id of the shape this operation touches.
    #[must_use]
    pub fn shape_id(&self) -> ShapeId {
        match self {
            Self::Create(shape) | Self::Delete(shape) => shape.id,
            Self::Update { after, .. } => after.id,
        }
    }

    /// The wire-level kind of this operation.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Create(_) => OperationKind::Create,
            Self::Update { .. } => OperationKind::Update,
            Self::Delete(_) => OperationKind::Delete,
        }
    }

    /// The operation that exactly undoes this one.
    #[must_use]
    pub fn inverse(&self) -> BoardOp {
        match self {
            Self::Create(shape) => Self::Delete(shape.clone()),
            Self::Update { before, after } => {
                Self::Update { before: after.clone(), after: before.clone() }
            }
            Self::Delete(shape) => Self::Create(shape.clone()),
        }
    }

    /// Apply this operation to the store. All-or-nothing: on error the
    /// store is untouched.
    ///
    /// # Errors
    ///
    /// [`BoardError::ShapeNotFound`] when an update or delete targets a
    /// shape that is not in the store.
    pub fn apply(&self, store: &mut ShapeStore) -> Result<(), BoardError> {
        match self {
            Self::Create(shape) => {
                store.put(shape.clone());
                Ok(())
            }
            Self::Update { after, .. } => {
                if store.get(&after.id).is_none() {
                    return Err(BoardError::ShapeNotFound(after.id));
                }
                store.put(after.clone());
                Ok(())
            }
            Self::Delete(shape) => store
                .delete(&shape.id)
                .map(|_| ())
                .ok_or(BoardError::ShapeNotFound(shape.id)),
        }
    }

    /// The render-list delta this operation produces once applied.
    #[must_use]
    pub fn render_shape(&self) -> RenderShape {
        match self {
            Self::Create(shape) => RenderShape { shape: shape.clone(), op: OperationKind::Create },
            Self::Update { after, .. } => {
                RenderShape { shape: after.clone(), op: OperationKind::Update }
            }
            Self::Delete(shape) => RenderShape { shape: shape.clone(), op: OperationKind::Delete },
        }
    }

    /// The outbound message announcing this operation to the server.
    /// Deletes carry no payload; creates and updates carry the after-image.
    #[must_use]
    pub fn outbound(&self, user: Option<UserId>) -> OperationMessage {
        let shape = match self {
            Self::Create(shape) => Some(shape.clone()),
            Self::Update { after, .. } => Some(after.clone()),
            Self::Delete(_) => None,
        };
        OperationMessage { shape_id: self.shape_id(), op: self.kind(), shape, user }
    }
}

/// Fixed-capacity stack that evicts its oldest entry on overflow.
#[derive(Debug)]
struct BoundedStack {
    entries: VecDeque<BoardOp>,
    capacity: usize,
}

impl BoundedStack {
    fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    fn push(&mut self, op: BoardOp) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(op);
    }

    fn pop(&mut self) -> Option<BoardOp> {
        self.entries.pop_back()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Undo/redo stacks over the shape store.
///
/// An entry lives on exactly one stack at a time, or on neither once
/// evicted or cleared.
pub struct History {
    undo: BoundedStack,
    redo: BoundedStack,
}

impl History {
    /// Create empty stacks at [`HISTORY_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            undo: BoundedStack::new(HISTORY_CAPACITY),
            redo: BoundedStack::new(HISTORY_CAPACITY),
        }
    }

    /// Record a directly applied operation. Clears the redo stack; evicts
    /// the oldest undo entry when the bound is hit.
    pub fn record(&mut self, op: BoardOp) {
        self.undo.push(op);
        self.redo.clear();
    }

    /// Undo the newest recorded operation against `store`, returning the
    /// inverse operation that was applied.
    ///
    /// # Errors
    ///
    /// [`BoardError::EmptyHistory`] when there is nothing to undo. Any
    /// apply failure leaves the entry on the undo stack.
    pub fn undo(&mut self, store: &mut ShapeStore) -> Result<BoardOp, BoardError> {
        let op = self.undo.pop().ok_or(BoardError::EmptyHistory)?;
        let inverse = op.inverse();
        if let Err(e) = inverse.apply(store) {
            self.undo.push(op);
            return Err(e);
        }
        self.redo.push(op);
        Ok(inverse)
    }

    /// Redo the newest undone operation against `store`, returning the
    /// forward operation that was applied.
    ///
    /// # Errors
    ///
    /// [`BoardError::EmptyHistory`] when there is nothing to redo. Any
    /// apply failure leaves the entry on the redo stack.
    pub fn redo(&mut self, store: &mut ShapeStore) -> Result<BoardOp, BoardError> {
        let op = self.redo.pop().ok_or(BoardError::EmptyHistory)?;
        if let Err(e) = op.apply(store) {
            self.redo.push(op);
            return Err(e);
        }
        self.undo.push(op.clone());
        Ok(op)
    }

    /// Drop both stacks. A checkpoint restore invalidates local lineage.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Number of operations currently undoable.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of operations currently redoable.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
