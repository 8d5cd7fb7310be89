//! Shared board and wire model for the whiteboard client core.
//!
//! This crate owns the logical message shapes exchanged between a board
//! client and the board server: the shapes themselves, server broadcasts
//! (`ShapeUpdate`), client operations (`OperationMessage`), and full board
//! snapshots (`CheckpointSnapshot`). It deliberately stops at the logical
//! layer — byte encoding is the job of whatever communicator carries these
//! types, so `board` and any host binary can share one model without
//! agreeing on a transport.

use serde::{Deserialize, Serialize};
use uuid::Uuid;


/// Unique identifier for a board shape. Assigned by the owning client.
pub type ShapeId = Uuid;

/// Unique identifier for a user.
pub type UserId = Uuid;

/// The kind of a board shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rect,
    /// Ellipse inscribed within the bounding box.
    Ellipse,
    /// Straight line segment between two endpoints stored in `props`.
    Line,
    /// Directed arrow between two endpoints stored in `props`.
    Arrow,
    /// Freehand stroke; points stored in `props`.
    Freehand,
    /// Text block.
    Text,
}

/// A single drawable board element, as stored on the client and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Unique identifier for this shape.
    pub id: ShapeId,
    /// Shape type.
    pub kind: ShapeKind,
    /// Left edge of the bounding box in world coordinates.
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    pub y: f64,
    /// Width of the bounding box in world coordinates.
    pub width: f64,
    /// Height of the bounding box in world coordinates.
    pub height: f64,
    /// Stacking order; lower values are drawn beneath higher values.
    pub z_index: i64,
    /// Open-ended per-kind render attributes (fill, stroke, points, text).
    pub props: serde_json::Value,
    /// User who owns the shape, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,
    /// Server sequence number of the last update applied to this shape.
    /// Zero until the server has acknowledged the shape at least once.
    pub seq: u64,
}

/// Typed access to common render attributes in a `Shape.props` JSON value.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    /// Wrap a reference to a `props` JSON value for typed access.
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Fill color as a CSS color string. Defaults to `"#D94B4B"` when absent.
    #[must_use]
    pub fn fill(&self) -> &str {
        self.value
            .get("fill")
            .and_then(|v| v.as_str())
            .unwrap_or("#D94B4B")
    }

    /// Stroke color as a CSS color string. Defaults to `"#1F1A17"` when absent.
    #[must_use]
    pub fn stroke(&self) -> &str {
        self.value
            .get("stroke")
            .and_then(|v| v.as_str())
            .unwrap_or("#1F1A17")
    }

    /// Stroke width in world units. Defaults to `1.0` when absent.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        self.value
            .get("stroke_width")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(1.0)
    }

    /// Text content displayed on the shape. Empty string when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.value
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}

/// What an operation does to its target shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

/// Error returned by [`ShapeUpdate::validate`].
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// A create or update arrived without the shape it claims to carry.
    #[error("update for shape {0} is missing its shape payload")]
    MissingShape(ShapeId),
    /// The embedded shape's id disagrees with the update's `shape_id`.
    #[error("update for shape {expected} carries payload for shape {actual}")]
    IdMismatch { expected: ShapeId, actual: ShapeId },
}

/// A server broadcast: one shape mutation tagged with the server-assigned
/// sequence number that fixes its position in the global order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeUpdate {
    /// Target shape.
    pub shape_id: ShapeId,
    /// What happened to it.
    pub op: OperationKind,
    /// Server-assigned, monotonically increasing order key.
    pub seq: u64,
    /// Full post-operation shape. Present for create/update, absent for delete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    /// User who issued the operation, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
}

impl ShapeUpdate {
    /// Check the payload is internally consistent before applying it.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::MissingShape`] when a create/update has no
    /// shape, and [`PayloadError::IdMismatch`] when the embedded shape's id
    /// does not match `shape_id`.
    pub fn validate(&self) -> Result<(), PayloadError> {
        match self.op {
            OperationKind::Create | OperationKind::Update => match &self.shape {
                None => Err(PayloadError::MissingShape(self.shape_id)),
                Some(shape) if shape.id != self.shape_id => Err(PayloadError::IdMismatch {
                    expected: self.shape_id,
                    actual: shape.id,
                }),
                Some(_) => Ok(()),
            },
            OperationKind::Delete => Ok(()),
        }
    }
}

/// A client-issued operation, sent to the server for sequencing and
/// broadcast. Carries no sequence number — the server assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationMessage {
    /// Target shape.
    pub shape_id: ShapeId,
    /// What the client did to it.
    pub op: OperationKind,
    /// Full post-operation shape. Present for create/update, absent for delete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    /// User who issued the operation, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
}

/// A full, immutable snapshot of board state at a point in time.
///
/// `seq` records the last server sequence number applied when the snapshot
/// was taken, so a restore can resume sequencing right after it instead of
/// replaying history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointSnapshot {
    /// Checkpoint identifier. Strictly increasing per board, never reused.
    pub id: u64,
    /// Server sequence watermark at snapshot time.
    pub seq: u64,
    /// Every shape on the board at snapshot time.
    pub shapes: Vec<Shape>,
}
