//! Error taxonomy for the board state core.
//!
//! Every failure the core can produce maps to one of these variants, and
//! every variant carries a stable grepable code through [`ErrorCode`] so a
//! host can surface machine-readable failures on its own wire. No error
//! here ever leaves the shape store partially mutated — each operation is
//! all-or-nothing.

use wire::ShapeId;

use crate::comm::CommError;

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Stable, grepable error codes for wire/UI surfaces.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

/// All failures produced by the board state core.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The referenced shape is not in the store. Recoverable.
    #[error("shape not found: {0}")]
    ShapeNotFound(ShapeId),
    /// The referenced checkpoint id was never issued. Recoverable.
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(u64),
    /// Undo or redo was requested with nothing left to replay. Recoverable.
    #[error("nothing left to undo or redo")]
    EmptyHistory,
    /// A server update reused a sequence number already seen. The update is
    /// dropped.
    #[error("duplicate server update for sequence {0}")]
    DuplicateUpdate(u64),
    /// A sequence gap outlived the resync timeout; only a full checkpoint
    /// restore can recover ordering.
    #[error("sequence gap unresolved past timeout, full resync required")]
    ResyncRequired,
    /// The server did not acknowledge a save or fetch.
    #[error("server did not acknowledge: {0}")]
    Persistence(#[from] CommError),
}

impl ErrorCode for BoardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ShapeNotFound(_) => "E_SHAPE_NOT_FOUND",
            Self::CheckpointNotFound(_) => "E_CHECKPOINT_NOT_FOUND",
            Self::EmptyHistory => "E_EMPTY_HISTORY",
            Self::DuplicateUpdate(_) => "E_DUPLICATE_UPDATE",
            Self::ResyncRequired => "E_RESYNC_REQUIRED",
            Self::Persistence(_) => "E_PERSISTENCE",
        }
    }
}
