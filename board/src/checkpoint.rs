//! Checkpoint log: sequential identifiers for full-board snapshots.
//!
//! The log only tracks which ids this session has issued; the snapshots
//! themselves live on the server and travel through the communicator. Ids
//! start at 1, increase strictly, and are never reused. A fetch for an id
//! the session never issued is rejected locally before any network round
//! trip.

use crate::error::BoardError;

#[cfg(test)]
#[path = "checkpoint_test.rs"]
mod checkpoint_test;

/// Tracker for checkpoint ids issued during this session.
#[derive(Debug, Default)]
pub struct CheckpointLog {
    issued: u64,
}

impl CheckpointLog {
    /// Create a log with no checkpoints issued.
    #[must_use]
    pub fn new() -> Self {
        Self { issued: 0 }
    }

    /// Number of checkpoints saved so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.issued
    }

    /// The id the next successful save will take.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.issued + 1
    }

    /// The most recently issued id, if any.
    #[must_use]
    pub fn latest(&self) -> Option<u64> {
        (self.issued > 0).then_some(self.issued)
    }

    /// Mark `id` as issued after the server acknowledged the save.
    pub fn commit(&mut self, id: u64) {
        self.issued = self.issued.max(id);
    }

    /// Reject ids this session never issued.
    ///
    /// # Errors
    ///
    /// [`BoardError::CheckpointNotFound`] for zero or not-yet-issued ids.
    pub fn validate(&self, id: u64) -> Result<(), BoardError> {
        if id == 0 || id > self.issued {
            return Err(BoardError::CheckpointNotFound(id));
        }
        Ok(())
    }
}
