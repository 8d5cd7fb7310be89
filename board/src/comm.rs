//! Communicator seam between the board core and the network layer.
//!
//! The core never opens sockets. A host supplies a [`BoardCommunicator`]
//! at construction time, and the manager calls through it for the three
//! outbound message kinds the protocol defines. Checkpoint save and fetch
//! are bounded-timeout requests; the implementor must return
//! [`CommError::Timeout`] rather than block indefinitely.

use std::time::Duration;

use wire::{CheckpointSnapshot, OperationMessage};

/// Failures reported by a communicator implementation.
#[derive(Debug, thiserror::Error)]
pub enum CommError {
    /// The transport could not accept or deliver the message.
    #[error("transport failure: {0}")]
    Transport(String),
    /// A bounded-timeout request got no answer in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The server does not know the requested checkpoint.
    #[error("checkpoint {0} unknown to the server")]
    UnknownCheckpoint(u64),
}

/// Outbound half of the board protocol, implemented by the host's network
/// layer and injected into the manager.
pub trait BoardCommunicator: Send + Sync {
    /// Enqueue an operation for the server to sequence and broadcast.
    /// Must not block on network I/O.
    ///
    /// # Errors
    ///
    /// [`CommError::Transport`] when the message cannot be enqueued.
    fn send_operation(&self, op: &OperationMessage) -> Result<(), CommError>;

    /// Persist a checkpoint snapshot on the server. Blocks up to the
    /// implementor's bounded timeout waiting for the acknowledgement.
    ///
    /// # Errors
    ///
    /// [`CommError::Transport`] or [`CommError::Timeout`] when the server
    /// does not acknowledge.
    fn save_checkpoint(&self, snapshot: &CheckpointSnapshot) -> Result<(), CommError>;

    /// Retrieve a checkpoint snapshot by id. Blocks up to the implementor's
    /// bounded timeout.
    ///
    /// # Errors
    ///
    /// [`CommError::UnknownCheckpoint`] for an id the server never stored,
    /// [`CommError::Transport`] or [`CommError::Timeout`] otherwise.
    fn fetch_checkpoint(&self, id: u64) -> Result<CheckpointSnapshot, CommError>;
}
