//! Client-side replicated state machine for a multi-user shared board.
//!
//! ARCHITECTURE
//! ============
//! The UI issues an operation → the history engine records it for undo →
//! the shape store mutates → the communicator carries it to the server.
//! Server broadcasts come back sequence-tagged, are reordered by the sync
//! bridge, applied strictly in order, and every mutation fans out a
//! render list to registered listeners. Checkpoints give named full-board
//! snapshots that cut across all of it.
//!
//! The crate owns no sockets and touches no pixels: transports implement
//! [`BoardCommunicator`], renderers implement [`BoardListener`].

pub mod checkpoint;
pub mod comm;
pub mod error;
pub mod history;
pub mod listener;
pub mod manager;
pub mod store;
pub mod sync;

pub use checkpoint::CheckpointLog;
pub use comm::{BoardCommunicator, CommError};
pub use error::{BoardError, ErrorCode};
pub use history::{BoardOp, HISTORY_CAPACITY, History};
pub use listener::{BoardListener, ListenerError, ListenerRegistry};
pub use manager::{BoardStateManager, SubscribeReply};
pub use store::{RenderShape, ShapeStore};
pub use sync::{DEFAULT_RESYNC_TIMEOUT, Drain, SyncBridge, SyncConfig};
