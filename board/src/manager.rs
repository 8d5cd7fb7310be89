//! Board state manager: the single owner of client-side board state.
//!
//! ARCHITECTURE
//! ============
//! One manager per client process, constructed explicitly by the host's
//! composition root with an injected [`BoardCommunicator`] — no hidden
//! global instance. Local UI operations and asynchronous server broadcasts
//! both funnel through one mutex domain covering the shape store, the
//! history stacks, the checkpoint log, and the sync bridge, so the two
//! paths can never interleave mid-mutation. Listener notification always
//! happens after that critical section exits; a listener that re-enters
//! the manager finds the locks free.
//!
//! Local apply, undo, and redo are synchronous and do no I/O beyond
//! enqueuing the outbound message. Checkpoint save and fetch are the only
//! calls that wait on the network, and only up to the communicator's
//! bounded timeout.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use wire::{CheckpointSnapshot, OperationKind, Shape, ShapeId, ShapeUpdate, UserId};

use crate::checkpoint::CheckpointLog;
use crate::comm::{BoardCommunicator, CommError};
use crate::error::BoardError;
use crate::history::{BoardOp, History};
use crate::listener::{self, BoardListener, ListenerEntry, ListenerRegistry};
use crate::store::{RenderShape, ShapeStore};
use crate::sync::{SyncBridge, SyncConfig};

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

/// Everything a new subscriber needs to catch up without replaying
/// history.
#[derive(Debug)]
pub struct SubscribeReply {
    /// The full board in draw order.
    pub render_list: Vec<RenderShape>,
    /// Checkpoints saved so far this session.
    pub checkpoint_count: u64,
}

/// State guarded by the single mutex domain.
struct Inner {
    store: ShapeStore,
    history: History,
    checkpoints: CheckpointLog,
    bridge: SyncBridge,
    user: Option<UserId>,
}

impl Inner {
    fn fresh(config: SyncConfig) -> Self {
        Self {
            store: ShapeStore::new(),
            history: History::new(),
            checkpoints: CheckpointLog::new(),
            bridge: SyncBridge::new(config),
            user: None,
        }
    }
}

/// Client-side replicated state machine for a shared board.
pub struct BoardStateManager {
    comm: Arc<dyn BoardCommunicator>,
    config: SyncConfig,
    inner: Mutex<Inner>,
    listeners: Mutex<ListenerRegistry>,
}

impl BoardStateManager {
    /// Construct a ready manager with default sync tuning.
    #[must_use]
    pub fn new(comm: Arc<dyn BoardCommunicator>) -> Self {
        Self::with_config(comm, SyncConfig::default())
    }

    /// Construct a ready manager with explicit sync tuning.
    #[must_use]
    pub fn with_config(comm: Arc<dyn BoardCommunicator>, config: SyncConfig) -> Self {
        Self {
            comm,
            config: config.clone(),
            inner: Mutex::new(Inner::fresh(config)),
            listeners: Mutex::new(ListenerRegistry::new()),
        }
    }

    /// Reset to a fresh session: empty store, empty stacks, zero
    /// checkpoints, sequence expectation back to the configured start.
    /// Listeners stay registered.
    pub fn start(&self) {
        *self.inner() = Inner::fresh(self.config.clone());
    }

    /// Tear down the session: drop all state and every listener.
    pub fn stop(&self) {
        *self.inner() = Inner::fresh(self.config.clone());
        self.listeners().clear();
    }

    // --- Actor identity ---

    /// Set the local user attached to outgoing operations.
    pub fn set_user(&self, user: UserId) {
        self.inner().user = Some(user);
    }

    /// The local user, if one was set.
    #[must_use]
    pub fn user(&self) -> Option<UserId> {
        self.inner().user
    }

    // --- Queries ---

    /// Look up a shape by id.
    #[must_use]
    pub fn shape(&self, id: &ShapeId) -> Option<Shape> {
        self.inner().store.get(id).cloned()
    }

    /// The full board as a render list, in draw order.
    #[must_use]
    pub fn render_list(&self) -> Vec<RenderShape> {
        self.inner().store.render_list()
    }

    // --- Local operations ---

    /// Apply a locally issued operation, record it for undo, and transmit
    /// it to the server.
    ///
    /// Returns `Ok(true)` when the server transport accepted the message
    /// and `Ok(false)` when transmission failed — the local change is kept
    /// either way (optimistic apply; the caller should surface a desync
    /// indicator rather than roll back).
    ///
    /// # Errors
    ///
    /// [`BoardError::ShapeNotFound`] when an update or delete targets a
    /// missing shape; the store and history are untouched.
    pub fn save_operation(&self, op: BoardOp) -> Result<bool, BoardError> {
        let (render, outbound) = {
            let mut inner = self.inner();
            op.apply(&mut inner.store)?;
            inner.history.record(op.clone());
            let outbound = op.outbound(inner.user);
            (op.render_shape(), outbound)
        };
        let entries = self.listener_entries();

        let sent = match self.comm.send_operation(&outbound) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(shape = %outbound.shape_id, %error, "operation kept locally, transmission failed");
                false
            }
        };

        listener::notify_all(&entries, std::slice::from_ref(&render));
        Ok(sent)
    }

    /// Undo the most recent local operation.
    ///
    /// # Errors
    ///
    /// [`BoardError::EmptyHistory`] when there is nothing to undo.
    pub fn undo(&self) -> Result<Vec<RenderShape>, BoardError> {
        self.replay(History::undo)
    }

    /// Redo the most recently undone operation.
    ///
    /// # Errors
    ///
    /// [`BoardError::EmptyHistory`] when there is nothing to redo.
    pub fn redo(&self) -> Result<Vec<RenderShape>, BoardError> {
        self.replay(History::redo)
    }

    /// Shared undo/redo path: apply under the lock, then transmit the
    /// applied operation best-effort and notify.
    fn replay(
        &self,
        step: fn(&mut History, &mut ShapeStore) -> Result<BoardOp, BoardError>,
    ) -> Result<Vec<RenderShape>, BoardError> {
        let (applied, outbound) = {
            let mut inner = self.inner();
            let Inner { store, history, user, .. } = &mut *inner;
            let applied = step(history, store)?;
            let outbound = applied.outbound(*user);
            (applied, outbound)
        };
        let entries = self.listener_entries();

        if let Err(error) = self.comm.send_operation(&outbound) {
            tracing::warn!(shape = %outbound.shape_id, %error, "replayed operation kept locally, transmission failed");
        }

        let render = vec![applied.render_shape()];
        listener::notify_all(&entries, &render);
        Ok(render)
    }

    // --- Checkpoints ---

    /// Snapshot the board, persist it on the server, and return the new
    /// checkpoint id. Ids are assigned only once the server acknowledges,
    /// so they are strictly increasing and never reused.
    ///
    /// # Errors
    ///
    /// [`BoardError::Persistence`] when the server does not acknowledge.
    pub fn save_checkpoint(&self) -> Result<u64, BoardError> {
        let mut inner = self.inner();
        let id = inner.checkpoints.next_id();
        let snapshot = CheckpointSnapshot {
            id,
            seq: inner.bridge.last_applied(),
            shapes: inner.store.snapshot(),
        };
        self.comm.save_checkpoint(&snapshot)?;
        inner.checkpoints.commit(id);
        tracing::debug!(checkpoint = id, shapes = snapshot.shapes.len(), "checkpoint saved");
        Ok(id)
    }

    /// Fetch a checkpoint and replace the whole board with it. Clears both
    /// history stacks (the snapshot knows nothing of per-shape lineage) and
    /// resets the sync bridge to the snapshot's sequence watermark.
    ///
    /// # Errors
    ///
    /// [`BoardError::CheckpointNotFound`] for an id this session never
    /// issued or the server no longer knows; [`BoardError::Persistence`]
    /// when the request fails or times out.
    pub fn fetch_checkpoint(&self, id: u64) -> Result<Vec<RenderShape>, BoardError> {
        let render = {
            let mut inner = self.inner();
            inner.checkpoints.validate(id)?;
            let snapshot = self.comm.fetch_checkpoint(id).map_err(|e| match e {
                CommError::UnknownCheckpoint(missing) => BoardError::CheckpointNotFound(missing),
                other => BoardError::Persistence(other),
            })?;
            let next_seq = snapshot.seq + 1;
            inner.store.load_snapshot(snapshot.shapes);
            inner.history.clear();
            inner.bridge.reset(next_seq);
            inner.store.render_list()
        };

        let entries = self.listener_entries();
        listener::notify_all(&entries, &render);
        Ok(render)
    }

    // --- Inbound server updates ---

    /// Accept a batch of server broadcasts, reorder by sequence, and apply
    /// every consecutively-sequenced update. Duplicates and malformed
    /// payloads are logged and dropped without touching the store. A
    /// sequence gap past the timeout escalates to an automatic checkpoint
    /// restore.
    pub fn on_message_received(&self, updates: Vec<ShapeUpdate>) {
        let (render, resync) = {
            let mut inner = self.inner();
            for update in updates {
                if let Err(error) = update.validate() {
                    tracing::warn!(%error, "dropping malformed server update");
                    continue;
                }
                if let Err(error) = inner.bridge.accept(update) {
                    tracing::warn!(%error, "dropping server update");
                }
            }

            let drain = inner.bridge.drain(Instant::now());
            let mut render = Vec::with_capacity(drain.ready.len());
            for update in drain.ready {
                if let Some(delta) = apply_remote(&mut inner.store, update) {
                    render.push(delta);
                }
            }
            (render, drain.resync)
        };

        if !render.is_empty() {
            let entries = self.listener_entries();
            listener::notify_all(&entries, &render);
        }
        if resync {
            self.resync();
        }
    }

    /// Escalation path for an unrecoverable sequence gap: restore the
    /// latest checkpoint, if the session ever saved one.
    fn resync(&self) {
        let latest = self.inner().checkpoints.latest();
        match latest {
            Some(id) => {
                tracing::warn!(checkpoint = id, "sequence gap timed out, restoring latest checkpoint");
                if let Err(error) = self.fetch_checkpoint(id) {
                    tracing::error!(checkpoint = id, %error, "resync restore failed");
                }
            }
            None => {
                tracing::error!("sequence gap timed out with no checkpoint to restore");
            }
        }
    }

    // --- Subscriptions ---

    /// Register a listener and hand back the current board plus the
    /// checkpoint count, so a newly joined client can catch up without
    /// replaying history.
    pub fn subscribe(
        &self,
        id: impl Into<String>,
        listener: Arc<dyn BoardListener>,
    ) -> SubscribeReply {
        let (render_list, checkpoint_count) = {
            let inner = self.inner();
            (inner.store.render_list(), inner.checkpoints.count())
        };
        self.listeners().subscribe(id, listener);
        SubscribeReply { render_list, checkpoint_count }
    }

    /// Remove a listener by identifier. Idempotent.
    pub fn unsubscribe(&self, id: &str) {
        self.listeners().unsubscribe(id);
    }

    // --- Lock helpers ---

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> MutexGuard<'_, ListenerRegistry> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listener_entries(&self) -> Vec<ListenerEntry> {
        self.listeners().entries()
    }
}

/// Apply one in-order server update to the store. Returns the render delta,
/// or `None` when the update had nothing to do (delete of an unknown
/// shape).
fn apply_remote(store: &mut ShapeStore, update: ShapeUpdate) -> Option<RenderShape> {
    match update.op {
        OperationKind::Create | OperationKind::Update => {
            // Validated upstream: create/update always carries a shape.
            let mut shape = update.shape?;
            shape.seq = update.seq;
            store.put(shape.clone());
            Some(RenderShape { shape, op: update.op })
        }
        OperationKind::Delete => match store.delete(&update.shape_id) {
            Some(shape) => Some(RenderShape { shape, op: OperationKind::Delete }),
            None => {
                tracing::warn!(shape = %update.shape_id, seq = update.seq, "delete for unknown shape, ignoring");
                None
            }
        },
    }
}
