//! Listener registry: fan-out of render lists to presentation layers.
//!
//! Delivery is synchronous and in registration order, always after the
//! manager's mutating critical section has exited. Each listener runs
//! inside its own error boundary — a failing subscriber is logged and
//! skipped so it can never block delivery to the rest.

use std::sync::Arc;

use crate::store::RenderShape;

#[cfg(test)]
#[path = "listener_test.rs"]
mod listener_test;

/// Error type listeners may return from a delivery.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A presentation-layer subscriber to board state changes.
pub trait BoardListener: Send + Sync {
    /// Called synchronously after every board mutation with the render-list
    /// delta (or the full list after a restore).
    ///
    /// # Errors
    ///
    /// Any error is logged by the registry and the listener is skipped for
    /// this delivery only.
    fn board_changed(&self, render: &[RenderShape]) -> Result<(), ListenerError>;
}

/// One registered subscriber.
#[derive(Clone)]
pub struct ListenerEntry {
    pub(crate) id: String,
    pub(crate) listener: Arc<dyn BoardListener>,
}

/// Ordered set of subscribers keyed by caller-chosen identifier.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a listener. Re-subscribing an existing identifier replaces
    /// the listener in place, keeping its original position in delivery
    /// order.
    pub fn subscribe(&mut self, id: impl Into<String>, listener: Arc<dyn BoardListener>) {
        let id = id.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.listener = listener;
        } else {
            self.entries.push(ListenerEntry { id, listener });
        }
    }

    /// Remove a listener by identifier. Idempotent.
    pub fn unsubscribe(&mut self, id: &str) {
        self.entries.retain(|e| e.id != id);
    }

    /// Snapshot of the current entries, for delivery outside any lock.
    #[must_use]
    pub fn entries(&self) -> Vec<ListenerEntry> {
        self.entries.clone()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every listener. Called on manager stop.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Deliver `render` to every entry in order, isolating failures per
/// listener.
pub(crate) fn notify_all(entries: &[ListenerEntry], render: &[RenderShape]) {
    for entry in entries {
        if let Err(error) = entry.listener.board_changed(render) {
            tracing::warn!(listener = %entry.id, %error, "listener failed, skipping");
        }
    }
}
