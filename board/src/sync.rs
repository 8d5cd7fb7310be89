//! Server sync bridge: reorders inbound broadcasts by server sequence.
//!
//! DESIGN
//! ======
//! The network may deliver broadcasts out of order. A min-heap keyed on the
//! server-assigned sequence number holds early arrivals until every earlier
//! update has landed, and `drain` releases a strictly in-order run for
//! application. Equal sequence numbers are a protocol fault and the second
//! arrival is dropped as a duplicate. A gap that outlives the configured
//! timeout cannot be waited out — `drain` then reports that a full
//! checkpoint resync is required and abandons the queued tail, which the
//! restore will supersede anyway.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::time::{Duration, Instant};

use wire::ShapeUpdate;

use crate::error::BoardError;

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

/// How long a sequence gap may persist before escalating to a full resync.
pub const DEFAULT_RESYNC_TIMEOUT: Duration = Duration::from_secs(3);

/// Tunables for the sync bridge.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Gap age at which `drain` escalates to `ResyncRequired`.
    pub resync_timeout: Duration,
    /// First sequence number expected from the server.
    pub initial_seq: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { resync_timeout: DEFAULT_RESYNC_TIMEOUT, initial_seq: 1 }
    }
}

/// Heap entry ordered by sequence number only.
#[derive(Debug)]
struct Pending(ShapeUpdate);

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.0.seq == other.0.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.seq.cmp(&other.0.seq)
    }
}

/// Result of draining the bridge.
#[derive(Debug)]
pub struct Drain {
    /// Updates released strictly in sequence order, ready to apply.
    pub ready: Vec<ShapeUpdate>,
    /// True when a gap outlived the timeout and only a checkpoint restore
    /// can recover; the queued tail has been dropped.
    pub resync: bool,
}

/// Reordering buffer between the network layer and the shape store.
pub struct SyncBridge {
    config: SyncConfig,
    queue: BinaryHeap<Reverse<Pending>>,
    queued: HashSet<u64>,
    next_seq: u64,
    gap_since: Option<Instant>,
}

impl SyncBridge {
    /// Create a bridge expecting `config.initial_seq` first.
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        let next_seq = config.initial_seq;
        Self {
            config,
            queue: BinaryHeap::new(),
            queued: HashSet::new(),
            next_seq,
            gap_since: None,
        }
    }

    /// The next sequence number the bridge will release.
    #[must_use]
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// The highest sequence number applied so far (0 if none).
    #[must_use]
    pub fn last_applied(&self) -> u64 {
        self.next_seq.saturating_sub(1)
    }

    /// Number of updates parked waiting for earlier sequences.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Park an inbound update for ordered release.
    ///
    /// # Errors
    ///
    /// [`BoardError::DuplicateUpdate`] when the sequence number was already
    /// released or is already parked; the update must be dropped.
    pub fn accept(&mut self, update: ShapeUpdate) -> Result<(), BoardError> {
        let seq = update.seq;
        if seq < self.next_seq || !self.queued.insert(seq) {
            return Err(BoardError::DuplicateUpdate(seq));
        }
        self.queue.push(Reverse(Pending(update)));
        Ok(())
    }

    /// Release every consecutively-sequenced update, and check whether a
    /// remaining gap has outlived the timeout.
    pub fn drain(&mut self, now: Instant) -> Drain {
        let mut ready = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|Reverse(head)| head.0.seq == self.next_seq)
        {
            if let Some(Reverse(Pending(update))) = self.queue.pop() {
                self.queued.remove(&update.seq);
                self.next_seq += 1;
                ready.push(update);
            }
        }

        if !ready.is_empty() {
            // Progress was made; any remaining gap is a new one.
            self.gap_since = None;
        }

        let mut resync = false;
        if self.queue.is_empty() {
            self.gap_since = None;
        } else {
            match self.gap_since {
                None => self.gap_since = Some(now),
                Some(since) if now.duration_since(since) >= self.config.resync_timeout => {
                    tracing::warn!(
                        expected = self.next_seq,
                        parked = self.queue.len(),
                        "sequence gap outlived resync timeout, dropping queued tail"
                    );
                    self.queue.clear();
                    self.queued.clear();
                    self.gap_since = None;
                    resync = true;
                }
                Some(_) => {}
            }
        }

        Drain { ready, resync }
    }

    /// Forget everything queued and expect `next_seq` next. Called after a
    /// checkpoint restore supersedes the in-flight stream.
    pub fn reset(&mut self, next_seq: u64) {
        self.queue.clear();
        self.queued.clear();
        self.gap_since = None;
        self.next_seq = next_seq;
    }
}
