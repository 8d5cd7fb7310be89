use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use uuid::Uuid;
use wire::{OperationKind, Shape, ShapeKind};

use super::*;

/// Records every delivery; optionally fails each one.
struct Recorder {
    name: &'static str,
    calls: AtomicUsize,
    fail: bool,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Recorder {
    fn new(name: &'static str, fail: bool, log: Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
        Arc::new(Self { name, calls: AtomicUsize::new(0), fail, log })
    }
}

impl BoardListener for Recorder {
    fn board_changed(&self, _render: &[RenderShape]) -> Result<(), ListenerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(self.name);
        if self.fail {
            return Err("listener exploded".into());
        }
        Ok(())
    }
}

fn render_one() -> Vec<RenderShape> {
    let shape = Shape {
        id: Uuid::new_v4(),
        kind: ShapeKind::Rect,
        x: 0.0,
        y: 0.0,
        width: 10.0,
        height: 10.0,
        z_index: 0,
        props: json!({}),
        owner: None,
        seq: 1,
    };
    vec![RenderShape { shape, op: OperationKind::Create }]
}

// =============================================================
// Registration
// =============================================================

#[test]
fn subscribe_and_unsubscribe() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ListenerRegistry::new();
    assert!(registry.is_empty());

    registry.subscribe("a", Recorder::new("a", false, log.clone()));
    registry.subscribe("b", Recorder::new("b", false, log));
    assert_eq!(registry.len(), 2);

    registry.unsubscribe("a");
    assert_eq!(registry.len(), 1);
}

#[test]
fn unsubscribe_is_idempotent() {
    let mut registry = ListenerRegistry::new();
    registry.unsubscribe("ghost");
    let log = Arc::new(Mutex::new(Vec::new()));
    registry.subscribe("a", Recorder::new("a", false, log));
    registry.unsubscribe("a");
    registry.unsubscribe("a");
    assert!(registry.is_empty());
}

#[test]
fn resubscribe_replaces_in_place() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ListenerRegistry::new();
    registry.subscribe("a", Recorder::new("a-old", false, log.clone()));
    registry.subscribe("b", Recorder::new("b", false, log.clone()));
    registry.subscribe("a", Recorder::new("a-new", false, log.clone()));
    assert_eq!(registry.len(), 2);

    notify_all(&registry.entries(), &render_one());
    assert_eq!(*log.lock().unwrap(), vec!["a-new", "b"]);
}

// =============================================================
// Delivery
// =============================================================

#[test]
fn delivery_follows_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ListenerRegistry::new();
    registry.subscribe("one", Recorder::new("one", false, log.clone()));
    registry.subscribe("two", Recorder::new("two", false, log.clone()));
    registry.subscribe("three", Recorder::new("three", false, log.clone()));

    notify_all(&registry.entries(), &render_one());
    assert_eq!(*log.lock().unwrap(), vec!["one", "two", "three"]);
}

#[test]
fn failing_listener_does_not_block_the_rest() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ListenerRegistry::new();
    let healthy = Recorder::new("after", false, log.clone());
    registry.subscribe("bad", Recorder::new("bad", true, log.clone()));
    registry.subscribe("after", healthy.clone());

    notify_all(&registry.entries(), &render_one());
    assert_eq!(*log.lock().unwrap(), vec!["bad", "after"]);
    assert_eq!(healthy.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn clear_removes_everyone() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ListenerRegistry::new();
    registry.subscribe("a", Recorder::new("a", false, log.clone()));
    registry.clear();
    assert!(registry.is_empty());
    notify_all(&registry.entries(), &render_one());
    assert!(log.lock().unwrap().is_empty());
}
