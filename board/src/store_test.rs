#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;
use wire::{Shape, ShapeKind};

use super::*;

fn make_shape(z: i64) -> Shape {
    Shape {
        id: Uuid::new_v4(),
        kind: ShapeKind::Rect,
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 80.0,
        z_index: z,
        props: json!({}),
        owner: None,
        seq: 0,
    }
}

fn make_shape_with_id(id: Uuid, z: i64) -> Shape {
    Shape { id, ..make_shape(z) }
}

// =============================================================
// put / get / delete
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = ShapeStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}

#[test]
fn put_and_get() {
    let mut store = ShapeStore::new();
    let shape = make_shape(0);
    let id = shape.id;
    store.put(shape);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&id).map(|s| s.id), Some(id));
}

#[test]
fn get_missing_returns_none() {
    let store = ShapeStore::new();
    assert!(store.get(&Uuid::new_v4()).is_none());
}

#[test]
fn put_replaces_same_id() {
    let mut store = ShapeStore::new();
    let id = Uuid::new_v4();
    store.put(make_shape_with_id(id, 0));
    let mut replacement = make_shape_with_id(id, 0);
    replacement.x = 999.0;
    store.put(replacement);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&id).map(|s| s.x), Some(999.0));
}

#[test]
fn delete_returns_removed_shape() {
    let mut store = ShapeStore::new();
    let shape = make_shape(0);
    let id = shape.id;
    store.put(shape);
    let removed = store.delete(&id);
    assert_eq!(removed.map(|s| s.id), Some(id));
    assert!(store.is_empty());
}

#[test]
fn delete_missing_returns_none() {
    let mut store = ShapeStore::new();
    assert!(store.delete(&Uuid::new_v4()).is_none());
}

#[test]
fn delete_does_not_affect_others() {
    let mut store = ShapeStore::new();
    let a = make_shape(0);
    let b = make_shape(0);
    let (id_a, id_b) = (a.id, b.id);
    store.put(a);
    store.put(b);
    store.delete(&id_a);
    assert_eq!(store.len(), 1);
    assert!(store.get(&id_b).is_some());
}

// =============================================================
// load_snapshot
// =============================================================

#[test]
fn load_snapshot_replaces_everything() {
    let mut store = ShapeStore::new();
    let old = make_shape(0);
    let old_id = old.id;
    store.put(old);

    let new = make_shape(1);
    let new_id = new.id;
    store.load_snapshot(vec![new, make_shape(2)]);

    assert_eq!(store.len(), 2);
    assert!(store.get(&old_id).is_none());
    assert!(store.get(&new_id).is_some());
}

#[test]
fn load_empty_snapshot_clears_store() {
    let mut store = ShapeStore::new();
    store.put(make_shape(0));
    store.load_snapshot(vec![]);
    assert!(store.is_empty());
}

// =============================================================
// snapshot / render_list ordering
// =============================================================

#[test]
fn snapshot_sorts_by_z_index() {
    let mut store = ShapeStore::new();
    store.put(make_shape(3));
    store.put(make_shape(1));
    store.put(make_shape(2));

    let shapes = store.snapshot();
    let zs: Vec<i64> = shapes.iter().map(|s| s.z_index).collect();
    assert_eq!(zs, vec![1, 2, 3]);
}

#[test]
fn snapshot_ties_break_by_id() {
    let mut store = ShapeStore::new();
    let id_low = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
    let id_high = Uuid::parse_str("ffffffff-ffff-ffff-ffff-ffffffffffff").unwrap();
    store.put(make_shape_with_id(id_high, 1));
    store.put(make_shape_with_id(id_low, 1));

    let shapes = store.snapshot();
    assert_eq!(shapes[0].id, id_low);
    assert_eq!(shapes[1].id, id_high);
}

#[test]
fn render_list_marks_everything_create() {
    let mut store = ShapeStore::new();
    store.put(make_shape(2));
    store.put(make_shape(0));

    let render = store.render_list();
    assert_eq!(render.len(), 2);
    assert!(render.iter().all(|r| r.op == wire::OperationKind::Create));
    assert!(render[0].shape.z_index <= render[1].shape.z_index);
}

#[test]
fn render_list_empty_board() {
    let store = ShapeStore::new();
    assert!(store.render_list().is_empty());
}
