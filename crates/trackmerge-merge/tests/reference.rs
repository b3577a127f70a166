//! End-to-end merge scenarios: positional and identity-tracked sequences,
//! identity preservation, write counts, and depth/key/value-driven policies.

use std::collections::HashMap;

use serde_json::json;
use trackmerge_merge::{
    identity_fn, merge, track_by, IdentityFn, IdentityKey, Key, Mapping, MergeOptions, Node,
    Value, WriteLog,
};

fn node(json: serde_json::Value) -> Node {
    Node::try_from(Value::from(json)).unwrap()
}

fn value(node: &Node) -> Value {
    Value::from(node.clone())
}

fn items(node: &Node) -> Vec<Value> {
    node.as_sequence().unwrap().to_vec()
}

fn by_id() -> IdentityFn {
    identity_fn(|value, _| IdentityKey::of(&value.get_field("id")))
}

fn nested_fixture() -> (Node, Node) {
    (
        node(json!([
            {"id": 0, "a": 1, "ar": [{"a": 1}, {"a": 2}]},
            {"id": 1, "b": 2, "ar": [{"b": 3}]}
        ])),
        node(json!([
            {"id": 1, "ar": [{"a": 4}, {"b": 5}]},
            {"id": 2, "ar": [{"a": 6}]},
            {"id": 0, "a": 3}
        ])),
    )
}

/// Checks shared by every policy that tracks the outer list by id and the
/// inner `ar` lists by index.
fn assert_nested_result(a: &Node, a_before: &[Value], b: &Node, b_snapshot: &Value) {
    assert_eq!(
        value(a),
        Value::from(json!([
            {"id": 1, "b": 2, "ar": [{"a": 4, "b": 3}, {"b": 5}]},
            {"id": 2, "ar": [{"a": 6}]},
            {"id": 0, "a": 3, "ar": [{"a": 1}, {"a": 2}]}
        ]))
    );

    let after = items(a);
    let b_items = items(b);
    assert!(after[0].ptr_eq(&a_before[1]));
    assert!(after[1].ptr_eq(&b_items[1]));
    assert!(after[2].ptr_eq(&a_before[0]));

    let original_ar = a_before[1].get_field("ar");
    let original_first = original_ar.get_field("0");
    assert!(after[0].get_field("ar").ptr_eq(&original_ar));
    assert!(after[0].get_field("ar").get_field("0").ptr_eq(&original_first));
    assert!(after[1].get_field("ar").ptr_eq(&b_items[1].get_field("ar")));
    assert!(after[1]
        .get_field("ar")
        .get_field("0")
        .ptr_eq(&b_items[1].get_field("ar").get_field("0")));
    assert!(after[2].get_field("ar").ptr_eq(&a_before[0].get_field("ar")));

    assert_eq!(&value(b), b_snapshot);
}

#[test]
fn merges_simple_mappings() {
    let a = node(json!({"a": 1, "b": 2}));
    let b = node(json!({"a": 3, "c": 4}));
    merge(&a, &b, &MergeOptions::default()).unwrap();
    assert_eq!(value(&a), Value::from(json!({"a": 3, "b": 2, "c": 4})));
}

#[test]
fn merges_simple_sequences_by_index() {
    let a = node(json!([1, 2, 3]));
    let b = node(json!([4, 5]));
    merge(&a, &b, &MergeOptions::default()).unwrap();
    assert_eq!(value(&a), Value::from(json!([4, 5])));
}

#[test]
fn merges_simple_sequences_by_index_callback() {
    let a = node(json!([1, 2, 3]));
    let b = node(json!([4, 5]));
    let opts = MergeOptions::new().with_identity(|_, index| IdentityKey::from(index));
    merge(&a, &b, &opts).unwrap();
    assert_eq!(value(&a), Value::from(json!([4, 5])));
}

#[test]
fn merges_sequences_of_mappings_by_index() {
    for opts in [
        MergeOptions::default(),
        MergeOptions::new().with_identity(|_, index| IdentityKey::from(index)),
    ] {
        let a = node(json!([{"a": 1}, {"b": 2}]));
        let b = node(json!([{"a": 3}, {"c": 4}, {"d": 5}]));
        let a_before = items(&a);
        let b_snapshot = value(&b).deep_clone();

        merge(&a, &b, &opts).unwrap();

        assert_eq!(value(&a), Value::from(json!([{"a": 3}, {"b": 2, "c": 4}, {"d": 5}])));
        let after = items(&a);
        assert!(after[0].ptr_eq(&a_before[0]));
        assert!(after[1].ptr_eq(&a_before[1]));
        assert!(after[2].ptr_eq(&items(&b)[2]));
        assert_eq!(value(&b), b_snapshot);
    }
}

#[test]
fn keeps_class_tags() {
    let record = Mapping::with_class("Record");
    record.insert("a", 1);
    let a = node(json!([]));
    a.as_sequence().unwrap().push(record.clone());
    let b = node(json!([{"a": 3}]));

    merge(&a, &b, &MergeOptions::default()).unwrap();

    let first = items(&a)[0].clone();
    assert!(first.ptr_eq(&Value::from(record.clone())));
    assert_eq!(record.class().as_deref(), Some("Record"));
    assert_eq!(value(&a), Value::from(json!([{"a": 3}])));
}

#[test]
fn each_change_is_written_once() {
    let a = node(json!([{}]));
    let b = node(json!([{"a": 3}]));
    let log = WriteLog::new();
    let opts = MergeOptions::new().with_wrap_target(log.recorder());

    merge(&a, &b, &opts).unwrap();

    let element = items(&a)[0].as_node().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log.sets_at(&element, &Key::from("a")), 1);

    log.clear();
    merge(&a, &b, &opts).unwrap();
    assert!(log.is_empty(), "unchanged values must not be written");
}

#[test]
fn merges_sequences_of_mappings_by_field() {
    let a = node(json!([{"id": 0, "a": 1}, {"id": 1, "b": 2}]));
    let b = node(json!([{"id": 1, "c": 4}, {"id": 2, "d": 5}, {"id": 0, "a": 3}]));
    let a_before = items(&a);
    let b_snapshot = value(&b).deep_clone();

    merge(&a, &b, &MergeOptions::new().with_track_by_fn(|_, _, _, _| Some(by_id()))).unwrap();

    assert_eq!(
        value(&a),
        Value::from(json!([{"id": 1, "b": 2, "c": 4}, {"id": 2, "d": 5}, {"id": 0, "a": 3}]))
    );
    let after = items(&a);
    assert!(after[0].ptr_eq(&a_before[1]));
    assert!(after[1].ptr_eq(&items(&b)[1]));
    assert!(after[2].ptr_eq(&a_before[0]));
    assert_eq!(value(&b), b_snapshot);
}

#[test]
fn merges_trees_by_field() {
    let a = node(json!([{"id": 0, "a": 1, "children": [{"id": 1, "b": 2}]}]));
    let b = node(json!([
        {"id": 2, "d": 5},
        {"id": 0, "a": 3, "children": [{"id": 2, "a": 6}, {"id": 1, "c": 4}]}
    ]));
    let a_before = items(&a);
    let children_before = a_before[0].get_field("children");
    let child_before = children_before.get_field("0");
    let b_snapshot = value(&b).deep_clone();

    merge(&a, &b, &MergeOptions::new().with_track_by(track_by("id", None))).unwrap();

    assert_eq!(
        value(&a),
        Value::from(json!([
            {"id": 2, "d": 5},
            {"id": 0, "a": 3, "children": [{"id": 2, "a": 6}, {"id": 1, "b": 2, "c": 4}]}
        ]))
    );
    let after = items(&a);
    assert!(after[0].ptr_eq(&items(&b)[0]));
    assert!(after[1].ptr_eq(&a_before[0]));
    assert!(after[1].get_field("children").ptr_eq(&children_before));
    assert!(after[1].get_field("children").get_field("1").ptr_eq(&child_before));
    assert_eq!(value(&b), b_snapshot);
}

#[test]
fn differentiates_by_depth() {
    let (a, b) = nested_fixture();
    let a_before = items(&a);
    let b_snapshot = value(&b).deep_clone();

    merge(&a, &b, &MergeOptions::new().with_track_by(track_by("id", Some(0)))).unwrap();

    assert_nested_result(&a, &a_before, &b, &b_snapshot);
}

#[test]
fn differentiates_by_parent_key() {
    let (a, b) = nested_fixture();
    let a_before = items(&a);
    let b_snapshot = value(&b).deep_clone();

    let mut policies: HashMap<Option<Key>, IdentityFn> = HashMap::new();
    policies.insert(None, by_id());
    let opts = MergeOptions::new()
        .with_track_by_fn(move |_, key, _, _| policies.get(&key.cloned()).cloned());

    merge(&a, &b, &opts).unwrap();

    assert_nested_result(&a, &a_before, &b, &b_snapshot);
}

#[test]
fn differentiates_by_sequence_identity() {
    let (a, b) = nested_fixture();
    let a_before = items(&a);
    let b_snapshot = value(&b).deep_clone();

    let root = a.addr();
    let tracked = by_id();
    let opts = MergeOptions::new().with_track_by_fn(move |_, _, target, _| {
        (target.addr() == root).then(|| tracked.clone())
    });

    merge(&a, &b, &opts).unwrap();

    assert_nested_result(&a, &a_before, &b, &b_snapshot);
}

#[test]
fn tracked_merge_is_idempotent() {
    let (a, b) = nested_fixture();
    let log = WriteLog::new();
    let opts = MergeOptions::new()
        .with_track_by(track_by("id", Some(0)))
        .with_wrap_target(log.recorder());

    merge(&a, &b, &opts).unwrap();
    assert!(!log.is_empty());
    let first = value(&a).deep_clone();

    log.clear();
    merge(&a, &b, &opts).unwrap();
    assert!(log.is_empty(), "second merge wrote {:?}", log.events());
    assert_eq!(value(&a), first);
}

#[test]
fn wrap_target_redirects_writes() {
    let a = node(json!({"x": 1, "keep": true}));
    let shadow = Mapping::new();
    let redirect = shadow.clone();
    let opts = MergeOptions::new().with_wrap_target(move |_: &Node| {
        Box::new(trackmerge_merge::NodeTarget::new(redirect.clone()))
            as Box<dyn trackmerge_merge::WriteTarget>
    });

    merge(&a, &node(json!({"x": 2, "keep": true})), &opts).unwrap();

    assert_eq!(value(&a), Value::from(json!({"x": 1, "keep": true})));
    assert_eq!(Value::from(shadow), Value::from(json!({"x": 2})));
}

#[test]
fn wrap_target_is_built_lazily_once_per_level() {
    use std::cell::Cell;
    use std::rc::Rc;

    let calls = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&calls);
    let opts = MergeOptions::new().with_wrap_target(move |target: &Node| {
        counter.set(counter.get() + 1);
        Box::new(trackmerge_merge::NodeTarget::new(target.clone()))
            as Box<dyn trackmerge_merge::WriteTarget>
    });

    let a = node(json!({"same": 1, "nested": {"same": 2}}));
    merge(&a, &node(json!({"same": 1, "nested": {"same": 2}})), &opts).unwrap();
    assert_eq!(calls.get(), 0);

    merge(&a, &node(json!({"same": 5, "other": 6, "nested": {"same": 2}})), &opts).unwrap();
    assert_eq!(calls.get(), 1);
}
