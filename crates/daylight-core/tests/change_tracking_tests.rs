#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{load_widget, new_graph};
use daylight_core::{persistence, AttributeValue};
use serde_json::json;

#[test]
fn test_attribute_changed_only_for_modified_attribute() {
    let mut graph = new_graph();
    let loaded = load_widget(&mut graph);

    graph.set_attribute(loaded.widget, "name", "other").unwrap();

    assert!(graph.attribute_changed(loaded.widget, "name").unwrap());
    assert!(!graph.attribute_changed(loaded.widget, "owner_ref").unwrap());
}

#[test]
fn test_setting_same_value_is_not_a_change() {
    let mut graph = new_graph();
    let loaded = load_widget(&mut graph);

    graph.set_attribute(loaded.widget, "name", "test").unwrap();

    assert!(!graph.is_changed(loaded.widget).unwrap());
}

#[test]
fn test_reverting_a_change_clears_it() {
    let mut graph = new_graph();
    let loaded = load_widget(&mut graph);

    graph.set_attribute(loaded.widget, "name", "other").unwrap();
    graph.set_attribute(loaded.widget, "name", "test").unwrap();

    assert!(!graph.is_changed(loaded.widget).unwrap());
}

#[test]
fn test_newly_set_attribute_is_a_change() {
    let mut graph = new_graph();
    let widget = persistence::load(&mut graph, "widget", &json!({"id": 1})).unwrap();

    graph.set_attribute(widget, "name", "first").unwrap();

    assert!(graph.attribute_changed(widget, "name").unwrap());
}

#[test]
fn test_null_differs_from_absent() {
    let mut graph = new_graph();
    let widget = persistence::load(&mut graph, "widget", &json!({"id": 1})).unwrap();

    graph
        .set_attribute(widget, "name", AttributeValue::Null)
        .unwrap();

    assert!(graph.is_changed(widget).unwrap());
}

#[test]
fn test_changes_reports_old_and_new() {
    let mut graph = new_graph();
    let loaded = load_widget(&mut graph);

    graph.set_attribute(loaded.widget, "name", "other").unwrap();
    let changes = graph.changes(loaded.widget).unwrap();

    assert_eq!(changes.len(), 1);
    let change = &changes["name"];
    assert_eq!(change.old, json!("test"));
    assert_eq!(change.new, json!("other"));
}

#[test]
fn test_changes_reports_null_for_missing_side() {
    let mut graph = new_graph();
    let widget = persistence::load(&mut graph, "widget", &json!({"id": 1})).unwrap();

    graph.set_attribute(widget, "name", "first").unwrap();
    let changes = graph.changes(widget).unwrap();

    assert_eq!(changes["name"].old, json!(null));
    assert_eq!(changes["name"].new, json!("first"));
}

#[test]
fn test_collection_membership_does_not_mark_owner_changed() {
    let mut graph = new_graph();
    let loaded = load_widget(&mut graph);
    let fresh = graph.build("gadget").unwrap();

    graph.push_member(loaded.widget, "children", fresh).unwrap();

    assert!(!graph.is_changed(loaded.widget).unwrap());
    assert!(graph.is_changed(fresh).unwrap());
}

#[test]
fn test_changed_parent_does_not_mark_owner_changed() {
    let mut graph = new_graph();
    let loaded = load_widget(&mut graph);

    graph.set_attribute(loaded.parent, "name", "other").unwrap();

    assert!(!graph.is_changed(loaded.widget).unwrap());
    assert!(graph.is_changed(loaded.parent).unwrap());
}

#[test]
fn test_integer_and_float_compare_by_json_value() {
    let schema = daylight_core::Schema::new()
        .with(daylight_core::ResourceType::new("metric").attribute("value"))
        .unwrap();
    let mut graph = daylight_core::ResourceGraph::new(schema);
    let metric = persistence::load(&mut graph, "metric", &json!({"id": 1, "value": 3})).unwrap();

    graph.set_attribute(metric, "value", 3_i64).unwrap();
    assert!(!graph.is_changed(metric).unwrap());

    graph.set_attribute(metric, "value", 3.5).unwrap();
    assert!(graph.is_changed(metric).unwrap());
}
