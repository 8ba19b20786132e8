use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::identity::{same_reference, values_equal};
use crate::graph::ResourceGraph;
use crate::model::{AssociationSlot, Resource};

/// Old and new wire value of one changed attribute
///
/// `old` is `null` when the snapshot never had the key; `new` is `null`
/// when the current attributes dropped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub old: Value,
    pub new: Value,
}

/// True iff attribute `name` differs from its snapshot
///
/// A key present on only one side counts as changed.
pub fn attribute_changed(graph: &ResourceGraph, resource: &Resource, name: &str) -> bool {
    match (resource.attribute(name), resource.original_attribute(name)) {
        (None, None) => false,
        (Some(current), Some(original)) => !values_equal(graph, current, original),
        _ => true,
    }
}

/// True if the resource is new, has a changed attribute, or has a singular
/// association whose current reference differs in identity from its baseline
///
/// Shallow: referenced resources' own edits are not considered, and
/// collection slots never affect the owner.
pub fn is_changed(graph: &ResourceGraph, resource: &Resource) -> bool {
    if resource.is_new() {
        return true;
    }

    if attribute_names(resource).any(|name| attribute_changed(graph, resource, name)) {
        return true;
    }

    resource.associations().values().any(|slot| match slot {
        AssociationSlot::Singular { current, original } => {
            !same_reference(graph, *current, *original)
        }
        AssociationSlot::Collection { .. } => false,
    })
}

/// Every changed attribute with its old and new wire value
pub fn changes(graph: &ResourceGraph, resource: &Resource) -> BTreeMap<String, AttributeChange> {
    attribute_names(resource)
        .filter(|name| attribute_changed(graph, resource, name))
        .map(|name| {
            let old = resource
                .original_attribute(name)
                .map(|v| v.to_json(graph))
                .unwrap_or(Value::Null);
            let new = resource
                .attribute(name)
                .map(|v| v.to_json(graph))
                .unwrap_or(Value::Null);
            (name.to_string(), AttributeChange { old, new })
        })
        .collect()
}

/// Union of current and snapshot attribute names, sorted
fn attribute_names(resource: &Resource) -> impl Iterator<Item = &str> {
    resource
        .attributes()
        .keys()
        .chain(resource.original_attributes().keys())
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
}
