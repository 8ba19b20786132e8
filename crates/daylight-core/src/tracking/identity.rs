//! Identity comparisons that need the owning graph.

use crate::graph::ResourceGraph;
use crate::model::{AttributeValue, ResourceKey};

/// True iff `a` and `b` denote the same remote entity
///
/// Same instance always matches. Otherwise both must be persisted with
/// equal `(type, id)`; an unpersisted resource matches nothing but itself.
pub fn same_entity(graph: &ResourceGraph, a: ResourceKey, b: ResourceKey) -> bool {
    if a == b {
        return true;
    }
    match (graph.get(a), graph.get(b)) {
        (Some(left), Some(right)) => match (
            left.identity().persisted(),
            right.identity().persisted(),
        ) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        },
        _ => false,
    }
}

/// [`same_entity`] lifted over optional references (both absent is a match)
pub fn same_reference(
    graph: &ResourceGraph,
    a: Option<ResourceKey>,
    b: Option<ResourceKey>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => same_entity(graph, a, b),
        _ => false,
    }
}

/// Attribute equality: scalars by value, references by entity identity
pub fn values_equal(graph: &ResourceGraph, a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::Reference(a), AttributeValue::Reference(b)) => {
            same_entity(graph, *a, *b)
        }
        _ => a == b,
    }
}
