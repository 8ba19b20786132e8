use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

use super::hydrate::{as_object, scalar};
use crate::errors::Result;
use crate::graph::ResourceGraph;
use crate::model::descriptor::ID_KEY;
use crate::model::identity::resource_id_from_json;
use crate::model::{AssociationSlot, AttributeValue, ResourceKey};
use crate::{log_op_end, log_op_error, log_op_start};
use daylight_core_types::ResourceId;

/// Re-baseline a resource graph after a successful write
///
/// When `response` is given it is the server's representation of the saved
/// root: its `id` is assigned (new → persisted), declared attribute values
/// overwrite current ones, and embedded association data is applied to the
/// current members positionally. Then every resource reachable from `key`
/// gets its snapshot replaced by its current state.
///
/// Reference-valued attributes keep their in-memory reference even if the
/// response carries the referenced id.
///
/// The whole response is validated before anything is written, so a failed
/// commit leaves ids, attributes and snapshots as they were.
///
/// # Errors
///
/// - `ResourceNotFound` if `key` is not in the graph
/// - `InvalidPayload` if the response, or any nested part of it, has the
///   wrong shape
pub fn commit(
    graph: &mut ResourceGraph,
    key: ResourceKey,
    response: Option<&Value>,
) -> Result<()> {
    log_op_start!("commit", resource = %key);
    let start = std::time::Instant::now();

    let result = commit_impl(graph, key, response);
    match result {
        Ok(snapshotted) => {
            log_op_end!(
                "commit",
                duration_ms = start.elapsed().as_millis() as u64,
                visited = snapshotted as u64
            );
            Ok(())
        }
        Err(e) => {
            log_op_error!(
                "commit",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(e)
        }
    }
}

fn commit_impl(
    graph: &mut ResourceGraph,
    key: ResourceKey,
    response: Option<&Value>,
) -> Result<usize> {
    graph.resource(key)?;
    let updates = match response {
        Some(response) => {
            let mut updates = Vec::new();
            plan_response(graph, key, response, &mut HashSet::new(), &mut updates)?;
            updates
        }
        None => Vec::new(),
    };

    // Every check has passed; nothing below fails on response data
    for update in updates {
        apply_update(graph, update)?;
    }
    snapshot_reachable(graph, key)
}

/// Server data for one resource, validated but not yet written
struct PendingUpdate {
    key: ResourceKey,
    id: Option<ResourceId>,
    attributes: Vec<(String, AttributeValue)>,
}

/// Validate a server response against `key` and, recursively, its loaded
/// associations, collecting the writes without touching the graph
fn plan_response(
    graph: &ResourceGraph,
    key: ResourceKey,
    response: &Value,
    planned: &mut HashSet<ResourceKey>,
    updates: &mut Vec<PendingUpdate>,
) -> Result<()> {
    if !planned.insert(key) {
        return Ok(());
    }

    let resource = graph.resource(key)?;
    let type_name = resource.type_name();
    let descriptor = graph.schema().get(type_name)?;
    let object = as_object(type_name, response)?;

    let mut attributes = Vec::new();
    for (name, value) in object {
        if descriptor.has_attribute(name) {
            let keeps_reference = matches!(
                resource.attribute(name),
                Some(AttributeValue::Reference(_))
            );
            if !keeps_reference {
                attributes.push((name.clone(), scalar(type_name, name, value)?));
            }
            continue;
        }

        match (resource.association(name), value) {
            (
                Some(AssociationSlot::Singular {
                    current: Some(target),
                    ..
                }),
                Value::Object(_),
            ) => plan_response(graph, *target, value, planned, updates)?,
            (Some(AssociationSlot::Collection { members, .. }), Value::Array(items)) => {
                for (member, item) in members.iter().zip(items) {
                    plan_response(graph, *member, item, planned, updates)?;
                }
            }
            (Some(_), _) => {
                tracing::debug!(
                    resource_type = type_name,
                    association = name.as_str(),
                    "ignoring unmatched nested response data"
                );
            }
            (None, _) => {}
        }
    }

    updates.push(PendingUpdate {
        key,
        id: object.get(ID_KEY).and_then(resource_id_from_json),
        attributes,
    });
    Ok(())
}

fn apply_update(graph: &mut ResourceGraph, update: PendingUpdate) -> Result<()> {
    if let Some(id) = update.id {
        if graph.resource(update.key)?.id() != Some(&id) {
            tracing::debug!(resource = %update.key, id = %id, "assigning id");
        }
        graph.assign_id(update.key, id)?;
    }
    graph
        .resource_mut(update.key)?
        .attributes
        .extend(update.attributes);
    Ok(())
}

/// Replace the snapshot of every resource reachable from `root`; returns the count
fn snapshot_reachable(graph: &mut ResourceGraph, root: ResourceKey) -> Result<usize> {
    let mut seen = HashSet::new();
    let mut stack = vec![root];

    while let Some(key) = stack.pop() {
        if !seen.insert(key) {
            continue;
        }

        let mut slots = Vec::new();
        for (name, slot) in graph.resource(key)?.associations() {
            stack.extend(slot.targets());
            if let AssociationSlot::Collection { members, .. } = slot {
                let persisted: BTreeSet<_> = members
                    .iter()
                    .filter_map(|member| graph.get(*member))
                    .filter_map(|member| member.identity().persisted().cloned())
                    .collect();
                if persisted.len() < members.len() {
                    tracing::debug!(
                        association = name.as_str(),
                        "collection still holds unpersisted members"
                    );
                }
                slots.push((name.clone(), persisted));
            }
        }

        let resource = graph.resource_mut(key)?;
        resource.original_attributes = resource.attributes.clone();
        for slot in resource.associations.values_mut() {
            if let AssociationSlot::Singular { current, original } = slot {
                *original = *current;
            }
        }
        for (name, persisted) in slots {
            if let Some(AssociationSlot::Collection {
                original_members, ..
            }) = resource.associations.get_mut(&name)
            {
                *original_members = persisted;
            }
        }
    }

    Ok(seen.len())
}
