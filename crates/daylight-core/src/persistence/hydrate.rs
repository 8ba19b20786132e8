use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::errors::{DaylightError, Result};
use crate::graph::ResourceGraph;
use crate::model::descriptor::ID_KEY;
use crate::model::identity::resource_id_from_json;
use crate::model::{AssociationDef, AssociationKind, AssociationSlot, AttributeValue, ResourceKey};
use crate::{log_op_end, log_op_error, log_op_start};
use daylight_core_types::PersistedIdentity;

/// Hydrate one persisted resource from a decoded server object
///
/// Declared attributes become both current values and snapshot. Keys named
/// after a declared association are loaded recursively as embedded data.
/// Anything else (server metadata and the like) is skipped.
///
/// # Errors
///
/// - `UnknownType` if `type_name` is not registered
/// - `InvalidPayload` if `data` (or embedded association data) has the wrong shape
/// - `MissingIdentity` if an object has no integer or string `id`
pub fn load(graph: &mut ResourceGraph, type_name: &str, data: &Value) -> Result<ResourceKey> {
    log_op_start!("load", resource_type = type_name);
    let start = std::time::Instant::now();

    let key = hydrate(graph, type_name, data).map_err(|e| {
        log_op_error!(
            "load",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "load",
        duration_ms = start.elapsed().as_millis() as u64,
        resource_type = type_name
    );
    Ok(key)
}

/// Hydrate an index response (a JSON array of objects)
///
/// # Errors
///
/// `InvalidPayload` if `data` is not an array, plus anything [`load`] returns.
pub fn load_many(
    graph: &mut ResourceGraph,
    type_name: &str,
    data: &Value,
) -> Result<Vec<ResourceKey>> {
    let items = data.as_array().ok_or_else(|| DaylightError::InvalidPayload {
        type_name: type_name.to_string(),
        reason: "expected a JSON array".to_string(),
    })?;
    items
        .iter()
        .map(|item| load(graph, type_name, item))
        .collect()
}

/// Attach lazily fetched association data to a loaded owner
///
/// Replaces any existing slot; the loaded data becomes the slot's baseline.
///
/// # Errors
///
/// - `ResourceNotFound` / `InvalidAssociation` for a bad owner or name
/// - `InvalidPayload` / `MissingIdentity` for malformed data
pub fn load_association(
    graph: &mut ResourceGraph,
    owner: ResourceKey,
    association: &str,
    data: &Value,
) -> Result<()> {
    log_op_start!("load_association", association = association);
    let start = std::time::Instant::now();

    load_association_impl(graph, owner, association, data).map_err(|e| {
        log_op_error!(
            "load_association",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "load_association",
        duration_ms = start.elapsed().as_millis() as u64,
        association = association
    );
    Ok(())
}

fn load_association_impl(
    graph: &mut ResourceGraph,
    owner: ResourceKey,
    association: &str,
    data: &Value,
) -> Result<()> {
    let type_name = graph.resource(owner)?.type_name().to_string();
    let def = graph
        .schema()
        .get(&type_name)?
        .association_def(association)
        .cloned()
        .ok_or(DaylightError::InvalidAssociation {
            type_name,
            association: association.to_string(),
        })?;
    attach(graph, owner, &def, data)
}

fn hydrate(graph: &mut ResourceGraph, type_name: &str, data: &Value) -> Result<ResourceKey> {
    let descriptor = graph.schema().get(type_name)?.clone();
    let object = as_object(type_name, data)?;

    let id = object
        .get(ID_KEY)
        .and_then(resource_id_from_json)
        .ok_or_else(|| DaylightError::MissingIdentity {
            type_name: type_name.to_string(),
        })?;

    let mut attributes = BTreeMap::new();
    let mut embedded = Vec::new();
    for (name, value) in object {
        if name == ID_KEY {
            continue;
        }
        if descriptor.has_attribute(name) {
            attributes.insert(name.clone(), scalar(type_name, name, value)?);
        } else if let Some(def) = descriptor.association_def(name) {
            embedded.push((def.clone(), value));
        } else {
            tracing::debug!(
                resource_type = type_name,
                key = name.as_str(),
                "skipping undeclared key"
            );
        }
    }

    let key = graph.insert_loaded(PersistedIdentity::new(type_name, id), attributes);
    for (def, value) in embedded {
        attach(graph, key, &def, value)?;
    }
    Ok(key)
}

/// Load association data and install it as a baselined slot on `owner`
fn attach(
    graph: &mut ResourceGraph,
    owner: ResourceKey,
    def: &AssociationDef,
    data: &Value,
) -> Result<()> {
    let slot = match def.kind {
        AssociationKind::Singular => match data {
            Value::Null => AssociationSlot::singular(None),
            Value::Object(_) => AssociationSlot::singular(Some(hydrate(graph, &def.target, data)?)),
            _ => {
                return Err(DaylightError::InvalidPayload {
                    type_name: def.target.clone(),
                    reason: format!("association '{}' expects an object or null", def.name),
                })
            }
        },
        AssociationKind::Collection => {
            let items = data.as_array().ok_or_else(|| DaylightError::InvalidPayload {
                type_name: def.target.clone(),
                reason: format!("association '{}' expects an array", def.name),
            })?;

            let mut members = Vec::with_capacity(items.len());
            for item in items {
                members.push(hydrate(graph, &def.target, item)?);
            }
            let original_members = members
                .iter()
                .filter_map(|key| graph.get(*key))
                .filter_map(|member| member.identity().persisted().cloned())
                .collect();
            AssociationSlot::collection(members, original_members)
        }
    };

    tracing::debug!(
        association = def.name.as_str(),
        targets = slot.targets().len() as u64,
        "association loaded"
    );
    graph.install_slot(owner, &def.name, slot)
}

pub(crate) fn as_object<'a>(type_name: &str, data: &'a Value) -> Result<&'a Map<String, Value>> {
    data.as_object().ok_or_else(|| DaylightError::InvalidPayload {
        type_name: type_name.to_string(),
        reason: "expected a JSON object".to_string(),
    })
}

pub(crate) fn scalar(type_name: &str, name: &str, value: &Value) -> Result<AttributeValue> {
    AttributeValue::from_json(value).ok_or_else(|| DaylightError::InvalidPayload {
        type_name: type_name.to_string(),
        reason: format!("attribute '{}' must be a scalar", name),
    })
}
