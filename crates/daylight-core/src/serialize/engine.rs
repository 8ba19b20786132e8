//! Recursive payload assembly.

use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

use crate::config::{CyclePolicy, EngineConfig};
use crate::graph::ResourceGraph;
use crate::model::descriptor::ID_KEY;
use crate::model::{AssociationSlot, EntityKey, Resource, ResourceKey};
use crate::tracking::{is_changed, same_reference};
use crate::{log_op_end, log_op_start};
use daylight_core_types::PersistedIdentity;

/// Outgoing request body: attribute name → wire value, plus nested keys
pub type Payload = serde_json::Map<String, Value>;

/// Serialize `resource` into its minimal partial-update payload
///
/// Emits every own attribute (and `id` once persisted, unless disabled in
/// the config), then one nested key per loaded association whose subtree
/// holds a change. Unloaded associations are never emitted.
pub fn serialize(graph: &ResourceGraph, resource: &Resource) -> Payload {
    log_op_start!("serialize", resource_type = resource.type_name());
    let start = std::time::Instant::now();

    let mut walker = Walker::new(graph);
    let serialized = walker.visit(resource);

    log_op_end!(
        "serialize",
        duration_ms = start.elapsed().as_millis() as u64,
        resource_type = resource.type_name(),
        visited = walker.visited as u64,
        nested_keys = walker.nested_keys as u64
    );

    serialized.payload
}

/// Result of serializing one subtree
struct Serialized {
    payload: Payload,
    /// The payload carries at least one nested association key
    nested: bool,
}

struct Walker<'g> {
    graph: &'g ResourceGraph,
    config: &'g EngineConfig,
    /// Entities on the current root-to-node path
    visiting: HashSet<EntityKey>,
    visited: usize,
    nested_keys: usize,
}

impl<'g> Walker<'g> {
    fn new(graph: &'g ResourceGraph) -> Self {
        Self {
            graph,
            config: graph.config(),
            visiting: HashSet::new(),
            visited: 0,
            nested_keys: 0,
        }
    }

    fn visit(&mut self, resource: &Resource) -> Serialized {
        let entity = resource.entity_key();
        self.visiting.insert(entity.clone());
        self.visited += 1;

        let mut payload = self.own_attributes(resource);
        let mut nested = false;

        for (name, slot) in resource.associations() {
            let value = match slot {
                AssociationSlot::Singular { current, original } => {
                    self.singular(*current, *original)
                }
                AssociationSlot::Collection {
                    members,
                    original_members,
                } => self.collection(members, original_members),
            };

            if let Some(value) = value {
                tracing::debug!(
                    resource_type = resource.type_name(),
                    association = name.as_str(),
                    "including nested association"
                );
                payload.insert(self.config.nested_key(name), value);
                self.nested_keys += 1;
                nested = true;
            }
        }

        self.visiting.remove(&entity);
        Serialized { payload, nested }
    }

    /// Serialize a child, honouring the cycle policy on re-entry
    ///
    /// `None` means the child is dropped from its parent's nested key.
    fn child(&mut self, resource: &Resource) -> Option<Serialized> {
        if !self.visiting.contains(&resource.entity_key()) {
            return Some(self.visit(resource));
        }

        tracing::trace!(
            resource_type = resource.type_name(),
            policy = ?self.config.cycle_policy,
            "cycle re-entry"
        );
        match self.config.cycle_policy {
            CyclePolicy::AttributesOnly => Some(Serialized {
                payload: self.own_attributes(resource),
                nested: false,
            }),
            CyclePolicy::IdentityOnly => Some(Serialized {
                payload: self.identity_only(resource),
                nested: false,
            }),
            CyclePolicy::Omit => None,
        }
    }

    fn singular(
        &mut self,
        current: Option<ResourceKey>,
        original: Option<ResourceKey>,
    ) -> Option<Value> {
        let Some(current_key) = current else {
            // Cleared: emit an explicit null only if something was there before
            return original.map(|_| Value::Null);
        };
        let graph = self.graph;
        let target = graph.get(current_key)?;

        let reassigned = !same_reference(graph, current, original);
        let serialized = self.child(target)?;

        let include = target.is_new()
            || reassigned
            || is_changed(graph, target)
            || serialized.nested;

        include.then_some(Value::Object(serialized.payload))
    }

    fn collection(
        &mut self,
        members: &[ResourceKey],
        original_members: &BTreeSet<PersistedIdentity>,
    ) -> Option<Value> {
        let graph = self.graph;
        let mut current_members = BTreeSet::new();
        let mut any_new = false;
        let mut any_member_changed = false;
        let mut items = Vec::with_capacity(members.len());

        for member in members.iter().filter_map(|key| graph.get(*key)) {
            match member.identity().persisted() {
                Some(identity) => {
                    current_members.insert(identity.clone());
                }
                None => any_new = true,
            }

            if let Some(serialized) = self.child(member) {
                any_member_changed |= serialized.nested || is_changed(graph, member);
                items.push(Value::Object(serialized.payload));
            }
        }

        let membership_changed = any_new || &current_members != original_members;
        (membership_changed || any_member_changed).then_some(Value::Array(items))
    }

    fn own_attributes(&self, resource: &Resource) -> Payload {
        let mut payload = self.identity_only(resource);
        for (name, value) in resource.attributes() {
            payload.insert(name.clone(), value.to_json(self.graph));
        }
        payload
    }

    fn identity_only(&self, resource: &Resource) -> Payload {
        let mut payload = Payload::new();
        if self.config.include_id {
            if let Some(id) = resource.id().and_then(|id| serde_json::to_value(id).ok()) {
                payload.insert(ID_KEY.to_string(), id);
            }
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::model::{ResourceType, Schema};
    use crate::persistence::{load, load_association};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .with(
                ResourceType::new("node")
                    .attribute("name")
                    .has_one("next", "node")
                    .has_many("children", "node"),
            )
            .unwrap()
    }

    #[test]
    fn test_new_resource_serializes_attributes_without_id() {
        let mut graph = ResourceGraph::new(schema());
        let node = graph.build("node").unwrap();
        graph.set_attribute(node, "name", "fresh").unwrap();

        let payload = serialize(&graph, graph.resource(node).unwrap());
        assert_eq!(Value::Object(payload), json!({"name": "fresh"}));
    }

    #[test]
    fn test_persisted_resource_includes_id() {
        let mut graph = ResourceGraph::new(schema());
        let node = load(&mut graph, "node", &json!({"id": 5, "name": "n"})).unwrap();

        let payload = serialize(&graph, graph.resource(node).unwrap());
        assert_eq!(Value::Object(payload), json!({"id": 5, "name": "n"}));
    }

    #[test]
    fn test_include_id_disabled() {
        let config = EngineConfig {
            include_id: false,
            ..EngineConfig::default()
        };
        let mut graph = ResourceGraph::with_config(schema(), config);
        let node = load(&mut graph, "node", &json!({"id": 5, "name": "n"})).unwrap();

        let payload = serialize(&graph, graph.resource(node).unwrap());
        assert_eq!(Value::Object(payload), json!({"name": "n"}));
    }

    #[test]
    fn test_cleared_singular_emits_null() {
        let mut graph = ResourceGraph::new(schema());
        let node = load(
            &mut graph,
            "node",
            &json!({"id": 1, "next": {"id": 2, "name": "b"}}),
        )
        .unwrap();
        graph.assign(node, "next", None).unwrap();

        let payload = serialize(&graph, graph.resource(node).unwrap());
        assert_eq!(payload.get("next_attributes"), Some(&Value::Null));
    }

    #[test]
    fn test_self_cycle_terminates_with_attributes_only() {
        let mut graph = ResourceGraph::new(schema());
        let node = load(&mut graph, "node", &json!({"id": 1, "name": "loop"})).unwrap();
        graph.assign(node, "next", Some(node)).unwrap();

        let payload = serialize(&graph, graph.resource(node).unwrap());
        assert_eq!(
            payload.get("next_attributes"),
            Some(&json!({"id": 1, "name": "loop"}))
        );
    }

    #[test]
    fn test_empty_collection_loaded_and_unchanged_is_omitted() {
        let mut graph = ResourceGraph::new(schema());
        let node = load(&mut graph, "node", &json!({"id": 1})).unwrap();
        load_association(&mut graph, node, "children", &json!([])).unwrap();

        let payload = serialize(&graph, graph.resource(node).unwrap());
        assert!(!payload.contains_key("children_attributes"));
    }

    #[test]
    fn test_removing_member_includes_remaining_membership() {
        let mut graph = ResourceGraph::new(schema());
        let node = load(&mut graph, "node", &json!({"id": 1})).unwrap();
        load_association(
            &mut graph,
            node,
            "children",
            &json!([{"id": 2}, {"id": 3}]),
        )
        .unwrap();
        let first = graph.members(node, "children").unwrap()[0];
        graph.remove_member(node, "children", first).unwrap();

        let payload = serialize(&graph, graph.resource(node).unwrap());
        assert_eq!(payload.get("children_attributes"), Some(&json!([{"id": 3}])));
    }
}
