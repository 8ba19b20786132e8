//! Resource identity
//!
//! Two resources are the same remote entity when they are the same in-memory
//! instance, or when both are persisted with equal `(type, id)`. An
//! unpersisted resource is only ever equal to itself.

use daylight_core_types::{PersistedIdentity, ResourceId};
use serde_json::Value;
use std::fmt;

/// Handle of a resource instance inside a [`crate::ResourceGraph`]
///
/// Keys are only minted by the graph and resources are never removed, so a
/// key stays valid for the lifetime of the graph that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(usize);

impl ResourceKey {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a resource: unpersisted, or a server-known `(type, id)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Unpersisted { type_name: String },
    Persisted(PersistedIdentity),
}

impl Identity {
    pub fn type_name(&self) -> &str {
        match self {
            Identity::Unpersisted { type_name } => type_name,
            Identity::Persisted(identity) => &identity.type_name,
        }
    }

    pub fn id(&self) -> Option<&ResourceId> {
        self.persisted().map(|identity| &identity.id)
    }

    pub fn persisted(&self) -> Option<&PersistedIdentity> {
        match self {
            Identity::Unpersisted { .. } => None,
            Identity::Persisted(identity) => Some(identity),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Identity::Persisted(_))
    }
}

/// Key used to recognise an entity during graph traversal
///
/// Persisted resources collapse onto their `(type, id)`, so two instances
/// of the same remote entity count as one. Unpersisted resources fall back
/// to instance identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Persisted(PersistedIdentity),
    Instance(ResourceKey),
}

/// Parse a wire id: integers (signed, or unsigned beyond `i64`) and
/// non-empty strings only
pub fn resource_id_from_json(value: &Value) -> Option<ResourceId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(ResourceId::Int)
            .or_else(|| n.as_u64().map(ResourceId::Uint)),
        Value::String(s) if !s.is_empty() => Some(ResourceId::Str(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_accessors() {
        let new = Identity::Unpersisted {
            type_name: "post".to_string(),
        };
        let loaded = Identity::Persisted(PersistedIdentity::new("post", 4));

        assert_eq!(new.type_name(), "post");
        assert!(new.id().is_none());
        assert!(!new.is_persisted());

        assert_eq!(loaded.type_name(), "post");
        assert_eq!(loaded.id(), Some(&ResourceId::Int(4)));
        assert!(loaded.is_persisted());
    }

    #[test]
    fn test_resource_id_from_json() {
        assert_eq!(resource_id_from_json(&json!(3)), Some(ResourceId::Int(3)));
        assert_eq!(
            resource_id_from_json(&json!("abc")),
            Some(ResourceId::Str("abc".to_string()))
        );
        assert_eq!(resource_id_from_json(&json!("")), None);
        assert_eq!(
            resource_id_from_json(&json!(u64::MAX)),
            Some(ResourceId::Uint(u64::MAX))
        );
        assert_eq!(resource_id_from_json(&json!(-4)), Some(ResourceId::Int(-4)));
        assert_eq!(resource_id_from_json(&json!(1.5)), None);
        assert_eq!(resource_id_from_json(&json!(null)), None);
        assert_eq!(resource_id_from_json(&json!(true)), None);
    }

    #[test]
    fn test_entity_keys_for_same_persisted_identity_match() {
        let a = EntityKey::Persisted(PersistedIdentity::new("post", 1));
        let b = EntityKey::Persisted(PersistedIdentity::new("post", 1));
        assert_eq!(a, b);
        assert_ne!(
            EntityKey::Instance(ResourceKey::new(0)),
            EntityKey::Instance(ResourceKey::new(1))
        );
    }
}
