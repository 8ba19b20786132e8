//! Identity value types for remote resources
//!
//! A remote entity is identified by its type name and an opaque id that is
//! unique within that type. Ids are either integers or strings on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque server-assigned identifier
///
/// Serializes untagged, so `ResourceId::Int(1)` is `1` and
/// `ResourceId::Str("a1")` is `"a1"` in JSON. Integers that fit `i64` are
/// always `Int`; only larger unsigned ids use `Uint`, so each numeric id
/// has exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Uint(u64),
    Str(String),
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Str(id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Uint(id) => write!(f, "{}", id),
            ResourceId::Str(id) => write!(f, "{}", id),
        }
    }
}

/// `(type, id)` pair of an entity that exists on the server
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersistedIdentity {
    pub type_name: String,
    pub id: ResourceId,
}

impl PersistedIdentity {
    pub fn new(type_name: impl Into<String>, id: impl Into<ResourceId>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for PersistedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.id)
    }
}
