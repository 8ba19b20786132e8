use daylight_core_types::{PersistedIdentity, ResourceId};
use std::collections::{BTreeMap, BTreeSet};

use super::descriptor::AssociationKind;
use super::identity::{EntityKey, Identity, ResourceKey};
use super::value::AttributeValue;

/// A loaded association slot
///
/// Each slot carries its own baseline captured at load/commit time, so a
/// reassignment or membership churn can be detected without re-fetching.
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationSlot {
    Singular {
        current: Option<ResourceKey>,
        original: Option<ResourceKey>,
    },
    Collection {
        members: Vec<ResourceKey>,
        original_members: BTreeSet<PersistedIdentity>,
    },
}

impl AssociationSlot {
    /// Singular slot whose baseline is its current reference
    pub fn singular(target: Option<ResourceKey>) -> Self {
        AssociationSlot::Singular {
            current: target,
            original: target,
        }
    }

    /// Collection slot with an explicit baseline membership
    pub fn collection(
        members: Vec<ResourceKey>,
        original_members: BTreeSet<PersistedIdentity>,
    ) -> Self {
        AssociationSlot::Collection {
            members,
            original_members,
        }
    }

    pub fn kind(&self) -> AssociationKind {
        match self {
            AssociationSlot::Singular { .. } => AssociationKind::Singular,
            AssociationSlot::Collection { .. } => AssociationKind::Collection,
        }
    }

    /// Every resource this slot currently points at, in order
    pub fn targets(&self) -> Vec<ResourceKey> {
        match self {
            AssociationSlot::Singular { current, .. } => current.iter().copied().collect(),
            AssociationSlot::Collection { members, .. } => members.clone(),
        }
    }
}

/// Client-side representation of one remote entity
///
/// `original_attributes` is the diff baseline. Ordinary attribute assignment
/// never touches it; only loading and committing replace it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub(crate) key: ResourceKey,
    pub(crate) identity: Identity,
    pub(crate) attributes: BTreeMap<String, AttributeValue>,
    pub(crate) original_attributes: BTreeMap<String, AttributeValue>,
    pub(crate) associations: BTreeMap<String, AssociationSlot>,
}

impl Resource {
    pub(crate) fn new_unpersisted(key: ResourceKey, type_name: impl Into<String>) -> Self {
        Self {
            key,
            identity: Identity::Unpersisted {
                type_name: type_name.into(),
            },
            attributes: BTreeMap::new(),
            original_attributes: BTreeMap::new(),
            associations: BTreeMap::new(),
        }
    }

    pub(crate) fn new_loaded(
        key: ResourceKey,
        identity: PersistedIdentity,
        attributes: BTreeMap<String, AttributeValue>,
    ) -> Self {
        Self {
            key,
            identity: Identity::Persisted(identity),
            original_attributes: attributes.clone(),
            attributes,
            associations: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn type_name(&self) -> &str {
        self.identity.type_name()
    }

    pub fn id(&self) -> Option<&ResourceId> {
        self.identity.id()
    }

    /// True iff the resource has never been persisted
    pub fn is_new(&self) -> bool {
        !self.identity.is_persisted()
    }

    /// Traversal key: persisted identity, or instance key while new
    pub fn entity_key(&self) -> EntityKey {
        match self.identity.persisted() {
            Some(identity) => EntityKey::Persisted(identity.clone()),
            None => EntityKey::Instance(self.key),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn original_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.original_attributes.get(name)
    }

    pub fn original_attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.original_attributes
    }

    /// Loaded slot for `name`; `None` when the association was never loaded
    pub fn association(&self, name: &str) -> Option<&AssociationSlot> {
        self.associations.get(name)
    }

    pub fn associations(&self) -> &BTreeMap<String, AssociationSlot> {
        &self.associations
    }
}
