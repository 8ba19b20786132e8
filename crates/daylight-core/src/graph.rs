use daylight_core_types::{PersistedIdentity, ResourceId};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::EngineConfig;
use crate::errors::{DaylightError, Result};
use crate::model::{
    AssociationDef, AssociationKind, AssociationSlot, AttributeValue, Identity, Resource,
    ResourceKey, ResourceType, Schema,
};
use crate::serialize::{self, Payload};
use crate::tracking::{self, AttributeChange};

/// Arena of resource instances
///
/// Owns every resource loaded or built in one client session together with
/// the descriptor [`Schema`] they are validated against. Associations hold
/// [`ResourceKey`]s into this arena, so a resource can be shared by several
/// owners and graphs may contain cycles.
///
/// Not thread-safe by itself: mutation takes `&mut self`, and the
/// change-tracking engine reads through `&self`.
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    schema: Schema,
    config: EngineConfig,
    resources: Vec<Resource>,
}

impl ResourceGraph {
    /// Create an empty graph with the default engine configuration
    pub fn new(schema: Schema) -> Self {
        Self::with_config(schema, EngineConfig::default())
    }

    /// Create an empty graph with `config` installed as given
    ///
    /// The config is not validated here: an empty `nested_suffix` built from
    /// the public fields is accepted and nested keys become bare association
    /// names.
    /// Use [`ResourceGraph::try_with_config`] for configs not obtained from
    /// [`EngineConfig::from_toml_str`].
    pub fn with_config(schema: Schema, config: EngineConfig) -> Self {
        Self {
            schema,
            config,
            resources: Vec::new(),
        }
    }

    /// Create an empty graph after validating `config`
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if [`EngineConfig::validate`] rejects the config.
    pub fn try_with_config(schema: Schema, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(schema, config))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Get a resource by key
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the key was not issued by this graph.
    pub fn resource(&self, key: ResourceKey) -> Result<&Resource> {
        self.get(key)
            .ok_or(DaylightError::ResourceNotFound { key: key.index() })
    }

    pub fn get(&self, key: ResourceKey) -> Option<&Resource> {
        self.resources.get(key.index())
    }

    pub(crate) fn resource_mut(&mut self, key: ResourceKey) -> Result<&mut Resource> {
        self.resources
            .get_mut(key.index())
            .ok_or(DaylightError::ResourceNotFound { key: key.index() })
    }

    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.resources.iter().map(Resource::key)
    }

    /// Build a new, unpersisted resource
    ///
    /// # Errors
    ///
    /// `UnknownType` if `type_name` is not registered.
    pub fn build(&mut self, type_name: &str) -> Result<ResourceKey> {
        self.schema.get(type_name)?;
        let key = ResourceKey::new(self.resources.len());
        self.resources
            .push(Resource::new_unpersisted(key, type_name));
        Ok(key)
    }

    /// Insert a resource as loaded from the server: attributes double as the snapshot
    pub(crate) fn insert_loaded(
        &mut self,
        identity: PersistedIdentity,
        attributes: BTreeMap<String, AttributeValue>,
    ) -> ResourceKey {
        let key = ResourceKey::new(self.resources.len());
        self.resources
            .push(Resource::new_loaded(key, identity, attributes));
        key
    }

    fn descriptor(&self, key: ResourceKey) -> Result<&ResourceType> {
        let resource = self.resource(key)?;
        self.schema.get(resource.type_name())
    }

    /// Set an attribute's current value
    ///
    /// # Errors
    ///
    /// - `ResourceNotFound` for a foreign key
    /// - `InvalidAttribute` if the attribute is not declared
    /// - `TypeMismatch` if a `Reference` value points outside this graph
    pub fn set_attribute(
        &mut self,
        key: ResourceKey,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<()> {
        let value = value.into();
        let descriptor = self.descriptor(key)?;
        descriptor.require_attribute(name)?;

        if let Some(target) = value.as_reference() {
            if self.get(target).is_none() {
                return Err(DaylightError::TypeMismatch {
                    type_name: descriptor.name().to_string(),
                    slot: name.to_string(),
                    expected: "resource reference".to_string(),
                    actual: format!("dangling key {}", target),
                });
            }
        }

        tracing::trace!(resource = %key, attribute = name, "set attribute");
        self.resource_mut(key)?
            .attributes
            .insert(name.to_string(), value);
        Ok(())
    }

    /// Point a singular association at `target` (or clear it with `None`)
    ///
    /// Assigning an association that was never loaded creates its slot with
    /// an empty baseline, so any non-empty assignment reads as a change.
    ///
    /// # Errors
    ///
    /// - `InvalidAssociation` / `WrongAssociationKind` for a bad name
    /// - `TypeMismatch` if `target` has a type other than the declared target
    pub fn assign(
        &mut self,
        key: ResourceKey,
        association: &str,
        target: Option<ResourceKey>,
    ) -> Result<()> {
        let def = self
            .descriptor(key)?
            .require_association(association, AssociationKind::Singular)?
            .clone();
        if let Some(target) = target {
            self.check_target(key, &def, target)?;
        }

        let resource = self.resource_mut(key)?;
        match resource.associations.get_mut(association) {
            Some(AssociationSlot::Singular { current, .. }) => *current = target,
            _ => {
                resource.associations.insert(
                    association.to_string(),
                    AssociationSlot::Singular {
                        current: target,
                        original: None,
                    },
                );
            }
        }
        Ok(())
    }

    /// Append a member to a collection association
    ///
    /// # Errors
    ///
    /// Same validation as [`ResourceGraph::assign`], for collections.
    pub fn push_member(
        &mut self,
        key: ResourceKey,
        association: &str,
        member: ResourceKey,
    ) -> Result<()> {
        self.collection_mut(key, association, &[member])?
            .push(member);
        Ok(())
    }

    /// Remove every occurrence of `member`; returns whether anything was removed
    ///
    /// # Errors
    ///
    /// Same validation as [`ResourceGraph::push_member`].
    pub fn remove_member(
        &mut self,
        key: ResourceKey,
        association: &str,
        member: ResourceKey,
    ) -> Result<bool> {
        let members = self.collection_mut(key, association, &[])?;
        let before = members.len();
        members.retain(|m| *m != member);
        Ok(members.len() != before)
    }

    /// Replace a collection's current membership wholesale
    ///
    /// # Errors
    ///
    /// Same validation as [`ResourceGraph::push_member`].
    pub fn replace_members(
        &mut self,
        key: ResourceKey,
        association: &str,
        members: Vec<ResourceKey>,
    ) -> Result<()> {
        let slot = self.collection_mut(key, association, &members)?;
        *slot = members;
        Ok(())
    }

    /// Current members of a collection; empty when not loaded
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, `InvalidAssociation` or `WrongAssociationKind`.
    pub fn members(&self, key: ResourceKey, association: &str) -> Result<Vec<ResourceKey>> {
        self.descriptor(key)?
            .require_association(association, AssociationKind::Collection)?;
        Ok(self
            .resource(key)?
            .association(association)
            .map(AssociationSlot::targets)
            .unwrap_or_default())
    }

    /// Current target of a singular association
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, `InvalidAssociation` or `WrongAssociationKind`.
    pub fn associated(&self, key: ResourceKey, association: &str) -> Result<Option<ResourceKey>> {
        self.descriptor(key)?
            .require_association(association, AssociationKind::Singular)?;
        Ok(match self.resource(key)?.association(association) {
            Some(AssociationSlot::Singular { current, .. }) => *current,
            _ => None,
        })
    }

    fn collection_mut(
        &mut self,
        key: ResourceKey,
        association: &str,
        incoming: &[ResourceKey],
    ) -> Result<&mut Vec<ResourceKey>> {
        let def = self
            .descriptor(key)?
            .require_association(association, AssociationKind::Collection)?
            .clone();
        for member in incoming {
            self.check_target(key, &def, *member)?;
        }
        let owner_type = self.resource(key)?.type_name().to_string();

        let slot = self
            .resource_mut(key)?
            .associations
            .entry(association.to_string())
            .or_insert_with(|| AssociationSlot::collection(Vec::new(), BTreeSet::new()));

        match slot {
            AssociationSlot::Collection { members, .. } => Ok(members),
            AssociationSlot::Singular { .. } => Err(DaylightError::WrongAssociationKind {
                type_name: owner_type,
                association: association.to_string(),
                expected: AssociationKind::Collection.as_str().to_string(),
                actual: AssociationKind::Singular.as_str().to_string(),
            }),
        }
    }

    fn check_target(
        &self,
        owner: ResourceKey,
        def: &AssociationDef,
        target: ResourceKey,
    ) -> Result<()> {
        let target_type = self.resource(target)?.type_name();
        if target_type != def.target {
            return Err(DaylightError::TypeMismatch {
                type_name: self.resource(owner)?.type_name().to_string(),
                slot: def.name.clone(),
                expected: def.target.clone(),
                actual: target_type.to_string(),
            });
        }
        Ok(())
    }

    /// Install a slot with its baseline, replacing any previous one
    pub(crate) fn install_slot(
        &mut self,
        key: ResourceKey,
        association: &str,
        slot: AssociationSlot,
    ) -> Result<()> {
        self.resource_mut(key)?
            .associations
            .insert(association.to_string(), slot);
        Ok(())
    }

    /// Transition a resource to persisted (or re-key it) after a save
    pub(crate) fn assign_id(&mut self, key: ResourceKey, id: ResourceId) -> Result<()> {
        let resource = self.resource_mut(key)?;
        let identity = PersistedIdentity::new(resource.type_name(), id);
        resource.identity = Identity::Persisted(identity);
        Ok(())
    }
}

/// Key-based shorthands for the change-tracking engine
impl ResourceGraph {
    /// # Errors
    ///
    /// `ResourceNotFound` if the key was not issued by this graph.
    pub fn is_changed(&self, key: ResourceKey) -> Result<bool> {
        Ok(tracking::is_changed(self, self.resource(key)?))
    }

    /// # Errors
    ///
    /// `ResourceNotFound` if the key was not issued by this graph.
    pub fn attribute_changed(&self, key: ResourceKey, name: &str) -> Result<bool> {
        Ok(tracking::attribute_changed(self, self.resource(key)?, name))
    }

    /// # Errors
    ///
    /// `ResourceNotFound` if the key was not issued by this graph.
    pub fn changes(&self, key: ResourceKey) -> Result<BTreeMap<String, AttributeChange>> {
        Ok(tracking::changes(self, self.resource(key)?))
    }

    /// # Errors
    ///
    /// `ResourceNotFound` if the key was not issued by this graph.
    pub fn serialize(&self, key: ResourceKey) -> Result<Payload> {
        Ok(serialize::serialize(self, self.resource(key)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new()
            .with(
                ResourceType::new("post")
                    .attributes(["title", "author_ref"])
                    .belongs_to("blog", "blog")
                    .has_many("comments", "comment"),
            )
            .and_then(|s| s.with(ResourceType::new("blog").attribute("name")))
            .and_then(|s| s.with(ResourceType::new("comment").attribute("body")))
            .unwrap()
    }

    #[test]
    fn test_build_creates_new_resource() {
        let mut graph = ResourceGraph::new(schema());
        let post = graph.build("post").unwrap();

        assert!(graph.resource(post).unwrap().is_new());
        assert_eq!(graph.len(), 1);
        assert!(matches!(
            graph.build("ghost"),
            Err(DaylightError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_set_attribute_validates_name() {
        let mut graph = ResourceGraph::new(schema());
        let post = graph.build("post").unwrap();

        graph.set_attribute(post, "title", "Hello").unwrap();
        assert_eq!(
            graph.resource(post).unwrap().attribute("title"),
            Some(&AttributeValue::from("Hello"))
        );

        let err = graph.set_attribute(post, "nope", 1).unwrap_err();
        assert!(matches!(err, DaylightError::InvalidAttribute { .. }));
        // Snapshot untouched
        assert!(graph
            .resource(post)
            .unwrap()
            .original_attributes()
            .is_empty());
    }

    #[test]
    fn test_assign_checks_kind_and_target_type() {
        let mut graph = ResourceGraph::new(schema());
        let post = graph.build("post").unwrap();
        let blog = graph.build("blog").unwrap();
        let comment = graph.build("comment").unwrap();

        graph.assign(post, "blog", Some(blog)).unwrap();
        assert_eq!(graph.associated(post, "blog").unwrap(), Some(blog));

        assert!(matches!(
            graph.assign(post, "blog", Some(comment)),
            Err(DaylightError::TypeMismatch { .. })
        ));
        assert!(matches!(
            graph.assign(post, "comments", None),
            Err(DaylightError::WrongAssociationKind { .. })
        ));
        assert!(matches!(
            graph.assign(post, "author", None),
            Err(DaylightError::InvalidAssociation { .. })
        ));
    }

    #[test]
    fn test_collection_membership_operations() {
        let mut graph = ResourceGraph::new(schema());
        let post = graph.build("post").unwrap();
        let c1 = graph.build("comment").unwrap();
        let c2 = graph.build("comment").unwrap();

        graph.push_member(post, "comments", c1).unwrap();
        graph.push_member(post, "comments", c2).unwrap();
        assert_eq!(graph.members(post, "comments").unwrap(), vec![c1, c2]);

        assert!(graph.remove_member(post, "comments", c1).unwrap());
        assert!(!graph.remove_member(post, "comments", c1).unwrap());

        graph.replace_members(post, "comments", vec![c2, c1]).unwrap();
        assert_eq!(graph.members(post, "comments").unwrap(), vec![c2, c1]);
    }

    #[test]
    fn test_replace_members_validates_before_writing() {
        let mut graph = ResourceGraph::new(schema());
        let post = graph.build("post").unwrap();
        let c1 = graph.build("comment").unwrap();
        let blog = graph.build("blog").unwrap();

        graph.replace_members(post, "comments", vec![c1]).unwrap();
        assert_eq!(graph.members(post, "comments").unwrap(), vec![c1]);

        let err = graph
            .replace_members(post, "comments", vec![c1, blog])
            .unwrap_err();
        assert!(matches!(err, DaylightError::TypeMismatch { .. }));
        assert_eq!(graph.members(post, "comments").unwrap(), vec![c1]);
    }

    #[test]
    fn test_try_with_config_rejects_empty_suffix() {
        let config = EngineConfig {
            nested_suffix: String::new(),
            ..EngineConfig::default()
        };

        let err = ResourceGraph::try_with_config(schema(), config).unwrap_err();
        assert!(matches!(err, DaylightError::InvalidConfig { .. }));
        assert!(ResourceGraph::try_with_config(schema(), EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let mut graph = ResourceGraph::new(schema());
        let post = graph.build("post").unwrap();

        let err = graph
            .set_attribute(post, "author_ref", ResourceKey::new(99))
            .unwrap_err();
        assert!(matches!(err, DaylightError::TypeMismatch { .. }));
    }

    #[test]
    fn test_unknown_key() {
        let graph = ResourceGraph::new(schema());
        assert_eq!(
            graph.resource(ResourceKey::new(5)).unwrap_err(),
            DaylightError::ResourceNotFound { key: 5 }
        );
    }
}
