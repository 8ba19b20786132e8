//! Resource type descriptors
//!
//! A [`ResourceType`] declares which attributes and associations a remote
//! resource type has. Descriptors are built once, registered in a [`Schema`],
//! and never mutated afterwards. Every graph mutation and every load is
//! validated against them, so the change-tracking engine can assume
//! well-formed input.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{DaylightError, Result};

/// Attribute name reserved for the resource identity
pub const ID_KEY: &str = "id";

/// Shape of an association slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// To-one relation (belongs-to / has-one)
    Singular,
    /// Ordered to-many relation (has-many)
    Collection,
}

impl AssociationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationKind::Singular => "singular",
            AssociationKind::Collection => "collection",
        }
    }
}

/// One declared association on a resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDef {
    pub name: String,
    pub kind: AssociationKind,
    /// Type name of the referenced resources
    pub target: String,
}

/// Descriptor for one resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    name: String,
    attributes: BTreeSet<String>,
    associations: BTreeMap<String, AssociationDef>,
}

impl ResourceType {
    /// Start a descriptor with no attributes or associations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeSet::new(),
            associations: BTreeMap::new(),
        }
    }

    /// Declare a scalar or reference-valued attribute
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into());
        self
    }

    /// Declare several attributes at once
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare a singular association owned by this resource
    pub fn has_one(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.association(name, AssociationKind::Singular, target)
    }

    /// Declare a singular association pointing at a parent resource
    pub fn belongs_to(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.association(name, AssociationKind::Singular, target)
    }

    /// Declare a collection association
    pub fn has_many(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.association(name, AssociationKind::Collection, target)
    }

    fn association(
        mut self,
        name: impl Into<String>,
        kind: AssociationKind,
        target: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.associations.insert(
            name.clone(),
            AssociationDef {
                name,
                kind,
                target: target.into(),
            },
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &String> {
        self.attributes.iter()
    }

    pub fn association_def(&self, name: &str) -> Option<&AssociationDef> {
        self.associations.get(name)
    }

    pub fn association_defs(&self) -> impl Iterator<Item = &AssociationDef> {
        self.associations.values()
    }

    /// Look up an association and require a particular kind
    ///
    /// # Errors
    ///
    /// `InvalidAssociation` if undeclared, `WrongAssociationKind` if the
    /// declared kind differs from `expected`.
    pub fn require_association(
        &self,
        name: &str,
        expected: AssociationKind,
    ) -> Result<&AssociationDef> {
        let def = self
            .associations
            .get(name)
            .ok_or_else(|| DaylightError::InvalidAssociation {
                type_name: self.name.clone(),
                association: name.to_string(),
            })?;

        if def.kind != expected {
            return Err(DaylightError::WrongAssociationKind {
                type_name: self.name.clone(),
                association: name.to_string(),
                expected: expected.as_str().to_string(),
                actual: def.kind.as_str().to_string(),
            });
        }

        Ok(def)
    }

    /// Require that `name` is a declared attribute
    ///
    /// # Errors
    ///
    /// `InvalidAttribute` if undeclared.
    pub fn require_attribute(&self, name: &str) -> Result<()> {
        if self.attributes.contains(name) {
            Ok(())
        } else {
            Err(DaylightError::InvalidAttribute {
                type_name: self.name.clone(),
                attribute: name.to_string(),
            })
        }
    }
}

/// Registry of resource type descriptors
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: BTreeMap<String, ResourceType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if the type name is taken
    /// - `InvalidAttribute` if `id` is declared as an attribute
    /// - `InvalidAssociation` if an association shares a name with an attribute
    pub fn register(&mut self, resource_type: ResourceType) -> Result<()> {
        if self.types.contains_key(resource_type.name()) {
            return Err(DaylightError::AlreadyRegistered {
                type_name: resource_type.name().to_string(),
            });
        }

        if resource_type.has_attribute(ID_KEY) {
            return Err(DaylightError::InvalidAttribute {
                type_name: resource_type.name().to_string(),
                attribute: ID_KEY.to_string(),
            });
        }

        if let Some(clash) = resource_type
            .association_defs()
            .find(|def| resource_type.has_attribute(&def.name))
        {
            return Err(DaylightError::InvalidAssociation {
                type_name: resource_type.name().to_string(),
                association: clash.name.clone(),
            });
        }

        self.types
            .insert(resource_type.name().to_string(), resource_type);
        Ok(())
    }

    /// Builder-style registration
    ///
    /// # Errors
    ///
    /// Same as [`Schema::register`].
    pub fn with(mut self, resource_type: ResourceType) -> Result<Self> {
        self.register(resource_type)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// `UnknownType` if no descriptor is registered under `type_name`.
    pub fn get(&self, type_name: &str) -> Result<&ResourceType> {
        self.types
            .get(type_name)
            .ok_or_else(|| DaylightError::UnknownType {
                type_name: type_name.to_string(),
            })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_type() -> ResourceType {
        ResourceType::new("post")
            .attributes(["title", "body"])
            .belongs_to("blog", "blog")
            .has_many("comments", "comment")
    }

    #[test]
    fn test_builder_declares_attributes_and_associations() {
        let post = post_type();

        assert_eq!(post.name(), "post");
        assert!(post.has_attribute("title"));
        assert!(!post.has_attribute("comments"));
        assert_eq!(
            post.association_def("comments").map(|d| d.kind),
            Some(AssociationKind::Collection)
        );
        assert_eq!(
            post.association_def("blog").map(|d| d.target.as_str()),
            Some("blog")
        );
    }

    #[test]
    fn test_require_association_checks_kind() {
        let post = post_type();

        assert!(post
            .require_association("blog", AssociationKind::Singular)
            .is_ok());

        let err = post
            .require_association("comments", AssociationKind::Singular)
            .unwrap_err();
        assert!(matches!(err, DaylightError::WrongAssociationKind { .. }));

        let err = post
            .require_association("tags", AssociationKind::Collection)
            .unwrap_err();
        assert!(matches!(err, DaylightError::InvalidAssociation { .. }));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut schema = Schema::new();
        schema.register(post_type()).unwrap();

        let err = schema.register(post_type()).unwrap_err();
        assert_eq!(
            err,
            DaylightError::AlreadyRegistered {
                type_name: "post".to_string()
            }
        );
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_register_rejects_reserved_id_attribute() {
        let err = Schema::new()
            .with(ResourceType::new("post").attribute("id"))
            .unwrap_err();
        assert!(matches!(err, DaylightError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_register_rejects_name_clash() {
        let err = Schema::new()
            .with(
                ResourceType::new("post")
                    .attribute("blog")
                    .belongs_to("blog", "blog"),
            )
            .unwrap_err();
        assert!(matches!(err, DaylightError::InvalidAssociation { .. }));
    }

    #[test]
    fn test_get_unknown_type() {
        let schema = Schema::new();
        assert!(matches!(
            schema.get("ghost"),
            Err(DaylightError::UnknownType { .. })
        ));
    }
}
