pub mod descriptor;
pub mod identity;
pub mod resource;
pub mod value;

pub use descriptor::{AssociationDef, AssociationKind, ResourceType, Schema};
pub use identity::{EntityKey, Identity, ResourceKey};
pub use resource::{AssociationSlot, Resource};
pub use value::AttributeValue;
