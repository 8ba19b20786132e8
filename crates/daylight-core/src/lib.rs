//! Daylight Core - client-side resource change tracking
//!
//! In-memory representations of remote REST resources that remember their
//! last persisted state and serialize themselves into minimal partial-update
//! payloads, including nested associated resources:
//! - Resource descriptors and a validating arena graph
//! - Identity semantics that survive network round-trips
//! - Shallow change detection (`is_changed`) and attribute diffs
//! - Selective nested serialization with cycle protection
//! - Load/commit helpers that capture and refresh snapshots
//!
//! # Example
//!
//! ```
//! use daylight_core::{persistence, ResourceGraph, ResourceType, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .with(ResourceType::new("post").attribute("title").has_many("comments", "comment"))
//!     .and_then(|s| s.with(ResourceType::new("comment").attribute("body")))
//!     .unwrap();
//! let mut graph = ResourceGraph::new(schema);
//!
//! let post = persistence::load(
//!     &mut graph,
//!     "post",
//!     &json!({"id": 1, "title": "t", "comments": [{"id": 2, "body": "a"}]}),
//! )
//! .unwrap();
//! let comment = graph.members(post, "comments").unwrap()[0];
//! graph.set_attribute(comment, "body", "edited").unwrap();
//!
//! let payload = graph.serialize(post).unwrap();
//! assert_eq!(payload["comments_attributes"], json!([{"id": 2, "body": "edited"}]));
//! assert!(!graph.is_changed(post).unwrap());
//! ```

pub mod config;
pub mod errors;
pub mod graph;
pub mod logging_facility;
pub mod model;
pub mod persistence;
pub mod serialize;
pub mod tracking;

#[doc(hidden)]
pub mod __macro_support {
    pub use daylight_core_types::schema;
    pub use tracing;
}

// Re-export commonly used types
pub use config::{CyclePolicy, EngineConfig};
pub use daylight_core_types::{PersistedIdentity, ResourceId};
pub use errors::{DaylightError, ExError, ExErrorKind, Result};
pub use graph::ResourceGraph;
pub use model::{
    AssociationKind, AssociationSlot, AttributeValue, Identity, Resource, ResourceKey,
    ResourceType, Schema,
};
pub use serialize::{serialize, Payload};
pub use tracking::{attribute_changed, changes, is_changed, AttributeChange};
