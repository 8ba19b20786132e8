//! Selective nested serialization.
//!
//! Produces the partial-update request body for a resource. Nested
//! `<association>_attributes` keys appear only for subtrees that contain a
//! new, changed, reassigned or membership-altered resource.
//!
//! ## Entry point
//!
//! ```ignore
//! use daylight_core::serialize::serialize;
//!
//! let payload = serialize(&graph, graph.resource(post)?);
//! ```
//!
//! ## Guarantees
//!
//! - **Minimality**: unchanged associations are omitted entirely (never an
//!   empty array or object).
//! - **Collection granularity**: an included collection lists every current
//!   member in current order, not just the delta.
//! - **Termination**: a path-scoped visiting set stops re-entry through
//!   reference cycles; see [`crate::config::CyclePolicy`].
//! - **Determinism**: repeated calls without mutation yield equal payloads.

pub mod engine;

pub use engine::{serialize, Payload};
