//! Change tracking over the resource snapshot model.
//!
//! ## Entry points
//!
//! - [`is_changed`]: local predicate (own attributes and singular
//!   reassignments only; collections never mark their owner changed)
//! - [`attribute_changed`]: one attribute against its snapshot
//! - [`changes`]: old/new pairs for every changed attribute
//!
//! All functions are total over well-formed graphs and never fail.

pub mod changes;
pub mod identity;

pub use changes::{attribute_changed, changes, is_changed, AttributeChange};
pub use identity::{same_entity, same_reference, values_equal};
