//! Core types shared across Daylight crates
//!
//! This crate provides foundational types used by the resource model
//! and the logging facility:
//!
//! - **Identity types**: ResourceId, PersistedIdentity
//! - **Schema constants**: Canonical field keys and event names

pub mod identity;
pub mod schema;

pub use identity::{PersistedIdentity, ResourceId};
