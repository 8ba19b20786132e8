//! Load/commit collaborator.
//!
//! Bridges decoded server JSON and the snapshot model:
//!
//! - [`load`] / [`load_many`] hydrate persisted resources, with embedded
//!   association data, capturing snapshots as they go
//! - [`load_association`] attaches a lazily fetched association to an
//!   already-loaded owner
//! - [`commit`] applies a save response and re-baselines every resource
//!   reachable from the saved root
//!
//! ## Logging Ownership
//!
//! These are boundary operations: each logs `start`/`end` (or `end_error`).
//! Helpers only use `tracing::debug!()`.

pub mod commit;
pub mod hydrate;

pub use commit::commit;
pub use hydrate::{load, load_association, load_many};
