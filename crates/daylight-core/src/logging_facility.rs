//! Structured logging
//!
//! - [`init`] installs the process-wide subscriber for a [`Profile`]
//! - `log_op_start!` / `log_op_end!` / `log_op_error!` emit the lifecycle
//!   events of boundary operations (`load`, `load_association`,
//!   `serialize`, `commit`)
//! - [`test_capture`] records events in memory for assertions
//!
//! Traversal and hydration internals log through plain `tracing::debug!`
//! and `trace!` and never emit lifecycle events.
//!
//! ```rust
//! use daylight_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CaptureLayer, CapturedEvent, TestCapture};
