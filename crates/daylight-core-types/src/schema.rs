//! Field and event names shared by every structured log line
//!
//! Boundary operations (`load`, `load_association`, `serialize`, `commit`)
//! tag their events with `op` and a lifecycle marker under `event`; log
//! capture in tests keys off the same names.

/// Module path of the emitting code
pub const FIELD_COMPONENT: &str = "component";
/// Boundary operation name
pub const FIELD_OP: &str = "op";
/// Lifecycle marker, one of [`LIFECYCLE_EVENTS`]
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

pub const FIELD_RESOURCE_TYPE: &str = "resource_type";
pub const FIELD_RESOURCE_ID: &str = "resource_id";
pub const FIELD_ASSOCIATION: &str = "association";

/// Resources entered by one serialization walk
pub const FIELD_VISITED: &str = "visited";
/// Nested `*_attributes` keys emitted by one serialization walk
pub const FIELD_NESTED_KEYS: &str = "nested_keys";

pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Every lifecycle marker, in the order an operation can emit them
pub const LIFECYCLE_EVENTS: [&str; 3] = [EVENT_START, EVENT_END, EVENT_END_ERROR];
