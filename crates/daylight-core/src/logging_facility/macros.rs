//! Boundary logging macros
//!
//! Every boundary operation emits exactly one `start` event and then either
//! one `end` or one `end_error` event, all carrying `component` and `op`.
//! Extra `tracing` fields may follow the required arguments.

/// Emit the `start` event of a boundary operation
///
/// ```
/// # use daylight_core::log_op_start;
/// log_op_start!("serialize");
/// log_op_start!("serialize", resource_type = "post");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__macro_support::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::__macro_support::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Emit the `end` event of a boundary operation
///
/// ```
/// # use daylight_core::log_op_end;
/// log_op_end!("serialize", duration_ms = 3);
/// log_op_end!("serialize", duration_ms = 3, visited = 4_u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__macro_support::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::__macro_support::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Emit the `end_error` event of a boundary operation
///
/// The error is converted to [`ExError`](crate::errors::ExError) so the
/// event carries its stable kind and code.
///
/// ```
/// # use daylight_core::{log_op_error, errors::DaylightError};
/// let err = DaylightError::UnknownType { type_name: "post".to_string() };
/// log_op_error!("load", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__macro_support::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::__macro_support::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($($field)*)?
        )
    }};
}
