//! User interface module - reporting of progress, warnings and history.
//!
//! There is no interactive input; every recoverable condition is reported
//! through one of the `display_*` functions and the operation continues.

pub mod formatter;

pub use formatter::{
    display_error, display_operation_history, display_status, display_success, display_warning,
    format_operation_summary,
};
