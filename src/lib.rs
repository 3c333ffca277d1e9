pub mod backup;
pub mod bump;
pub mod config;
pub mod error;
pub mod git;
pub mod handlers;
pub mod ui;
pub mod undo;
pub mod version;

pub use error::{BumpCalverError, Result};
