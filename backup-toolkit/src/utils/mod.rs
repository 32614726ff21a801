//! Utility modules for the backup toolkit.

pub mod errors;
pub mod logger;

pub use errors::{Result, ToolkitError};
