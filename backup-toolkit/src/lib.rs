//! Backup Toolkit Library
//!
//! Manifest-based backup, restore and verify jobs with Prometheus job
//! counters and optional S3 mirroring of manifests.

pub mod config;
pub mod jobs;
pub mod manifest;
pub mod metrics;
pub mod remote;
pub mod utils;

// Re-export commonly used types
pub use config::ToolkitConfig;
pub use utils::errors::ToolkitError;
pub type Result<T> = std::result::Result<T, ToolkitError>;
