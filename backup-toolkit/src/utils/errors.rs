//! Error types shared by the manifest store, the remote uploader and the jobs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Manifest {} is not a JSON object", .0.display())]
    NotAnObject(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote upload error: {0}")]
    Remote(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

impl ToolkitError {
    /// Whether the error belongs to the parse family (malformed or non-object JSON).
    pub fn is_parse(&self) -> bool {
        matches!(self, ToolkitError::Parse { .. } | ToolkitError::NotAnObject(_))
    }
}

pub type Result<T> = std::result::Result<T, ToolkitError>;
