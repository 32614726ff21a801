//! Simulated restore from a single manifest.
//!
//! No data is moved; the job reports what it would restore and where.

use super::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::manifest;
use crate::utils::errors::ToolkitError;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug)]
pub enum RestoreReport {
    Restored {
        target: Option<String>,
        timestamp: Option<String>,
        destination: String,
    },
    NotFound {
        path: PathBuf,
    },
    Unreadable {
        path: PathBuf,
        error: ToolkitError,
    },
}

impl RestoreReport {
    pub fn exit_code(&self) -> u8 {
        match self {
            RestoreReport::Restored { .. } => EXIT_SUCCESS,
            RestoreReport::NotFound { .. } | RestoreReport::Unreadable { .. } => EXIT_FAILURE,
        }
    }
}

impl fmt::Display for RestoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreReport::Restored {
                target,
                timestamp,
                destination,
            } => {
                writeln!(f, "Restoring target: {}", target.as_deref().unwrap_or("<missing>"))?;
                writeln!(f, "Timestamp: {}", timestamp.as_deref().unwrap_or("<missing>"))?;
                write!(f, "Simulated restore to {} complete.", destination)
            }
            RestoreReport::NotFound { path } => write!(f, "Manifest not found: {}", path.display()),
            RestoreReport::Unreadable { path, error } => {
                write!(f, "Error reading manifest: {}: {}", path.display(), error)
            }
        }
    }
}

/// Render a manifest field for display; strings are shown without quotes.
fn display_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read `manifest_path` and report a simulated restore into `destination`.
pub fn restore(manifest_path: &Path, destination: &str) -> RestoreReport {
    info!("Restoring from manifest {} to {}", manifest_path.display(), destination);

    let record = match manifest::read(manifest_path) {
        Ok(record) => record,
        Err(ToolkitError::NotFound(path)) => {
            error!("Manifest not found: {}", path.display());
            return RestoreReport::NotFound { path };
        }
        Err(error) => {
            error!("Failed to read manifest {}: {}", manifest_path.display(), error);
            return RestoreReport::Unreadable {
                path: manifest_path.to_path_buf(),
                error,
            };
        }
    };

    RestoreReport::Restored {
        target: record.field("target").map(display_field),
        timestamp: record.field("timestamp").map(display_field),
        destination: destination.to_string(),
    }
}
