//! Backup manifests and the on-disk store that writes, lists and reads them.
//!
//! A manifest is a small JSON record `{"target", "timestamp", "status"}`
//! stored as `<target>-<timestamp>.manifest.json`. Manifests are never
//! modified once written.

use crate::utils::errors::{Result, ToolkitError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name suffix shared by every manifest.
pub const MANIFEST_SUFFIX: &str = ".manifest.json";

/// Keys a manifest must carry to pass verification.
pub const REQUIRED_FIELDS: [&str; 2] = ["target", "timestamp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManifestStatus {
    Success,
}

/// Manifest as written by a backup job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub target: String,
    /// Seconds since the Unix epoch at creation time
    pub timestamp: i64,
    pub status: ManifestStatus,
}

impl Manifest {
    pub fn new(target: impl Into<String>, timestamp: i64) -> Self {
        Self {
            target: target.into(),
            timestamp,
            status: ManifestStatus::Success,
        }
    }

    /// `<target>-<timestamp>.manifest.json`
    pub fn file_name(&self) -> String {
        format!("{}-{}{}", self.target, self.timestamp, MANIFEST_SUFFIX)
    }
}

/// Manifest as read back from disk.
///
/// Kept as a loose JSON object so that files written by other tools, or
/// damaged ones, can still be inspected field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRecord {
    fields: Map<String, Value>,
}

impl ManifestRecord {
    pub fn target(&self) -> Option<&str> {
        self.fields.get("target").and_then(Value::as_str)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.fields.get("timestamp").and_then(Value::as_i64)
    }

    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    /// Raw value of a field, whatever its type.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

impl From<Map<String, Value>> for ManifestRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Reject targets that can't be embedded in a file name.
///
/// Only the empty name and names with a path separator are refused; anything
/// else is a legal file name once `-<timestamp>.manifest.json` is appended.
pub fn check_target(target: &str) -> Result<()> {
    if target.is_empty() {
        return Err(ToolkitError::InvalidTarget("target must not be empty".to_string()));
    }
    if target.contains(['/', std::path::MAIN_SEPARATOR]) {
        return Err(ToolkitError::InvalidTarget(format!(
            "{target:?} must not contain path separators"
        )));
    }
    Ok(())
}

/// Write a manifest for `target` stamped with the current time.
///
/// Creates `dir` (and its parents) if needed and returns the manifest path.
pub fn write(target: &str, dir: &Path) -> Result<PathBuf> {
    write_at(target, dir, chrono::Utc::now().timestamp())
}

/// Write a manifest with an explicit timestamp.
///
/// Two writes for the same target and second resolve to the same path; the
/// later one replaces the earlier. The content goes to a hidden sibling first
/// and is renamed into place, so readers only ever see a complete file.
pub fn write_at(target: &str, dir: &Path, timestamp: i64) -> Result<PathBuf> {
    check_target(target)?;
    std::fs::create_dir_all(dir)?;

    let manifest = Manifest::new(target, timestamp);
    let path = dir.join(manifest.file_name());
    let staging = dir.join(format!(".{}.tmp", manifest.file_name()));

    let body = serde_json::to_vec(&manifest)?;
    std::fs::write(&staging, body)?;
    if let Err(e) = std::fs::rename(&staging, &path) {
        let _ = std::fs::remove_file(&staging);
        return Err(e.into());
    }

    tracing::debug!("Wrote manifest {}", path.display());
    Ok(path)
}

/// Read and parse the manifest at `path`.
pub fn read(path: &Path) -> Result<ManifestRecord> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolkitError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let value: Value = serde_json::from_slice(&content).map_err(|source| ToolkitError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(fields) => Ok(ManifestRecord::from(fields)),
        _ => Err(ToolkitError::NotAnObject(path.to_path_buf())),
    }
}

/// True iff the manifest carries every required field. Values are not checked.
pub fn validate(record: &ManifestRecord) -> bool {
    REQUIRED_FIELDS.iter().all(|key| record.contains(key))
}

/// Lazily list entries directly inside `dir` whose name ends in `.manifest.json`.
///
/// Does not recurse and yields entries in directory order. Anything with a
/// matching name is yielded, directories included, so callers see it and
/// fail to read it instead of silently missing it. Calling `list`
/// again starts a fresh scan.
pub fn list(dir: &Path) -> ManifestIter {
    ManifestIter {
        inner: WalkDir::new(dir).min_depth(1).max_depth(1).into_iter(),
    }
}

/// Iterator returned by [`list`].
pub struct ManifestIter {
    inner: walkdir::IntoIter,
}

impl Iterator for ManifestIter {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(ToolkitError::Io(e.into()))),
            };

            let is_manifest = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(MANIFEST_SUFFIX));

            if is_manifest {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}
