//! Verification of every manifest in a directory.
//!
//! The scan never stops early: every manifest is checked and every problem is
//! reported.

use super::{EXIT_INVALID, EXIT_SUCCESS};
use crate::manifest::{self, REQUIRED_FIELDS};
use crate::utils::errors::ToolkitError;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug)]
pub enum InvalidReason {
    /// Parsed, but required keys are absent
    MissingFields(Vec<&'static str>),
    /// Could not be read or parsed
    Unreadable(ToolkitError),
}

#[derive(Debug)]
pub struct InvalidManifest {
    pub path: PathBuf,
    pub reason: InvalidReason,
}

impl fmt::Display for InvalidManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            InvalidReason::MissingFields(missing) => write!(
                f,
                "Invalid manifest: {} (missing {})",
                self.path.display(),
                missing.join(", ")
            ),
            InvalidReason::Unreadable(error) => {
                write!(f, "Error reading manifest: {}: {}", self.path.display(), error)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Number of manifest files examined
    pub checked: usize,
    pub invalid: Vec<InvalidManifest>,
}

impl VerifyReport {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_valid() {
            EXIT_SUCCESS
        } else {
            EXIT_INVALID
        }
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "All manifests look valid.");
        }
        let lines: Vec<String> = self.invalid.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Check every `*.manifest.json` directly inside `dir`, creating `dir` if absent.
pub fn verify(dir: &Path) -> VerifyReport {
    let mut report = VerifyReport::default();

    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Cannot create manifests directory {}: {}", dir.display(), e);
        report.invalid.push(InvalidManifest {
            path: dir.to_path_buf(),
            reason: InvalidReason::Unreadable(e.into()),
        });
        return report;
    }

    for entry in manifest::list(dir) {
        let path = match entry {
            Ok(path) => path,
            Err(error) => {
                warn!("Failed to scan {}: {}", dir.display(), error);
                report.invalid.push(InvalidManifest {
                    path: dir.to_path_buf(),
                    reason: InvalidReason::Unreadable(error),
                });
                continue;
            }
        };

        report.checked += 1;
        if let Some(reason) = check(&path) {
            warn!("Invalid manifest {}", path.display());
            report.invalid.push(InvalidManifest { path, reason });
        }
    }

    info!(
        "Verified {} manifests in {} ({} invalid)",
        report.checked,
        dir.display(),
        report.invalid.len()
    );
    report
}

fn check(path: &Path) -> Option<InvalidReason> {
    match manifest::read(path) {
        Ok(record) if manifest::validate(&record) => None,
        Ok(record) => Some(InvalidReason::MissingFields(
            REQUIRED_FIELDS
                .iter()
                .copied()
                .filter(|key| !record.contains(key))
                .collect(),
        )),
        Err(error) => Some(InvalidReason::Unreadable(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_directory_is_valid() {
        let temp_dir = TempDir::new().unwrap();

        let report = verify(temp_dir.path());

        assert_eq!(report.checked, 0);
        assert_eq!(report.exit_code(), EXIT_SUCCESS);
        assert_eq!(report.to_string(), "All manifests look valid.");
    }

    #[test]
    fn test_missing_directory_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("backups/manifests");

        let report = verify(&dir);

        assert!(dir.is_dir());
        assert_eq!(report.exit_code(), EXIT_SUCCESS);
    }

    #[test]
    fn test_one_good_one_empty_object() {
        let temp_dir = TempDir::new().unwrap();
        manifest::write_at("web", temp_dir.path(), 1_700_000_000).unwrap();
        fs::write(temp_dir.path().join("bad.manifest.json"), b"{}").unwrap();

        let report = verify(temp_dir.path());

        assert_eq!(report.checked, 2);
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.exit_code(), EXIT_INVALID);
        assert!(matches!(
            &report.invalid[0].reason,
            InvalidReason::MissingFields(missing) if missing == &vec!["target", "timestamp"]
        ));
        let output = report.to_string();
        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("Invalid manifest: "));
        assert!(output.contains("bad.manifest.json"));
    }

    #[test]
    fn test_scan_continues_past_errors() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.manifest.json"), b"{ broken").unwrap();
        fs::write(temp_dir.path().join("b.manifest.json"), br#"{"target": "x"}"#).unwrap();
        manifest::write_at("c", temp_dir.path(), 3).unwrap();
        fs::write(temp_dir.path().join("readme.md"), b"not a manifest").unwrap();

        let report = verify(temp_dir.path());

        assert_eq!(report.checked, 3);
        assert_eq!(report.invalid.len(), 2);
        assert!(report
            .invalid
            .iter()
            .any(|m| matches!(&m.reason, InvalidReason::Unreadable(e) if e.is_parse())));
        assert!(report
            .invalid
            .iter()
            .any(|m| matches!(&m.reason, InvalidReason::MissingFields(f) if f == &vec!["timestamp"])));
    }

    #[test]
    fn test_directory_with_manifest_name_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        manifest::write_at("web", temp_dir.path(), 1).unwrap();
        fs::create_dir(temp_dir.path().join("nested.manifest.json")).unwrap();

        let report = verify(temp_dir.path());

        assert_eq!(report.checked, 2);
        assert_eq!(report.invalid.len(), 1);
        assert!(report.invalid[0].path.ends_with("nested.manifest.json"));
        assert!(matches!(
            &report.invalid[0].reason,
            InvalidReason::Unreadable(ToolkitError::Io(_))
        ));
        assert!(report.to_string().starts_with("Error reading manifest: "));
    }

    #[test]
    fn test_directory_path_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("manifests");
        fs::write(&blocker, b"blocker").unwrap();

        let report = verify(&blocker);

        assert_eq!(report.exit_code(), EXIT_INVALID);
        assert_eq!(report.invalid.len(), 1);
    }
}
