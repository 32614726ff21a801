//! Backup job: write a manifest, mirror it remotely when possible.
//!
//! ```text
//! START -> DRY_RUN                              -> DONE
//! START -> ATTEMPT_REMOTE -> uploaded           -> DONE
//! START -> ATTEMPT_REMOTE -> FALLBACK_LOCAL     -> DONE
//! START -> (any local write failure)            -> FAILED
//! ```
//!
//! The local manifest is the record that must exist; the remote copy is best
//! effort and its failure never fails the job.

use super::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::manifest;
use crate::metrics::{JobCounter, MetricsSink};
use crate::remote::{RemoteStore, RemoteTarget};
use crate::utils::errors::{Result, ToolkitError};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// One backup invocation.
#[derive(Debug, Clone)]
pub struct BackupJob {
    pub target: String,
    pub dry_run: bool,
    /// Local backup root; manifests go to `<local_root>/manifests`
    pub local_root: PathBuf,
}

/// What happened to the remote copy.
#[derive(Debug)]
pub enum RemoteAttempt {
    Uploaded { location: String },
    NotConfigured(String),
    Failed(ToolkitError),
}

/// Outcome of a backup job.
#[derive(Debug)]
pub enum BackupReport {
    DryRun { target: String, manifest: PathBuf },
    Uploaded { location: String },
    Local { manifest: PathBuf, remote: RemoteAttempt },
    Failed { error: ToolkitError },
}

impl BackupReport {
    pub fn exit_code(&self) -> u8 {
        match self {
            BackupReport::Failed { .. } => EXIT_FAILURE,
            _ => EXIT_SUCCESS,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == EXIT_SUCCESS
    }

    /// Path of the local manifest, if one was written under the backup root.
    pub fn local_manifest(&self) -> Option<&Path> {
        match self {
            BackupReport::DryRun { manifest, .. } | BackupReport::Local { manifest, .. } => {
                Some(manifest)
            }
            _ => None,
        }
    }
}

impl fmt::Display for BackupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupReport::DryRun { target, manifest } => {
                writeln!(f, "[dry-run] Simulating backup for {}", target)?;
                write!(f, "[dry-run] Manifest written to {}", manifest.display())
            }
            BackupReport::Uploaded { location } => write!(f, "Uploaded manifest to {}", location),
            BackupReport::Local { manifest, remote } => {
                match remote {
                    RemoteAttempt::NotConfigured(reason) => {
                        writeln!(f, "Remote upload not configured: {}", reason)?
                    }
                    RemoteAttempt::Failed(e) => writeln!(f, "Remote upload failed: {}", e)?,
                    RemoteAttempt::Uploaded { location } => {
                        writeln!(f, "Uploaded manifest to {}", location)?
                    }
                }
                write!(f, "Manifest written to {}", manifest.display())
            }
            BackupReport::Failed { error } => write!(f, "Backup failed: {}", error),
        }
    }
}

impl BackupJob {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            dry_run: false,
            local_root: PathBuf::from("./backups"),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn local_root(mut self, local_root: impl Into<PathBuf>) -> Self {
        self.local_root = local_root.into();
        self
    }

    pub fn manifests_dir(&self) -> PathBuf {
        self.local_root.join("manifests")
    }

    /// Run the job and bump exactly one counter.
    ///
    /// `remote` is ignored for dry runs.
    pub async fn run(&self, remote: RemoteTarget, metrics: &dyn MetricsSink) -> BackupReport {
        info!("Starting backup for target: {} (dry_run: {})", self.target, self.dry_run);

        match self.execute(remote).await {
            Ok(report) => {
                metrics.increment(JobCounter::JobsTotal);
                report
            }
            Err(error) => {
                error!("Backup failed for target {}: {}", self.target, error);
                metrics.increment(JobCounter::JobsFailed);
                BackupReport::Failed { error }
            }
        }
    }

    async fn execute(&self, remote: RemoteTarget) -> Result<BackupReport> {
        manifest::check_target(&self.target)?;

        if self.dry_run {
            let manifest = manifest::write(&self.target, &self.manifests_dir())?;
            info!("[dry-run] Manifest written to {}", manifest.display());
            return Ok(BackupReport::DryRun {
                target: self.target.clone(),
                manifest,
            });
        }

        let attempt = match remote {
            RemoteTarget::Available(store) => match self.upload(store.as_ref()).await {
                Ok(location) => RemoteAttempt::Uploaded { location },
                Err(e) => {
                    warn!("Remote upload failed, falling back to local manifest: {}", e);
                    RemoteAttempt::Failed(e)
                }
            },
            RemoteTarget::Unavailable(reason) => {
                info!("Remote upload not configured: {}", reason);
                RemoteAttempt::NotConfigured(reason)
            }
        };

        if let RemoteAttempt::Uploaded { location } = attempt {
            info!("Uploaded manifest to {}", location);
            return Ok(BackupReport::Uploaded { location });
        }

        let manifest = manifest::write(&self.target, &self.manifests_dir())?;
        info!("Manifest written to {}", manifest.display());
        Ok(BackupReport::Local {
            manifest,
            remote: attempt,
        })
    }

    /// Stage a manifest in the temp directory and upload it under its file name.
    async fn upload(&self, store: &dyn RemoteStore) -> Result<String> {
        let staged = manifest::write(&self.target, &std::env::temp_dir())?;
        let key = staged
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| ToolkitError::Remote(format!("no file name in {}", staged.display())))?;

        let result = store.upload(&staged, &key).await;
        if let Err(e) = std::fs::remove_file(&staged) {
            warn!("Failed to remove staged manifest {}: {}", staged.display(), e);
        }
        result
    }
}
