//! Configuration management for the backup toolkit.
//!
//! Loads configuration from an optional TOML file, then applies `.env` and
//! process environment overrides. Command-line flags are applied last by the
//! binaries themselves.

use crate::utils::errors::{Result, ToolkitError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitConfig {
    /// Root of the local backup tree; manifests live in `<local_root>/manifests`
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,

    /// Object storage bucket for manifest uploads (unset disables the remote path)
    #[serde(default)]
    pub bucket: Option<String>,

    /// Custom S3 endpoint (MinIO, LocalStack, ...)
    #[serde(default)]
    pub s3_endpoint: Option<String>,

    /// S3 region; falls back to the ambient AWS configuration when unset
    #[serde(default)]
    pub s3_region: Option<String>,

    /// Metrics listener address
    #[serde(default = "default_metrics_host")]
    pub metrics_host: String,

    /// Metrics listener port
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_local_root() -> PathBuf {
    PathBuf::from("./backups")
}

fn default_metrics_host() -> String {
    "0.0.0.0".to_string()
}

fn default_metrics_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            local_root: default_local_root(),
            bucket: None,
            s3_endpoint: None,
            s3_region: None,
            metrics_host: default_metrics_host(),
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
        }
    }
}

impl ToolkitConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ToolkitError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the file (if any), then `.env`, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let _ = dotenvy::dotenv();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Directory that holds local manifests.
    pub fn manifests_dir(&self) -> PathBuf {
        self.local_root.join("manifests")
    }

    /// Apply overrides from a variable lookup. Split out from `load` so tests
    /// don't have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("LOCAL_BACKUP_ROOT").filter(|v| !v.is_empty()) {
            self.local_root = PathBuf::from(root);
        }
        if let Some(bucket) = lookup("BACKUP_BUCKET") {
            self.bucket = Some(bucket);
        }
        if let Some(endpoint) = lookup("BACKUP_S3_ENDPOINT") {
            self.s3_endpoint = Some(endpoint);
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.s3_region = Some(region);
        }
        if let Some(host) = lookup("METRICS_LISTEN_ADDR").filter(|v| !v.is_empty()) {
            self.metrics_host = host;
        }
        if let Some(port) = lookup("METRICS_LISTEN_PORT") {
            self.metrics_port = port.trim().parse().map_err(|_| {
                ToolkitError::Config(format!("METRICS_LISTEN_PORT is not a valid port: {port:?}"))
            })?;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.log_level = level;
        }

        // An empty bucket name is the same as no bucket at all
        self.bucket = self.bucket.take().filter(|b| !b.trim().is_empty());
        self.s3_endpoint = self.s3_endpoint.take().filter(|e| !e.trim().is_empty());
        self.s3_region = self.s3_region.take().filter(|r| !r.trim().is_empty());

        Ok(())
    }
}
