//! Best-effort mirroring of manifests to object storage.
//!
//! The remote side is a capability: a job either gets a [`RemoteStore`] or a
//! reason why none is available. Neither case is fatal to a backup.

#[cfg(feature = "s3")]
pub mod s3;

use crate::config::ToolkitConfig;
use crate::utils::errors::Result;
use async_trait::async_trait;
use std::path::Path;

/// Object storage that accepts manifest uploads.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload the file at `local_path` under `key`, returning its location.
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String>;
}

/// Whether a remote store can be used for this run.
pub enum RemoteTarget {
    Available(Box<dyn RemoteStore>),
    Unavailable(String),
}

impl RemoteTarget {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        RemoteTarget::Unavailable(reason.into())
    }
}

impl std::fmt::Debug for RemoteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteTarget::Available(_) => f.write_str("RemoteTarget::Available"),
            RemoteTarget::Unavailable(reason) => write!(f, "RemoteTarget::Unavailable({reason:?})"),
        }
    }
}

/// Resolve the remote store from configuration.
///
/// Requires both an S3-capable build and a configured bucket.
pub async fn connect(config: &ToolkitConfig) -> RemoteTarget {
    let Some(bucket) = config.bucket.clone() else {
        return RemoteTarget::unavailable("BACKUP_BUCKET is not set");
    };

    connect_bucket(config, bucket).await
}

#[cfg(feature = "s3")]
async fn connect_bucket(config: &ToolkitConfig, bucket: String) -> RemoteTarget {
    let store = s3::S3Store::new(
        bucket,
        config.s3_region.clone(),
        config.s3_endpoint.clone(),
    )
    .await;
    RemoteTarget::Available(Box::new(store))
}

#[cfg(not(feature = "s3"))]
async fn connect_bucket(_config: &ToolkitConfig, bucket: String) -> RemoteTarget {
    RemoteTarget::unavailable(format!(
        "bucket {bucket} is configured but this build has no S3 client (enable the `s3` feature)"
    ))
}
