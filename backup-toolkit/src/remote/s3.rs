//! S3 (or S3-compatible) manifest uploads.

use super::RemoteStore;
use crate::utils::errors::{Result, ToolkitError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;

/// Uploads manifests into a single bucket using ambient AWS credentials.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from the ambient AWS configuration.
    ///
    /// `endpoint` switches to path-style addressing for MinIO/LocalStack.
    pub async fn new(bucket: String, region: Option<String>, endpoint: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        if let Some(ref endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&shared);
        if endpoint.is_some() {
            s3_config = s3_config.force_path_style(true);
        }

        Self {
            client: Client::from_conf(s3_config.build()),
            bucket,
        }
    }
}

#[async_trait]
impl RemoteStore for S3Store {
    async fn upload(&self, local_path: &Path, key: &str) -> Result<String> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| ToolkitError::Remote(format!("{}: {}", local_path.display(), e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                ToolkitError::Remote(format!(
                    "Failed to upload {}: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}
