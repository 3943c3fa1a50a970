//! S3 object store.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::ingest::error::StoreWriteError;
use crate::storage::ObjectStore;

/// Writes captured requests to S3 (or an S3 compatible endpoint).
///
/// The SDK client pools connections internally and is cheap to share.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a client from shared AWS configuration.
    pub fn from_sdk_config(sdk_config: &SdkConfig, force_path_style: bool) -> Self {
        let config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(force_path_style)
            .build();
        Self::new(aws_sdk_s3::Client::from_conf(config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreWriteError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StoreWriteError::Backend {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::trace!(bucket = %bucket, key = %key, size, "Object written");
        Ok(())
    }
}
