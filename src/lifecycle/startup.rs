//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the store and queue client handles once, before serving
//! - Share them read-only with every request
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - AWS configuration is only loaded when an AWS backend is selected
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::config::{AwsConfig, GatewayConfig, QueueBackend, StorageBackend};
use crate::queue::{InMemoryQueue, QueuePublisher, SqsPublisher};
use crate::storage::{InMemoryObjectStore, ObjectStore, S3ObjectStore};

/// Process-wide collaborator handles.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn ObjectStore>,
    pub queue: Arc<dyn QueuePublisher>,
}

/// Build the collaborators selected by `config`.
pub async fn build_collaborators(config: &GatewayConfig) -> Collaborators {
    let needs_aws = config.storage.backend == StorageBackend::S3
        || config.queue.backend == QueueBackend::Sqs;
    let sdk_config = if needs_aws {
        Some(load_aws_config(&config.aws).await)
    } else {
        None
    };

    let store: Arc<dyn ObjectStore> = match (&sdk_config, config.storage.backend) {
        (Some(sdk), StorageBackend::S3) => {
            Arc::new(S3ObjectStore::from_sdk_config(sdk, config.storage.force_path_style))
        }
        _ => {
            tracing::warn!("Using in-memory object store; captured requests are not durable");
            Arc::new(InMemoryObjectStore::new())
        }
    };

    let queue: Arc<dyn QueuePublisher> = match (&sdk_config, config.queue.backend) {
        (Some(sdk), QueueBackend::Sqs) => Arc::new(SqsPublisher::from_sdk_config(sdk)),
        _ => {
            tracing::warn!("Using in-memory queue; references are not delivered anywhere");
            Arc::new(InMemoryQueue::new())
        }
    };

    tracing::info!(
        storage = ?config.storage.backend,
        bucket = %config.storage.bucket,
        queue = ?config.queue.backend,
        queue_url = %config.queue.queue_url,
        "Collaborators ready"
    );

    Collaborators { store, queue }
}

/// Load shared AWS configuration from the default provider chain plus overrides.
pub async fn load_aws_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &aws.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &aws.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    loader.load().await
}
