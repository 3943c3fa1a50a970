//! Capture-and-handoff pipeline for a single request.
//!
//! # Stages
//! ```text
//! Received → Serializing → Storing → Publishing → Accepted
//!                │            │          │
//!                └────────────┴──────────┴──→ Rejected(error)
//! ```
//!
//! Each stage runs at most once. `Publishing` is only entered after the
//! store acknowledged the object, so a queue reference never points at a
//! missing object. A failed publish leaves the stored object in place.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request};

use crate::config::GatewayConfig;
use crate::ingest::capture::CapturedRequest;
use crate::ingest::error::{IngestError, QueuePublishError, StoreWriteError};
use crate::ingest::identifier::{IdResolver, RequestId};
use crate::ingest::reference::QueueReference;
use crate::queue::QueuePublisher;
use crate::storage::ObjectStore;

/// Pipeline stage, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Serializing,
    Storing,
    Publishing,
    Accepted,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Serializing => "serializing",
            Stage::Storing => "storing",
            Stage::Publishing => "publishing",
            Stage::Accepted => "accepted",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that reached a failure terminal state.
#[derive(Debug)]
pub struct Rejection {
    pub request_id: RequestId,
    pub stage: Stage,
    pub error: IngestError,
}

/// Runs the pipeline against shared, read-only collaborator handles.
#[derive(Clone)]
pub struct Ingestor {
    resolver: IdResolver,
    store: Arc<dyn ObjectStore>,
    queue: Arc<dyn QueuePublisher>,
    bucket: Arc<str>,
    queue_url: Arc<str>,
    max_body_bytes: usize,
    store_timeout: Duration,
    queue_timeout: Duration,
}

impl Ingestor {
    /// Create a pipeline writing to `bucket` and publishing to `queue_url`.
    ///
    /// Defaults: `Fly-Request-Id` correlation header, 10MB body cap, 30s
    /// store deadline, 10s queue deadline.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        queue: Arc<dyn QueuePublisher>,
        bucket: impl Into<Arc<str>>,
        queue_url: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            resolver: IdResolver::default(),
            store,
            queue,
            bucket: bucket.into(),
            queue_url: queue_url.into(),
            max_body_bytes: 10 * 1024 * 1024,
            store_timeout: Duration::from_secs(30),
            queue_timeout: Duration::from_secs(10),
        }
    }

    /// Create a pipeline from validated configuration.
    pub fn from_config(
        config: &GatewayConfig,
        store: Arc<dyn ObjectStore>,
        queue: Arc<dyn QueuePublisher>,
    ) -> Self {
        let mut ingestor = Self::new(
            store,
            queue,
            config.storage.bucket.clone(),
            config.queue.queue_url.clone(),
        )
        .with_max_body_bytes(config.ingest.max_body_bytes)
        .with_store_timeout(Duration::from_secs(config.timeouts.store_secs))
        .with_queue_timeout(Duration::from_secs(config.timeouts.queue_secs));

        // validated at load time
        if let Ok(header) = HeaderName::try_from(config.ingest.correlation_header.as_str()) {
            ingestor = ingestor.with_correlation_header(header);
        }
        ingestor
    }

    pub fn with_correlation_header(mut self, header: HeaderName) -> Self {
        self.resolver = IdResolver::new(header);
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_queue_timeout(mut self, timeout: Duration) -> Self {
        self.queue_timeout = timeout;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    /// Capture `request`, store it, then publish its reference.
    pub async fn ingest(&self, request: Request<Body>) -> Result<RequestId, Rejection> {
        let (parts, body) = request.into_parts();
        let request_id = self.resolver.resolve(&parts.headers);

        tracing::info!(
            request_id = %request_id,
            stage = %Stage::Received,
            id_source = request_id.source().as_str(),
            method = %parts.method,
            uri = %parts.uri,
            "Request received"
        );

        let reject = |stage: Stage, error: IngestError| Rejection {
            request_id: request_id.clone(),
            stage,
            error,
        };

        tracing::debug!(request_id = %request_id, stage = %Stage::Serializing, "Capturing request");
        let object = CapturedRequest::read(&parts.uri, &parts.headers, body, self.max_body_bytes)
            .await
            .and_then(|captured| captured.to_json())
            .map_err(|e| reject(Stage::Serializing, e.into()))?;

        tracing::debug!(
            request_id = %request_id,
            stage = %Stage::Storing,
            size = object.len(),
            "Writing object"
        );
        self.store_object(request_id.as_str(), object)
            .await
            .map_err(|e| reject(Stage::Storing, e.into()))?;

        tracing::debug!(request_id = %request_id, stage = %Stage::Publishing, "Publishing reference");
        self.publish_reference(request_id.as_str())
            .await
            .map_err(|e| reject(Stage::Publishing, e.into()))?;

        tracing::debug!(request_id = %request_id, stage = %Stage::Accepted, "Request captured");
        Ok(request_id)
    }

    async fn store_object(&self, key: &str, object: bytes::Bytes) -> Result<(), StoreWriteError> {
        tokio::time::timeout(self.store_timeout, self.store.put(&self.bucket, key, object))
            .await
            .map_err(|_| StoreWriteError::Timeout(self.store_timeout))?
    }

    async fn publish_reference(&self, key: &str) -> Result<(), QueuePublishError> {
        let message = QueueReference::new(&*self.bucket, key).to_message()?;
        tokio::time::timeout(self.queue_timeout, self.queue.send(&self.queue_url, message))
            .await
            .map_err(|_| QueuePublishError::Timeout(self.queue_timeout))?
    }
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("correlation_header", self.resolver.header())
            .field("bucket", &self.bucket)
            .field("queue_url", &self.queue_url)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}
