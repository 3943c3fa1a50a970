//! Per-request pipeline errors.

use std::time::Duration;

use thiserror::Error;

/// The request could not be turned into a stored object.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The body stream failed before it was fully read.
    #[error("could not read request body: {0}")]
    BodyRead(String),

    /// The body exceeded the configured capture limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// JSON encoding of the captured request failed.
    #[error("could not encode captured request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The object store did not acknowledge the write.
#[derive(Debug, Error)]
pub enum StoreWriteError {
    #[error("could not write object {key} to {bucket}: {message}")]
    Backend {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("object write timed out after {0:?}")]
    Timeout(Duration),
}

/// The queue broker did not acknowledge the reference message.
#[derive(Debug, Error)]
pub enum QueuePublishError {
    #[error("could not encode queue reference: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("could not send to {queue_url}: {message}")]
    Backend { queue_url: String, message: String },

    #[error("queue publish timed out after {0:?}")]
    Timeout(Duration),
}

/// Terminal failure of one ingestion attempt.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    #[error("store write failed: {0}")]
    StoreWrite(#[from] StoreWriteError),

    #[error("queue publish failed: {0}")]
    QueuePublish(#[from] QueuePublishError),
}

impl IngestError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Serialization(_) => "serialization",
            IngestError::StoreWrite(_) => "store_write",
            IngestError::QueuePublish(_) => "queue_publish",
        }
    }
}
