//! Queue subsystem.
//!
//! # Data Flow
//! ```text
//! ingest pipeline (after the object write is acknowledged)
//!     → QueuePublisher::send(queue_url, {"bucket","key"})
//!         → sqs.rs (AWS SQS / compatible endpoint)
//!         → memory.rs (local runs and tests)
//!     → Ok only after the broker acknowledged the message
//! ```

pub mod memory;
pub mod sqs;

use async_trait::async_trait;

use crate::ingest::error::QueuePublishError;

pub use memory::InMemoryQueue;
pub use sqs::SqsPublisher;

/// Publishing side of a message queue.
#[async_trait]
pub trait QueuePublisher: Send + Sync + 'static {
    /// Send `message` to `queue_url`, returning once the broker accepted it.
    async fn send(&self, queue_url: &str, message: String) -> Result<(), QueuePublishError>;
}
