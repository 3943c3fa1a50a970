//! Object store subsystem.
//!
//! # Data Flow
//! ```text
//! ingest pipeline
//!     → ObjectStore::put(bucket, key, json)
//!         → s3.rs (AWS S3 / compatible endpoint)
//!         → memory.rs (local runs and tests)
//!     → Ok only after the store acknowledged the write
//! ```
//!
//! # Design Decisions
//! - Handles are shared read-only across requests (`Arc<dyn ObjectStore>`)
//! - No retries here; a failed put is terminal for the request
//! - Deadlines are applied by the caller

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::ingest::error::StoreWriteError;

pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

/// Durable write side of an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Write `body` under `bucket`/`key`, returning once it is durable.
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreWriteError>;
}
