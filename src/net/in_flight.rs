//! In-flight request tracking with backpressure.
//!
//! # Responsibilities
//! - Count requests currently inside the ingestion pipeline
//! - Enforce `max_in_flight` via semaphore
//! - Report outstanding work while draining
//! - Keep the `ingest_in_flight` gauge current

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::observability::metrics;

/// Global atomic counter for slot IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static SLOT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Tracks pipelines in progress for graceful shutdown.
///
/// When the limit is reached, new requests wait for a slot before their body
/// is read.
#[derive(Debug, Clone)]
pub struct InFlightTracker {
    active_count: Arc<AtomicU64>,
    limit: Arc<Semaphore>,
    max_in_flight: usize,
}

impl InFlightTracker {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            active_count: Arc::new(AtomicU64::new(0)),
            limit: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    /// Wait for a free slot and record a new in-flight request.
    /// Returns a guard that releases the slot on drop.
    pub async fn track(&self) -> InFlightGuard {
        // The semaphore is never closed, so acquisition only waits.
        let permit = self.limit.clone().acquire_owned().await.ok();

        self.active_count.fetch_add(1, Ordering::SeqCst);
        metrics::in_flight_changed(1.0);
        InFlightGuard {
            active_count: Arc::clone(&self.active_count),
            id: SLOT_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            _permit: permit,
        }
    }

    /// Get current in-flight count.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Get current free slots.
    pub fn available_permits(&self) -> usize {
        self.limit.available_permits()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

/// Guard that tracks one request's time in the pipeline.
/// Releases its slot when dropped, including on cancellation.
#[derive(Debug)]
pub struct InFlightGuard {
    active_count: Arc<AtomicU64>,
    id: u64,
    _permit: Option<OwnedSemaphorePermit>,
}

impl InFlightGuard {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        metrics::in_flight_changed(-1.0);
        tracing::trace!(slot = self.id, "Request left pipeline");
    }
}
