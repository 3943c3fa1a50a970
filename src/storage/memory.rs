//! In-memory object store.
//!
//! Used with `storage.backend = "memory"` for local runs without AWS, and by
//! tests to inject write failures and slow writes.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::ingest::error::StoreWriteError;
use crate::storage::ObjectStore;

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<(String, String), Bytes>,
    attempts: AtomicUsize,
    fail_writes: AtomicBool,
    delay_ms: AtomicU64,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay every following write before it is acknowledged.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of `put` calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreWriteError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreWriteError::Backend {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "store unavailable".to_string(),
            });
        }

        self.objects.insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_overwrites() {
        let store = InMemoryObjectStore::new();
        store.put("b", "k", Bytes::from_static(b"one")).await.unwrap();
        store.put("b", "k", Bytes::from_static(b"two")).await.unwrap();

        assert_eq!(store.get("b", "k"), Some(Bytes::from_static(b"two")));
        assert_eq!(store.get("other", "k"), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.attempts(), 2);
    }

    #[tokio::test]
    async fn injected_failure_stores_nothing() {
        let store = InMemoryObjectStore::new();
        store.fail_writes(true);

        let err = store.put("b", "k", Bytes::new()).await.unwrap_err();
        assert!(matches!(err, StoreWriteError::Backend { .. }));
        assert!(store.is_empty());
        assert_eq!(store.attempts(), 1);
    }
}
