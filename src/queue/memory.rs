//! In-memory queue, the counterpart of [`crate::storage::InMemoryObjectStore`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ingest::error::QueuePublishError;
use crate::queue::QueuePublisher;

/// A message accepted by [`InMemoryQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub queue_url: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct InMemoryQueue {
    messages: Mutex<Vec<SentMessage>>,
    attempts: AtomicUsize,
    fail_sends: AtomicBool,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail (or succeed again).
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Messages accepted so far, in send order.
    pub fn messages(&self) -> Vec<SentMessage> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `send` calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueuePublisher for InMemoryQueue {
    async fn send(&self, queue_url: &str, message: String) -> Result<(), QueuePublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(QueuePublishError::Backend {
                queue_url: queue_url.to_string(),
                message: "broker unavailable".to_string(),
            });
        }

        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMessage {
                queue_url: queue_url.to_string(),
                body: message,
            });
        Ok(())
    }
}
