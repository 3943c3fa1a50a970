//! Queue reference message.
//!
//! Queue messages have a small payload ceiling (256 KiB on SQS), so the
//! request itself lives in the object store and the queue only carries its
//! coordinates. The message is fixed-shape and independent of body size.

use serde::{Deserialize, Serialize};

use crate::ingest::error::QueuePublishError;

/// Coordinates of a stored request: `{"bucket": ..., "key": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueReference {
    pub bucket: String,
    pub key: String,
}

impl QueueReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Compact JSON message body.
    pub fn to_message(&self) -> Result<String, QueuePublishError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_message(message: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_compact_json() {
        let reference = QueueReference::new("captures", "abc123");
        assert_eq!(
            reference.to_message().unwrap(),
            r#"{"bucket":"captures","key":"abc123"}"#
        );
    }

    #[test]
    fn size_does_not_depend_on_request() {
        let reference = QueueReference::new("captures", uuid::Uuid::new_v4().to_string());
        assert!(reference.to_message().unwrap().len() < 128);
    }
}
