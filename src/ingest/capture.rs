//! Request capture and the stored object encoding.
//!
//! # Stored object layout
//! ```text
//! {
//!   "body":    "<standard base64 of the raw body>",
//!   "headers": { "Content-Type": ["application/json"], ... },
//!   "uri":     "/path?query"
//! }
//! ```
//!
//! Header names are written in canonical MIME form and sorted, so the same
//! request always produces the same bytes. Repeated headers keep their
//! order of arrival.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{HeaderMap, Uri};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use http_body_util::LengthLimitError;
use serde::{Deserialize, Serialize};

use crate::ingest::error::SerializationError;

/// A fully read inbound request. Lives only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub uri: String,
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Bytes,
}

impl CapturedRequest {
    /// Build a capture from already-read request pieces.
    pub fn new(uri: &Uri, headers: &HeaderMap, body: Bytes) -> Self {
        let mut captured: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in headers.keys() {
            let values = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            captured.insert(canonical_header_key(name.as_str()), values);
        }

        Self {
            uri: uri.to_string(),
            headers: captured,
            body,
        }
    }

    /// Read `body` to completion and capture it alongside the URI and headers.
    ///
    /// Fails without buffering further once more than `limit` bytes arrive.
    pub async fn read(
        uri: &Uri,
        headers: &HeaderMap,
        body: Body,
        limit: usize,
    ) -> Result<Self, SerializationError> {
        let body = read_body(body, limit).await?;
        Ok(Self::new(uri, headers, body))
    }

    /// Encode into the durable representation.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject {
            body: STANDARD.encode(&self.body),
            headers: self.headers.clone(),
            uri: self.uri.clone(),
        }
    }

    /// Encode straight to the JSON bytes written to the object store.
    pub fn to_json(&self) -> Result<Bytes, SerializationError> {
        self.to_stored_object().to_json()
    }
}

/// The JSON document persisted for every accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Base64 of the raw request body.
    pub body: String,
    pub headers: BTreeMap<String, Vec<String>>,
    /// Request target as received, path plus query.
    pub uri: String,
}

impl StoredObject {
    pub fn to_json(&self) -> Result<Bytes, SerializationError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Decode the body back to the original request bytes.
    pub fn decode_body(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.body)
    }
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, SerializationError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        let source = e.into_inner();
        if source.is::<LengthLimitError>() {
            SerializationError::BodyTooLarge { limit }
        } else {
            SerializationError::BodyRead(source.to_string())
        }
    })
}

/// Canonical MIME form of a header name: `x-request-id` becomes `X-Request-Id`.
pub fn canonical_header_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}
