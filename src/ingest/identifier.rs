//! Request identifier resolution.
//!
//! The identifier is the object key in the store and the key carried by the
//! queue reference, so it is resolved once per request and passed by value
//! to both stages.

use axum::http::{HeaderMap, HeaderName};
use uuid::Uuid;

/// Default header carrying a caller-supplied request identifier.
pub const FLY_REQUEST_ID: &str = "fly-request-id";

/// Where a [`RequestId`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdSource {
    /// Taken verbatim from the correlation header.
    Header,
    /// Freshly generated (UUID v4).
    Generated,
}

impl IdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdSource::Header => "header",
            IdSource::Generated => "generated",
        }
    }
}

/// Unique, non-empty identifier for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId {
    value: String,
    source: IdSource,
}

impl RequestId {
    /// Generate a new random identifier.
    pub fn generate() -> Self {
        Self {
            value: Uuid::new_v4().to_string(),
            source: IdSource::Generated,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> IdSource {
        self.source
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Resolves request identifiers from a configured correlation header.
#[derive(Debug, Clone)]
pub struct IdResolver {
    header: HeaderName,
}

impl IdResolver {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Name of the correlation header this resolver reads.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Return the correlation header value verbatim, or a generated id when
    /// the header is missing, empty or not valid UTF-8.
    pub fn resolve(&self, headers: &HeaderMap) -> RequestId {
        let Some(raw) = headers.get(&self.header) else {
            tracing::debug!(header = %self.header, "No correlation header, generating request id");
            return RequestId::generate();
        };

        match std::str::from_utf8(raw.as_bytes()) {
            Ok(value) if !value.is_empty() => RequestId {
                value: value.to_string(),
                source: IdSource::Header,
            },
            Ok(_) => {
                tracing::debug!(header = %self.header, "Empty correlation header, generating request id");
                RequestId::generate()
            }
            Err(_) => {
                tracing::debug!(header = %self.header, "Correlation header is not UTF-8, generating request id");
                RequestId::generate()
            }
        }
    }
}

impl Default for IdResolver {
    fn default() -> Self {
        Self::new(HeaderName::from_static(FLY_REQUEST_ID))
    }
}
