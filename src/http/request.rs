//! Per-request tracing span.
//!
//! # Responsibilities
//! - Open a span for every request before any handler runs
//! - Attach the caller's correlation id so edge logs and ours line up
//!
//! # Design Decisions
//! - The span only reads the header; identifier resolution (and generation
//!   when the header is absent) belongs to the ingest pipeline

use axum::http::{HeaderName, Request};
use tower_http::trace::MakeSpan;
use tracing::Span;

use crate::ingest::FLY_REQUEST_ID;

/// [`MakeSpan`] that records method, URI and the correlation header.
#[derive(Debug, Clone)]
pub struct CorrelationSpan {
    header: HeaderName,
}

impl CorrelationSpan {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl Default for CorrelationSpan {
    fn default() -> Self {
        Self::new(HeaderName::from_static(FLY_REQUEST_ID))
    }
}

impl<B> MakeSpan<B> for CorrelationSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let correlation_id = request
            .headers()
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            correlation_id = %correlation_id,
        )
    }
}
