//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the selected backends have the targets they need
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::schema::{GatewayConfig, QueueBackend, StorageBackend};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("listener.max_in_flight must be greater than zero")]
    ZeroInFlight,

    #[error("listener.max_in_flight must be at most {max}, got {value}")]
    TooManyInFlight { value: usize, max: usize },

    #[error("invalid correlation header name '{0}'")]
    CorrelationHeader(String),

    #[error("ingest.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("storage.bucket is required for the s3 backend")]
    MissingBucket,

    #[error("queue.queue_url is required for the sqs backend")]
    MissingQueueUrl,

    #[error("invalid queue url '{0}'")]
    QueueUrl(String),

    #[error("invalid aws endpoint url '{0}'")]
    EndpointUrl(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_in_flight == 0 {
        errors.push(ValidationError::ZeroInFlight);
    } else if config.listener.max_in_flight > Semaphore::MAX_PERMITS {
        errors.push(ValidationError::TooManyInFlight {
            value: config.listener.max_in_flight,
            max: Semaphore::MAX_PERMITS,
        });
    }

    if HeaderName::try_from(config.ingest.correlation_header.as_str()).is_err() {
        errors.push(ValidationError::CorrelationHeader(
            config.ingest.correlation_header.clone(),
        ));
    }
    if config.ingest.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.storage.backend == StorageBackend::S3 && config.storage.bucket.is_empty() {
        errors.push(ValidationError::MissingBucket);
    }

    if config.queue.backend == QueueBackend::Sqs {
        if config.queue.queue_url.is_empty() {
            errors.push(ValidationError::MissingQueueUrl);
        } else if url::Url::parse(&config.queue.queue_url).is_err() {
            errors.push(ValidationError::QueueUrl(config.queue.queue_url.clone()));
        }
    }

    if let Some(endpoint) = &config.aws.endpoint_url {
        if url::Url::parse(endpoint).is_err() {
            errors.push(ValidationError::EndpointUrl(endpoint.clone()));
        }
    }

    let timeouts = &config.timeouts;
    for (name, secs) in [
        ("store_secs", timeouts.store_secs),
        ("queue_secs", timeouts.queue_secs),
        ("shutdown_grace_secs", timeouts.shutdown_grace_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
