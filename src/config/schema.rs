//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the capture gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, in-flight cap).
    pub listener: ListenerConfig,

    /// Request capture settings.
    pub ingest: IngestConfig,

    /// Object store target.
    pub storage: StorageConfig,

    /// Queue target.
    pub queue: QueueConfig,

    /// Shared AWS client overrides.
    pub aws: AwsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum requests processed at once (backpressure).
    pub max_in_flight: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_in_flight: 10_000,
        }
    }
}

/// Request capture configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Header carrying the caller-supplied request identifier.
    pub correlation_header: String,

    /// Largest request body that will be captured, in bytes.
    pub max_body_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            correlation_header: "Fly-Request-Id".to_string(),
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Memory,
}

/// Object store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store implementation.
    pub backend: StorageBackend,

    /// Bucket that captured requests are written to.
    pub bucket: String,

    /// Use path-style addressing (needed by most S3 emulators).
    pub force_path_style: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            bucket: String::new(),
            force_path_style: false,
        }
    }
}

/// Which queue implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    #[default]
    Sqs,
    Memory,
}

/// Queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct QueueConfig {
    /// Queue implementation.
    pub backend: QueueBackend,

    /// Queue endpoint URL references are published to.
    pub queue_url: String,
}

/// AWS client overrides. Unset fields fall back to the default provider chain.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AwsConfig {
    /// Region override (e.g., "us-east-1").
    pub region: Option<String>,

    /// Endpoint override for S3/SQS compatible services.
    pub endpoint_url: Option<String>,
}

/// Timeout configuration for the collaborator calls and shutdown.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a single object store write, in seconds.
    pub store_secs: u64,

    /// Deadline for a single queue publish, in seconds.
    pub queue_secs: u64,

    /// Grace period for in-flight requests after a shutdown signal, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            store_secs: 30,
            queue_secs: 10,
            shutdown_grace_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
