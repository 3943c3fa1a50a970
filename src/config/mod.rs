//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply CLI/env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → read once at startup by every subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no runtime reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, Overrides};
pub use schema::{
    AwsConfig, GatewayConfig, IngestConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    QueueBackend, QueueConfig, StorageBackend, StorageConfig, TimeoutConfig,
};
pub use validation::ValidationError;
