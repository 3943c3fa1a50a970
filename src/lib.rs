//! Capture Gateway Library

// Core pipeline
pub mod ingest;
pub mod queue;
pub mod storage;

// Serving
pub mod config;
pub mod http;
pub mod net;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use ingest::Ingestor;
pub use lifecycle::Shutdown;
