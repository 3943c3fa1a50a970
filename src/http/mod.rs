//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routing, shutdown)
//!     → request.rs (tracing span with correlation id)
//!     → /up: constant liveness response
//!     → anything else: ingest pipeline
//!     → response.rs (200 "done" / 500 "server error")
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::CorrelationSpan;
pub use response::{Accepted, DONE_BODY, SERVER_ERROR_BODY, UP_BODY};
pub use server::{AppState, HttpServer, ServerError};
