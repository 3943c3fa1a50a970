//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured address
//!     → listener.rs (bind, fatal BindError on failure)
//!     → Hand off to HTTP layer (axum::serve)
//!     → in_flight.rs (per-request guard while the pipeline runs)
//! ```
//!
//! # Design Decisions
//! - Bind happens before any request is accepted; failure aborts startup
//! - Every pipeline run is tracked so draining can report outstanding work

pub mod in_flight;
pub mod listener;

pub use in_flight::{InFlightGuard, InFlightTracker};
pub use listener::{BindError, Listener};
