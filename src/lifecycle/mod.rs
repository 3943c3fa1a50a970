//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build collaborators → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     Install handlers (failure is fatal) → SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! State (state.rs):
//!     Starting → Listening → Draining → Stopped
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then collaborators, then listener
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: exceeding it is a fatal exit

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::{Shutdown, ShutdownReason};
pub use signals::SignalListener;
pub use startup::{build_collaborators, Collaborators};
pub use state::{Lifecycle, ServerState};
