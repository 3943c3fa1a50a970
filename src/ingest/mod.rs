//! Request ingestion subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → identifier.rs (correlation header or UUID v4)
//!     → capture.rs (read body, encode stored object JSON)
//!     → ObjectStore::put (durable write, acknowledged)
//!     → reference.rs ({"bucket","key"} message)
//!     → QueuePublisher::send (acknowledged)
//! ```
//!
//! # Design Decisions
//! - One identifier per request, shared by the object key and the reference
//! - Publish strictly after the store acknowledged the object
//! - Single attempt per stage; callers retry at the HTTP level

pub mod capture;
pub mod error;
pub mod identifier;
pub mod pipeline;
pub mod reference;

pub use capture::{CapturedRequest, StoredObject};
pub use error::{IngestError, QueuePublishError, SerializationError, StoreWriteError};
pub use identifier::{IdResolver, IdSource, RequestId, FLY_REQUEST_ID};
pub use pipeline::{Ingestor, Rejection, Stage};
pub use reference::QueueReference;
