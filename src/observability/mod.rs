//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (request_id, path, view, upstream)
//!
//! Consumers:
//!     → logging.rs (fmt subscriber on stderr)
//! ```

pub mod logging;
