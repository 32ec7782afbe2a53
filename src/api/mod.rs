//! Backend API client subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → client.rs (one async method per backend operation)
//!     → endpoints.rs (method, path, query, body as an ApiRequest)
//!     → base_url.rs (resolved base URL + endpoint path)
//!     → reqwest (10s timeout, JSON default headers)
//!     → ApiResponse | ApiError
//! ```
//!
//! # Design Decisions
//! - Request shapes are plain data so each operation can be checked offline
//! - No validation, retry or caching; the backend owns every invariant
//! - Base URL resolved once at construction, from an explicit policy

pub mod base_url;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod types;

pub use base_url::BaseUrlPolicy;
pub use client::{ApiResponse, GridApiClient, DEFAULT_TIMEOUT};
pub use endpoints::{ApiRequest, FormField, RequestBody};
pub use error::ApiError;
pub use types::{BatchImport, BrokerType, GridCalculationMode, Id, ImageBlob, NewStrategy};
