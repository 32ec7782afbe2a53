//! Grid trading console: backend API client, console route table and dev server.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use api::{ApiError, GridApiClient};
pub use config::ConsoleConfig;
pub use http::DevServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
