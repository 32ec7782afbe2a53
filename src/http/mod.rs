//! HTTP dev server subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID, device hints, page host)
//!     → proxy.rs       if the path matches a proxy prefix (`/api`)
//!     → routing engine otherwise
//!         → views.rs (HTML shell) | redirect | 404
//! ```

pub mod proxy;
pub mod request;
pub mod server;
pub mod views;

pub use proxy::{Proxy, ProxyError, ProxyTarget};
pub use request::X_REQUEST_ID;
pub use server::{DevServer, ServerError, X_CONSOLE_VIEW};
