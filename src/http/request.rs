//! Request inspection helpers.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Extract device hints (user agent, viewport client hints)
//! - Extract the page host the browser used to reach the console
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, echoed on the response
//! - Missing or malformed hints simply count as absent

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::api::base_url::hostname_from_authority;
use crate::routing::ClientHints;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Viewport width client hints, newest name first.
pub const VIEWPORT_HINT_HEADERS: &[&str] = &["sec-ch-viewport-width", "viewport-width"];

/// Asks the browser to send the viewport hints on later requests.
pub const ACCEPT_CH: HeaderName = HeaderName::from_static("accept-ch");
pub const ACCEPT_CH_VALUE: &str = "Sec-CH-Viewport-Width, Viewport-Width";

/// Makes Chromium retry a request that lacked the hint, with the hint.
pub const CRITICAL_CH: HeaderName = HeaderName::from_static("critical-ch");
pub const CRITICAL_CH_VALUE: &str = "Sec-CH-Viewport-Width";

/// Generates a UUID v4 for requests arriving without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID set by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

pub fn client_hints(headers: &HeaderMap) -> ClientHints {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let viewport_width = VIEWPORT_HINT_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|w| w.is_finite() && *w >= 0.0)
            .map(|w| w as u32)
    });

    ClientHints::new(user_agent, viewport_width)
}

/// Host name (no port) the client addressed, from `Host` or the URI authority.
pub fn page_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .and_then(hostname_from_authority)
        .map(str::to_string)
}
