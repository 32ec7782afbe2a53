//! Prefix proxy to the backend.
//!
//! # Responsibilities
//! - Pick the first proxy rule whose prefix matches the request path
//! - Rewrite the URI to the rule's upstream, path and query unchanged
//! - Optionally rewrite `Host` to the upstream authority (change origin)
//! - Stream request and response bodies without buffering
//!
//! # Design Decisions
//! - One pooled hyper client shared by every rule
//! - No retries: a failed upstream call is a 502
//! - Hop-by-hop headers stripped in both directions

use axum::{
    body::Body,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::ProxyRule;
use crate::routing::PathPrefixMatcher;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("proxy target {0:?} must be an http URL with a host")]
    InvalidTarget(String),
}

/// A compiled proxy rule.
#[derive(Debug, Clone)]
pub struct ProxyTarget {
    matcher: PathPrefixMatcher,
    prefix: String,
    authority: Authority,
    change_origin: bool,
}

impl ProxyTarget {
    pub fn from_rule(rule: &ProxyRule) -> Result<Self, ProxyError> {
        let invalid = || ProxyError::InvalidTarget(rule.target.clone());
        let uri: Uri = rule.target.parse().map_err(|_| invalid())?;
        if uri.scheme() != Some(&Scheme::HTTP) {
            return Err(invalid());
        }
        let authority = uri.authority().cloned().ok_or_else(invalid)?;

        Ok(Self {
            matcher: PathPrefixMatcher::new(rule.prefix.clone()),
            prefix: rule.prefix.clone(),
            authority,
            change_origin: rule.change_origin,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Upstream URI for an incoming one.
    pub fn upstream_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

/// Forwards matching requests to their upstream.
#[derive(Clone)]
pub struct Proxy {
    targets: Vec<ProxyTarget>,
    client: Client<HttpConnector, Body>,
}

impl Proxy {
    pub fn new(rules: &[ProxyRule]) -> Result<Self, ProxyError> {
        let targets = rules
            .iter()
            .map(ProxyTarget::from_rule)
            .collect::<Result<Vec<_>, _>>()?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self { targets, client })
    }

    pub fn targets(&self) -> &[ProxyTarget] {
        &self.targets
    }

    /// First rule whose prefix matches `path`.
    pub fn find(&self, path: &str) -> Option<&ProxyTarget> {
        self.targets.iter().find(|t| t.matcher.matches(path))
    }

    pub async fn forward(&self, target: &ProxyTarget, request: Request<Body>, request_id: &str) -> Response {
        let (mut parts, body) = request.into_parts();

        parts.uri = match target.upstream_uri(&parts.uri) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
                return (StatusCode::BAD_GATEWAY, "Invalid upstream URI").into_response();
            }
        };
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);

        if target.change_origin {
            if let Ok(host) = HeaderValue::from_str(target.authority.as_str()) {
                parts.headers.insert(header::HOST, host);
            }
        }

        tracing::debug!(
            request_id = %request_id,
            method = %parts.method,
            upstream = %parts.uri,
            "Proxying request"
        );

        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(response) => downstream_response(response),
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    upstream = %target.authority,
                    error = %e,
                    "Upstream error"
                );
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        }
    }
}

fn downstream_response(response: hyper::Response<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// Drop the fixed hop-by-hop set plus every header the `Connection` header
/// names.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}
