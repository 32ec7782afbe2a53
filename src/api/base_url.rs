//! Backend base-URL resolution.
//!
//! # Policies
//! - `Fixed`: a literal such as `http://localhost:8080/api`.
//! - `SameHost`: the backend lives on the host that served the console, on a
//!   fixed port. `http://<page-host>:8080/api`, `localhost` when no host is
//!   known.
//!
//! Resolution happens once, when a client is built. There is no fallback
//! negotiation: a wrong guess shows up as connection errors on every call.

use url::Url;

/// Host used when the page host is unknown.
pub const DEFAULT_HOST: &str = "localhost";

/// How the backend base URL is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrlPolicy {
    Fixed(Url),
    SameHost {
        scheme: String,
        port: u16,
        prefix: String,
    },
}

impl BaseUrlPolicy {
    /// Parse a fixed base URL.
    pub fn fixed(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::Fixed(Url::parse(base_url)?))
    }

    /// `http://<host>:<port><prefix>`.
    pub fn same_host(port: u16, prefix: impl Into<String>) -> Self {
        Self::SameHost {
            scheme: "http".to_string(),
            port,
            prefix: prefix.into(),
        }
    }

    /// Resolve the base URL for a page served from `page_host`.
    ///
    /// `page_host` is a bare host name (no port); IPv6 literals keep their
    /// brackets. `None` or an empty host falls back to [`DEFAULT_HOST`].
    pub fn resolve(&self, page_host: Option<&str>) -> Result<Url, url::ParseError> {
        match self {
            BaseUrlPolicy::Fixed(url) => Ok(url.clone()),
            BaseUrlPolicy::SameHost { scheme, port, prefix } => {
                let host = page_host
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .unwrap_or(DEFAULT_HOST);
                let prefix = prefix.trim_end_matches('/');
                let sep = if prefix.is_empty() || prefix.starts_with('/') { "" } else { "/" };
                Url::parse(&format!("{}://{}:{}{}{}", scheme, host, port, sep, prefix))
            }
        }
    }
}

impl Default for BaseUrlPolicy {
    fn default() -> Self {
        Self::same_host(8080, "/api")
    }
}

/// Strip the port from a `Host` header value, keeping IPv6 brackets.
pub fn hostname_from_authority(authority: &str) -> Option<&str> {
    let authority = authority.trim();
    if authority.is_empty() {
        return None;
    }
    if authority.starts_with('[') {
        return authority.find(']').map(|end| &authority[..=end]);
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => Some(host),
        _ => Some(authority),
    }
}

/// Append an endpoint path (and query) to a base URL without dropping the
/// base's own path segment.
pub fn join(base: &Url, path: &str, query: &[(String, String)]) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("{}{}", base.as_str().trim_end_matches('/'), path))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}
