//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check URLs and proxy prefixes are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConsoleConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{ApiConfig, BaseUrlMode, ConsoleConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("api.base_url {url:?} is not a valid http(s) URL")]
    InvalidBaseUrl { url: String },

    #[error("api.scheme must be http or https, got {0:?}")]
    InvalidScheme(String),

    #[error("dev_server.proxy[{index}].prefix {prefix:?} must start with '/'")]
    InvalidProxyPrefix { index: usize, prefix: String },

    #[error("dev_server.proxy[{index}].target {target:?} must be a plain http URL with a host")]
    InvalidProxyTarget { index: usize, target: String },
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ConsoleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = api_errors(&config.api);

    if config.dev_server.port == 0 {
        errors.push(ValidationError::Zero { field: "dev_server.port" });
    }
    if config.dev_server.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "dev_server.request_timeout_secs",
        });
    }

    for (index, rule) in config.dev_server.proxy.iter().enumerate() {
        if !rule.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidProxyPrefix {
                index,
                prefix: rule.prefix.clone(),
            });
        }
        if !is_url_with_scheme(&rule.target, &["http"]) {
            errors.push(ValidationError::InvalidProxyTarget {
                index,
                target: rule.target.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only the `[api]` section, for callers that never start the
/// dev server.
pub fn validate_api(api: &ApiConfig) -> Result<(), Vec<ValidationError>> {
    let errors = api_errors(api);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn api_errors(api: &ApiConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if api.port == 0 {
        errors.push(ValidationError::Zero { field: "api.port" });
    }
    if api.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "api.timeout_secs" });
    }
    if !matches!(api.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::InvalidScheme(api.scheme.clone()));
    }
    if api.policy == BaseUrlMode::Fixed && !is_url_with_scheme(&api.base_url, &["http", "https"]) {
        errors.push(ValidationError::InvalidBaseUrl {
            url: api.base_url.clone(),
        });
    }

    errors
}

fn is_url_with_scheme(raw: &str, schemes: &[&str]) -> bool {
    Url::parse(raw)
        .map(|u| schemes.contains(&u.scheme()) && u.host_str().is_some())
        .unwrap_or(false)
}
