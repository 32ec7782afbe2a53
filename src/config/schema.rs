//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the console.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::BaseUrlPolicy;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Backend API client settings.
    pub api: ApiConfig,

    /// Dev server (views + `/api` proxy).
    pub dev_server: DevServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How the backend base URL is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseUrlMode {
    /// Use `base_url` verbatim.
    Fixed,
    /// Same host as the page, fixed `port`.
    SameHost,
}

/// Backend API client configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub policy: BaseUrlMode,

    /// Base URL for the `fixed` policy.
    pub base_url: String,

    /// Scheme, port and path prefix for the `same-host` policy.
    pub scheme: String,
    pub port: u16,
    pub prefix: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn base_url_policy(&self) -> Result<BaseUrlPolicy, url::ParseError> {
        match self.policy {
            BaseUrlMode::Fixed => BaseUrlPolicy::fixed(&self.base_url),
            BaseUrlMode::SameHost => Ok(BaseUrlPolicy::SameHost {
                scheme: self.scheme.clone(),
                port: self.port,
                prefix: self.prefix.clone(),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            policy: BaseUrlMode::SameHost,
            base_url: "http://localhost:8080/api".to_string(),
            scheme: "http".to_string(),
            port: 8080,
            prefix: "/api".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Which route table the dev server resolves views against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteTableKind {
    /// Desktop and mobile subtrees, device redirect at `/`.
    Extended,
    /// List, create and detail views only.
    Reduced,
}

/// Dev server configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DevServerConfig {
    /// Interface to bind. `0.0.0.0` lets other devices on the LAN connect.
    pub bind_address: String,

    pub port: u16,

    /// Total time allowed per request, proxied ones included.
    pub request_timeout_secs: u64,

    pub route_table: RouteTableKind,

    /// HTML page served for every view instead of the built-in shell.
    pub index_file: Option<PathBuf>,

    /// Directory of built assets served for paths no route matches.
    /// Defaults to the directory holding `index_file`.
    pub static_dir: Option<PathBuf>,

    /// Prefix proxy rules, first match wins.
    pub proxy: Vec<ProxyRule>,
}

impl DevServerConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Directory to serve static assets from, if any.
    pub fn static_root(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.static_dir {
            return Some(dir.clone());
        }
        let parent = self.index_file.as_ref()?.parent()?;
        if parent.as_os_str().is_empty() {
            Some(PathBuf::from("."))
        } else {
            Some(parent.to_path_buf())
        }
    }
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 30,
            route_table: RouteTableKind::Extended,
            index_file: None,
            static_dir: None,
            proxy: vec![ProxyRule::default()],
        }
    }
}

/// Forward every request whose path starts with `prefix` to `target`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProxyRule {
    pub prefix: String,

    /// Upstream origin, e.g. `http://localhost:8080`.
    pub target: String,

    /// Rewrite the Host header to the target's authority.
    #[serde(default = "default_change_origin")]
    pub change_origin: bool,
}

fn default_change_origin() -> bool {
    true
}

impl Default for ProxyRule {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            target: "http://localhost:8080".to_string(),
            change_origin: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
