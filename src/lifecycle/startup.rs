//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Apply command-line / environment overrides
//! - Bind the listener last (traffic only when ready)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Overrides are re-validated together with the file

use std::path::PathBuf;

use tokio::net::TcpListener;

use crate::config::{load_or_default, validate_config, BaseUrlMode, ConfigError, ConsoleConfig};

/// Settings that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub proxy_target: Option<String>,
    pub api_base_url: Option<String>,
    pub log_level: Option<String>,
}

/// Load the config file (or defaults) and apply overrides.
pub fn load(overrides: &Overrides) -> Result<ConsoleConfig, ConfigError> {
    let mut config = load_or_default(overrides.config_path.as_deref())?;

    if let Some(bind) = &overrides.bind_address {
        config.dev_server.bind_address = bind.clone();
    }
    if let Some(port) = overrides.port {
        config.dev_server.port = port;
    }
    if let Some(target) = &overrides.proxy_target {
        for rule in &mut config.dev_server.proxy {
            rule.target = target.clone();
        }
    }
    if let Some(base) = &overrides.api_base_url {
        config.api.policy = BaseUrlMode::Fixed;
        config.api.base_url = base.clone();
    }
    if let Some(level) = &overrides.log_level {
        config.observability.log_level = level.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

pub async fn bind(config: &ConsoleConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind(config.dev_server.listen_address()).await
}
