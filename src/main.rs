//! Grid console dev server.
//!
//! Serves the console views and proxies backend traffic during development.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 DEV SERVER                   │
//!                         │                                              │
//!     Browser request     │  ┌──────────┐   /api/*    ┌──────────────┐   │
//!     ────────────────────┼─▶│ dispatch │────────────▶│    proxy     │───┼──▶ Backend :8080
//!                         │  └────┬─────┘             └──────────────┘   │
//!                         │       │ other paths                          │
//!                         │       ▼                                      │
//!                         │  ┌──────────────┐   /        ┌───────────┐   │
//!                         │  │ route table  │───────────▶│  device   │   │
//!                         │  └──────┬───────┘            │ classifier│   │
//!                         │         │ view               └─────┬─────┘   │
//!                         │         ▼                          ▼         │
//!     ◀───────────────────┼──  HTML shell              307 → /m | /pc    │
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                    | Description                        |
//! |-----------------------------|------------------------------------|
//! | `GRID_CONSOLE_CONFIG`       | TOML config file                   |
//! | `GRID_CONSOLE_BIND`         | Interface to bind                  |
//! | `GRID_CONSOLE_PORT`         | Listen port                        |
//! | `GRID_CONSOLE_PROXY_TARGET` | Upstream for every proxy rule      |
//! | `GRID_CONSOLE_API_BASE`     | Fixed backend base URL for views   |
//! | `GRID_CONSOLE_LOG`          | Log level when `RUST_LOG` is unset |

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use grid_console::http::DevServer;
use grid_console::lifecycle::{signals, startup, Shutdown};
use grid_console::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "grid-console", about = "Dev server for the grid trading console", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "GRID_CONSOLE_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind. `0.0.0.0` lets phones on the LAN connect.
    #[arg(long, env = "GRID_CONSOLE_BIND")]
    bind: Option<String>,

    #[arg(short, long, env = "GRID_CONSOLE_PORT")]
    port: Option<u16>,

    /// Upstream for every proxy rule, e.g. `http://localhost:8080`.
    #[arg(long, env = "GRID_CONSOLE_PROXY_TARGET")]
    proxy_target: Option<String>,

    /// Fixed backend base URL handed to views instead of the same-host guess.
    #[arg(long, env = "GRID_CONSOLE_API_BASE")]
    api_base: Option<String>,

    #[arg(long, env = "GRID_CONSOLE_LOG")]
    log_level: Option<String>,
}

impl Cli {
    fn into_overrides(self) -> startup::Overrides {
        startup::Overrides {
            config_path: self.config,
            bind_address: self.bind,
            port: self.port,
            proxy_target: self.proxy_target,
            api_base_url: self.api_base,
            log_level: self.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let overrides = Cli::parse().into_overrides();
    let config = startup::load(&overrides)?;

    logging::init(&config.observability);

    tracing::info!("grid-console v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        listen = %config.dev_server.listen_address(),
        api_policy = ?config.api.policy,
        request_timeout_secs = config.dev_server.request_timeout_secs,
        "Configuration loaded"
    );

    let listener = startup::bind(&config).await?;
    let server = DevServer::new(config)?;

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown.clone());

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
