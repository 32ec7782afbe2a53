//! Dev server setup and dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener, stop on the shutdown signal
//! - Forward `/api` (and any other configured prefix) to the backend
//! - Resolve every other path through the route table
//! - Serve built assets for paths no route matches
//! - Ask browsers for viewport client hints (`Accept-CH`, `Critical-CH`)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api::BaseUrlPolicy;
use crate::config::ConsoleConfig;
use crate::http::proxy::{Proxy, ProxyError};
use crate::http::request::{
    self, MakeRequestUuidV4, ACCEPT_CH, ACCEPT_CH_VALUE, CRITICAL_CH, CRITICAL_CH_VALUE,
};
use crate::http::views;
use crate::routing::{Resolution, RouteTable};

/// Header naming the view a page was rendered for.
pub const X_CONSOLE_VIEW: &str = "x-console-view";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("invalid api base URL: {0}")]
    ApiBase(#[from] url::ParseError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub proxy: Arc<Proxy>,
    pub api_policy: Arc<BaseUrlPolicy>,
    pub index_file: Option<Arc<PathBuf>>,
    pub static_files: Option<ServeDir>,
}

/// Response extension marking the device redirect at `/`.
#[derive(Debug, Clone, Copy)]
struct DeviceRedirect;

/// Console dev server.
pub struct DevServer {
    router: Router,
    config: ConsoleConfig,
}

impl DevServer {
    /// Create a new dev server with the given configuration.
    pub fn new(config: ConsoleConfig) -> Result<Self, ServerError> {
        let state = AppState {
            routes: Arc::new(RouteTable::from_kind(config.dev_server.route_table)),
            proxy: Arc::new(Proxy::new(&config.dev_server.proxy)?),
            api_policy: Arc::new(config.api.base_url_policy()?),
            index_file: config.dev_server.index_file.clone().map(Arc::new),
            static_files: config.dev_server.static_root().map(ServeDir::new),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ConsoleConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.dev_server.request_timeout_secs,
                    )))
                    .layer(SetResponseHeaderLayer::if_not_present(
                        ACCEPT_CH,
                        HeaderValue::from_static(ACCEPT_CH_VALUE),
                    ))
                    .layer(SetResponseHeaderLayer::if_not_present(
                        CRITICAL_CH,
                        critical_ch_for_device_redirect,
                    )),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            route_table = ?self.config.dev_server.route_table,
            "Dev server starting"
        );
        for rule in &self.config.dev_server.proxy {
            tracing::info!(prefix = %rule.prefix, target = %rule.target, "Proxy rule");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}

/// Proxy matching prefixes, resolve everything else as a console view.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request::request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();

    if let Some(target) = state.proxy.find(&path) {
        return state.proxy.forward(target, request, &request_id).await;
    }

    if request.method() != Method::GET && request.method() != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, "Views only answer GET").into_response();
    }

    let hints = request::client_hints(request.headers());
    match state.routes.resolve(&path, &hints) {
        Resolution::Redirect { location } => {
            let location = match request.uri().query() {
                Some(query) => format!("{}?{}", location, query),
                None => location.to_string(),
            };
            tracing::debug!(request_id = %request_id, path = %path, location = %location, "Redirecting");
            let mut response = Redirect::temporary(&location).into_response();
            response.headers_mut().insert(
                header::VARY,
                HeaderValue::from_static("User-Agent, Sec-CH-Viewport-Width"),
            );
            response.extensions_mut().insert(DeviceRedirect);
            response
        }
        Resolution::Render { view, params } => {
            let page_host = request::page_host(request.headers(), request.uri());
            let api_base = match state.api_policy.resolve(page_host.as_deref()) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(request_id = %request_id, host = ?page_host, error = %e, "Cannot resolve api base");
                    return (StatusCode::BAD_REQUEST, "Invalid host").into_response();
                }
            };

            let template = match &state.index_file {
                Some(path) => match tokio::fs::read_to_string(path.as_ref()).await {
                    Ok(content) => Some(content),
                    Err(e) => {
                        tracing::error!(request_id = %request_id, path = %path.display(), error = %e, "Failed to read index file");
                        return (StatusCode::INTERNAL_SERVER_ERROR, "Index file unavailable").into_response();
                    }
                },
                None => None,
            };

            tracing::debug!(request_id = %request_id, path = %path, view = view.name(), "Rendering view");
            let page = views::render_shell(template.as_deref(), view, &params, &api_base);
            let mut response = Html(page).into_response();
            response
                .headers_mut()
                .insert(X_CONSOLE_VIEW, HeaderValue::from_static(view.name()));
            response
        }
        Resolution::NotFound => match state.static_files {
            Some(files) => {
                tracing::debug!(request_id = %request_id, path = %path, "Serving static file");
                match files.oneshot(request).await {
                    Ok(response) => response.map(Body::new),
                    Err(never) => match never {},
                }
            }
            None => {
                tracing::debug!(request_id = %request_id, path = %path, "No route matched");
                (StatusCode::NOT_FOUND, "No matching route found").into_response()
            }
        },
    }
}

/// `Critical-CH` only on the device redirect, so Chromium retries `/` with
/// the viewport hint before the redirect is taken.
fn critical_ch_for_device_redirect(response: &Response) -> Option<HeaderValue> {
    response
        .extensions()
        .get::<DeviceRedirect>()
        .map(|_| HeaderValue::from_static(CRITICAL_CH_VALUE))
}
