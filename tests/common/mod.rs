//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use grid_console::config::ConsoleConfig;
use grid_console::http::DevServer;
use grid_console::lifecycle::Shutdown;
use serde_json::Value;
use tokio::net::TcpListener;

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: CapturedBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CapturedBody {
    Empty,
    Json(Value),
    Multipart(Vec<CapturedPart>),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl CapturedPart {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

impl CapturedBody {
    pub fn parts(&self) -> &[CapturedPart] {
        match self {
            CapturedBody::Multipart(parts) => parts,
            other => panic!("expected multipart body, got {:?}", other),
        }
    }
}

type Responder = Arc<dyn Fn(Captured) -> std::pin::Pin<Box<dyn Future<Output = (u16, String)> + Send>> + Send + Sync>;

#[derive(Clone)]
struct MockState {
    captured: Arc<Mutex<Vec<Captured>>>,
    responder: Responder,
    reply_headers: Arc<Vec<(String, String)>>,
}

/// A running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockBackend {
    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn last(&self) -> Captured {
        self.requests().pop().expect("backend saw no request")
    }

    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

/// Start a mock backend that answers every request with `200 {"ok":true}`.
pub async fn start_mock_backend() -> MockBackend {
    start_programmable_backend(|_| async { (200, r#"{"ok":true}"#.to_string()) }).await
}

/// Start a programmable mock backend with async support.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(Captured) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    start_backend(f, Vec::new()).await
}

/// Start a backend that adds `headers` to every `200 {"ok":true}` reply.
pub async fn start_backend_with_headers(headers: &[(&str, &str)]) -> MockBackend {
    let headers = headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    start_backend(|_| async { (200, r#"{"ok":true}"#.to_string()) }, headers).await
}

async fn start_backend<F, Fut>(f: F, reply_headers: Vec<(String, String)>) -> MockBackend
where
    F: Fn(Captured) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));

    let f = Arc::new(f);
    let responder: Responder = Arc::new(move |c| {
        let f = f.clone();
        Box::pin(async move { f(c).await })
    });

    let state = MockState {
        captured: captured.clone(),
        responder,
        reply_headers: Arc::new(reply_headers),
    };
    let app = Router::new().fallback(capture).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, captured }
}

/// Start a backend that waits `delay` before answering.
pub async fn start_slow_backend(delay: Duration) -> MockBackend {
    start_programmable_backend(move |_| async move {
        tokio::time::sleep(delay).await;
        (200, "{}".to_string())
    })
    .await
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn capture(State(state): State<MockState>, request: Request<Body>) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let headers = request.headers().clone();

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.unwrap().to_vec();
            parts.push(CapturedPart {
                name,
                file_name,
                content_type,
                data,
            });
        }
        CapturedBody::Multipart(parts)
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        if bytes.is_empty() {
            CapturedBody::Empty
        } else {
            serde_json::from_slice(&bytes)
                .map(CapturedBody::Json)
                .unwrap_or_else(|_| CapturedBody::Raw(bytes.to_vec()))
        }
    };

    let captured = Captured {
        method,
        path,
        query,
        headers,
        body,
    };
    state.captured.lock().unwrap().push(captured.clone());

    let (status, body) = (state.responder)(captured).await;
    let mut response = (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response();
    for (name, value) in state.reply_headers.iter() {
        response.headers_mut().append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    response
}

/// Start a dev server on an ephemeral port.
pub async fn spawn_dev_server(mut config: ConsoleConfig) -> (SocketAddr, Shutdown) {
    config.dev_server.bind_address = "127.0.0.1".to_string();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = DevServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that reports redirects instead of following them.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
