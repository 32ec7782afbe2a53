//! Shared backend client.
//!
//! One `GridApiClient` wraps one configured `reqwest::Client` (base URL,
//! timeout, default headers). The handle is cheap to clone and carries no
//! per-call state, so concurrent callers can share it freely. Calls are
//! independent: no deduplication, retry or ordering between them.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::base_url::{self, BaseUrlPolicy};
use crate::api::endpoints::{self, ApiRequest, FormField, RequestBody};
use crate::api::error::ApiError;
use crate::api::types::{BrokerType, GridCalculationMode, Id, ImageBlob};
use crate::config::ApiConfig;

/// Per-request ceiling used unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A successful backend response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON. Some endpoints (the grid-line updates) answer
    /// with an empty body; check [`ApiResponse::is_empty`] first for those.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(ApiError::Decode)
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Client for the grid-trading backend API.
#[derive(Debug, Clone)]
pub struct GridApiClient {
    http: Client,
    base_url: Url,
}

impl GridApiClient {
    /// Build a client against an already resolved base URL.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Build a client from a base-URL policy, resolving it for `page_host`.
    pub fn with_policy(
        policy: &BaseUrlPolicy,
        page_host: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Self::new(policy.resolve(page_host)?, timeout)
    }

    pub fn from_config(config: &ApiConfig, page_host: Option<&str>) -> Result<Self, ApiError> {
        Self::with_policy(&config.base_url_policy()?, page_host, config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL an [`ApiRequest`] will be sent to.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        Ok(base_url::join(&self.base_url, &request.path, &request.query)?)
    }

    /// Send a described request. Non-success statuses are returned as
    /// [`ApiError::Status`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request)?;
        let start = Instant::now();

        tracing::debug!(method = %request.method, url = %url, "Sending backend request");

        let builder = self.http.request(request.method.clone(), url);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)?),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %request.method, path = %request.path, error = %e, "Backend request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Backend responded"
        );

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(ApiResponse { status, body })
    }

    // ==================== Strategies ====================

    pub async fn list_strategies(&self) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::list_strategies()).await
    }

    pub async fn get_strategy(&self, id: impl Into<Id>) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::get_strategy(&id.into())).await
    }

    pub async fn get_strategy_detail(&self, id: impl Into<Id>) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::get_strategy_detail(&id.into())).await
    }

    pub async fn create_strategy<T: Serialize + ?Sized>(&self, data: &T) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::create_strategy(data)?).await
    }

    pub async fn get_grid_lines(&self, strategy_id: impl Into<Id>) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::get_grid_lines(&strategy_id.into())).await
    }

    pub async fn execute_tick(&self, strategy_id: impl Into<Id>, price: f64) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::execute_tick(&strategy_id.into(), price)).await
    }

    // ==================== Grid lines ====================

    pub async fn update_plan_buy_price(
        &self,
        grid_line_id: impl Into<Id>,
        new_buy_price: f64,
    ) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::update_plan_buy_price(&grid_line_id.into(), new_buy_price))
            .await
    }

    pub async fn update_actual_buy_price(
        &self,
        grid_line_id: impl Into<Id>,
        actual_buy_price: f64,
    ) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::update_actual_buy_price(&grid_line_id.into(), actual_buy_price))
            .await
    }

    // ==================== Trade records ====================

    pub async fn get_trade_records(&self, strategy_id: impl Into<Id>) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::get_trade_records(&strategy_id.into())).await
    }

    pub async fn update_trade_fee(&self, trade_id: impl Into<Id>, fee: f64) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::update_trade_fee(&trade_id.into(), fee)).await
    }

    pub async fn get_total_fee(&self, strategy_id: impl Into<Id>) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::get_total_fee(&strategy_id.into())).await
    }

    // ==================== OCR import ====================

    pub async fn ocr_recognize(
        &self,
        files: Vec<ImageBlob>,
        strategy_id: impl Into<Id>,
        broker_type: &BrokerType,
    ) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::ocr_recognize(files, &strategy_id.into(), broker_type))
            .await
    }

    pub async fn ocr_import<T: Serialize + ?Sized>(&self, data: &T) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::ocr_import(data)?).await
    }

    pub async fn ocr_import_and_create_strategy(
        &self,
        files: Vec<ImageBlob>,
        broker_type: &BrokerType,
        name: Option<&str>,
        symbol: Option<&str>,
        grid_calculation_mode: Option<&GridCalculationMode>,
    ) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::ocr_import_and_create_strategy(
            files,
            broker_type,
            name,
            symbol,
            grid_calculation_mode,
        ))
        .await
    }

    pub async fn ocr_rematch<T: Serialize>(
        &self,
        strategy_id: impl Into<Id>,
        records: &[T],
    ) -> Result<ApiResponse, ApiError> {
        self.send(endpoints::ocr_rematch(&strategy_id.into(), records)?).await
    }
}

fn build_form(fields: Vec<FormField>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File { name, blob } => {
                let mut part = Part::bytes(blob.bytes).file_name(blob.file_name);
                if let Some(content_type) = blob.content_type {
                    part = part
                        .mime_str(&content_type)
                        .map_err(|e| ApiError::InvalidPart(format!("{}: {}", content_type, e)))?;
                }
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_request() {
        let client = GridApiClient::with_policy(
            &BaseUrlPolicy::default(),
            Some("10.0.0.5"),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        let req = endpoints::update_plan_buy_price(&Id::from(42), 10.5);
        assert_eq!(
            client.url_for(&req).unwrap().as_str(),
            "http://10.0.0.5:8080/api/strategies/grid-lines/42/update-plan-buy-price?newBuyPrice=10.5"
        );
    }

    #[test]
    fn test_invalid_mime_is_rejected() {
        let fields = vec![FormField::File {
            name: "files".into(),
            blob: ImageBlob::new("a.png", vec![]).with_content_type("not a mime"),
        }];
        assert!(matches!(build_form(fields), Err(ApiError::InvalidPart(_))));
    }
}
