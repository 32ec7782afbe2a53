//! Backend endpoint catalogue.
//!
//! Each function describes one backend call as an [`ApiRequest`]: method,
//! path relative to the base URL, query pairs and body. Nothing is sent here,
//! so the exact request shape of every operation is checkable without a
//! network.

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::types::{BrokerType, GridCalculationMode, Id, ImageBlob};

/// Multipart field name carrying uploaded screenshots.
pub const FILES_FIELD: &str = "files";

/// A fully described backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormField>),
}

/// One multipart part, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text { name: String, value: String },
    File { name: String, blob: ImageBlob },
}

impl ApiRequest {
    fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    fn get(path: String) -> Self {
        Self::new(Method::GET, path)
    }

    fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    fn multipart(mut self, fields: Vec<FormField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }
}

fn text(name: &str, value: impl ToString) -> FormField {
    FormField::Text {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn file_fields(files: Vec<ImageBlob>) -> Vec<FormField> {
    files
        .into_iter()
        .map(|blob| FormField::File {
            name: FILES_FIELD.to_string(),
            blob,
        })
        .collect()
}

fn encode<T: Serialize + ?Sized>(data: &T) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(ApiError::Encode)
}

// ==================== Strategies ====================

pub fn list_strategies() -> ApiRequest {
    ApiRequest::get("/strategies".to_string())
}

pub fn get_strategy(id: &Id) -> ApiRequest {
    ApiRequest::get(format!("/strategies/{}", id))
}

pub fn get_strategy_detail(id: &Id) -> ApiRequest {
    ApiRequest::get(format!("/strategies/{}/detail", id))
}

pub fn create_strategy<T: Serialize + ?Sized>(data: &T) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::new(Method::POST, "/strategies".to_string()).json(encode(data)?))
}

pub fn get_grid_lines(strategy_id: &Id) -> ApiRequest {
    ApiRequest::get(format!("/strategies/{}/grid-plans", strategy_id))
}

pub fn execute_tick(strategy_id: &Id, price: f64) -> ApiRequest {
    ApiRequest::new(Method::POST, format!("/strategies/{}/tick", strategy_id))
        .json(json!({ "price": price }))
}

// ==================== Grid lines ====================

/// Plan-stage adjustment: id in the path, new price as a query parameter.
pub fn update_plan_buy_price(grid_line_id: &Id, new_buy_price: f64) -> ApiRequest {
    ApiRequest::new(
        Method::PUT,
        format!("/strategies/grid-lines/{}/update-plan-buy-price", grid_line_id),
    )
    .query("newBuyPrice", new_buy_price)
}

/// Execution-stage recording: id and price both travel in the body.
pub fn update_actual_buy_price(grid_line_id: &Id, actual_buy_price: f64) -> ApiRequest {
    ApiRequest::new(Method::PUT, "/strategies/grid-lines/actual-buy-price".to_string()).json(json!({
        "gridLineId": grid_line_id,
        "actualBuyPrice": actual_buy_price,
    }))
}

// ==================== Trade records ====================

pub fn get_trade_records(strategy_id: &Id) -> ApiRequest {
    ApiRequest::get(format!("/strategies/{}/trades", strategy_id))
}

pub fn update_trade_fee(trade_id: &Id, fee: f64) -> ApiRequest {
    ApiRequest::new(Method::PUT, format!("/trades/{}/fee", trade_id)).json(json!({ "fee": fee }))
}

pub fn get_total_fee(strategy_id: &Id) -> ApiRequest {
    ApiRequest::get(format!("/strategies/{}/total-fee", strategy_id))
}

// ==================== OCR import ====================

/// Screenshots go out as repeated `files` parts. An empty list is still
/// submitted, with only the scalar fields.
pub fn ocr_recognize(files: Vec<ImageBlob>, strategy_id: &Id, broker_type: &BrokerType) -> ApiRequest {
    let mut fields = file_fields(files);
    fields.push(text("strategyId", strategy_id));
    fields.push(text("brokerType", broker_type));
    ApiRequest::new(Method::POST, "/ocr/recognize".to_string()).multipart(fields)
}

pub fn ocr_import<T: Serialize + ?Sized>(data: &T) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::new(Method::POST, "/ocr/import".to_string()).json(encode(data)?))
}

pub fn ocr_import_and_create_strategy(
    files: Vec<ImageBlob>,
    broker_type: &BrokerType,
    name: Option<&str>,
    symbol: Option<&str>,
    grid_calculation_mode: Option<&GridCalculationMode>,
) -> ApiRequest {
    let mut fields = file_fields(files);
    fields.push(text("brokerType", broker_type));
    if let Some(name) = name {
        fields.push(text("name", name));
    }
    if let Some(symbol) = symbol {
        fields.push(text("symbol", symbol));
    }
    if let Some(mode) = grid_calculation_mode {
        fields.push(text("gridCalculationMode", mode));
    }
    ApiRequest::new(Method::POST, "/ocr/import-create".to_string()).multipart(fields)
}

pub fn ocr_rematch<T: Serialize>(strategy_id: &Id, records: &[T]) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::new(Method::POST, "/ocr/rematch".to_string()).json(json!({
        "strategyId": strategy_id,
        "records": encode(records)?,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::NewStrategy;

    fn field_names(req: &ApiRequest) -> Vec<&str> {
        match &req.body {
            RequestBody::Multipart(fields) => fields
                .iter()
                .map(|f| match f {
                    FormField::Text { name, .. } | FormField::File { name, .. } => name.as_str(),
                })
                .collect(),
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[test]
    fn test_get_endpoints() {
        let id = Id::from(7);
        let cases = [
            (list_strategies(), "/strategies"),
            (get_strategy(&id), "/strategies/7"),
            (get_strategy_detail(&id), "/strategies/7/detail"),
            (get_grid_lines(&id), "/strategies/7/grid-plans"),
            (get_trade_records(&id), "/strategies/7/trades"),
            (get_total_fee(&id), "/strategies/7/total-fee"),
        ];
        for (req, path) in cases {
            assert_eq!(req.method, Method::GET);
            assert_eq!(req.path, path);
            assert!(req.query.is_empty());
            assert_eq!(req.body, RequestBody::Empty);
        }
    }

    #[test]
    fn test_plan_buy_price_uses_query() {
        let req = update_plan_buy_price(&Id::from(42), 10.5);
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.path, "/strategies/grid-lines/42/update-plan-buy-price");
        assert_eq!(req.query, vec![("newBuyPrice".to_string(), "10.5".to_string())]);
        assert_eq!(req.body, RequestBody::Empty);
    }

    #[test]
    fn test_actual_buy_price_uses_body() {
        let req = update_actual_buy_price(&Id::from(42), 9.87);
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.path, "/strategies/grid-lines/actual-buy-price");
        assert!(req.query.is_empty());
        assert_eq!(
            req.body,
            RequestBody::Json(json!({"gridLineId": 42, "actualBuyPrice": 9.87}))
        );
    }

    #[test]
    fn test_tick_and_fee_bodies() {
        let tick = execute_tick(&Id::from(3), 4.12);
        assert_eq!(tick.method, Method::POST);
        assert_eq!(tick.path, "/strategies/3/tick");
        assert_eq!(tick.body, RequestBody::Json(json!({"price": 4.12})));

        let fee = update_trade_fee(&Id::from(99), 5.0);
        assert_eq!(fee.method, Method::PUT);
        assert_eq!(fee.path, "/trades/99/fee");
        assert_eq!(fee.body, RequestBody::Json(json!({"fee": 5.0})));
    }

    #[test]
    fn test_create_strategy_passes_data_through() {
        let body = NewStrategy {
            name: Some("demo".into()),
            symbol: "510300".into(),
            base_price: 4.0,
            quantity_per_grid: Some(100.0),
            ..Default::default()
        };
        let req = create_strategy(&body).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/strategies");
        assert_eq!(
            req.body,
            RequestBody::Json(json!({
                "name": "demo",
                "symbol": "510300",
                "basePrice": 4.0,
                "quantityPerGrid": 100.0,
            }))
        );
    }

    #[test]
    fn test_ocr_recognize_fields() {
        let files = vec![
            ImageBlob::new("a.png", vec![1, 2]),
            ImageBlob::new("b.png", vec![3]),
        ];
        let req = ocr_recognize(files, &Id::from(5), &BrokerType::default());
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path, "/ocr/recognize");
        assert_eq!(field_names(&req), vec!["files", "files", "strategyId", "brokerType"]);
    }

    #[test]
    fn test_ocr_recognize_without_files_still_sends_scalars() {
        let req = ocr_recognize(Vec::new(), &Id::from(5), &BrokerType::default());
        assert_eq!(field_names(&req), vec!["strategyId", "brokerType"]);
    }

    #[test]
    fn test_import_create_optional_fields() {
        let bare = ocr_import_and_create_strategy(
            vec![ImageBlob::new("a.png", vec![])],
            &BrokerType::default(),
            None,
            None,
            None,
        );
        assert_eq!(bare.path, "/ocr/import-create");
        assert_eq!(field_names(&bare), vec!["files", "brokerType"]);

        let mode = GridCalculationMode::new("PRICE_LOCK");
        let full = ocr_import_and_create_strategy(
            Vec::new(),
            &BrokerType::default(),
            Some("demo"),
            Some("510300"),
            Some(&mode),
        );
        assert_eq!(
            field_names(&full),
            vec!["brokerType", "name", "symbol", "gridCalculationMode"]
        );
    }

    #[test]
    fn test_rematch_body() {
        let records = vec![json!({"type": "BUY", "price": 1.0})];
        let req = ocr_rematch(&Id::from(8), &records).unwrap();
        assert_eq!(req.path, "/ocr/rematch");
        assert_eq!(
            req.body,
            RequestBody::Json(json!({"strategyId": 8, "records": [{"type": "BUY", "price": 1.0}]}))
        );
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let id = Id::from(11);
        assert_eq!(get_strategy_detail(&id), get_strategy_detail(&id));
        assert_eq!(list_strategies(), list_strategies());
    }
}
