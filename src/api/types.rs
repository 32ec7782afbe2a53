//! Values the client sends to the backend.
//!
//! Everything here is a request-side shape. Response bodies stay opaque and
//! are decoded by the caller through [`ApiResponse::json`](super::ApiResponse::json).

use std::convert::Infallible;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;

/// Opaque backend identifier (strategy, grid line or trade record).
///
/// Never validated: numbers stay numbers and strings stay strings, both in
/// paths and in request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Num(n)
    }
}

impl From<i32> for Id {
    fn from(n: i32) -> Self {
        Id::Num(n.into())
    }
}

impl From<u32> for Id {
    fn from(n: u32) -> Self {
        Id::Num(n.into())
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Text(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Text(s)
    }
}

/// Parses shell input: anything that reads as an integer becomes a numeric id.
impl FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>().map(Id::Num).unwrap_or_else(|_| Id::Text(s.to_string())))
    }
}

/// Which brokerage's screenshot layout the OCR service should parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerType(String);

impl BrokerType {
    pub const EASTMONEY: &'static str = "EASTMONEY";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BrokerType {
    fn default() -> Self {
        Self::new(Self::EASTMONEY)
    }
}

impl fmt::Display for BrokerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BrokerType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Grid calculation mode for strategies created from an OCR import.
///
/// The set of modes belongs to the backend, so the value is passed through
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridCalculationMode(String);

impl GridCalculationMode {
    pub fn new(mode: impl Into<String>) -> Self {
        Self(mode.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GridCalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GridCalculationMode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An uploaded screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).map(str::to_string);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read an image from disk, keeping its file name for the upload.
    pub async fn read(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Upload {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Strategy creation body accepted by `POST /strategies`.
///
/// Either `amount_per_grid` or `quantity_per_grid` is expected by the backend;
/// the client sends whatever is set and omits the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStrategy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub symbol: String,
    pub base_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_per_grid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_per_grid: Option<f64>,
}

/// Confirmed OCR records to import into an existing strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchImport {
    pub strategy_id: Id,
    pub records: Vec<serde_json::Value>,
}
