//! REST API response bodies.

use serde::Serialize;
use serde_json::{json, Value};

use crate::dashboard::LoadInfo;
use crate::models::CategoryNode;
use crate::transform::pipeline::CsvInfo;

/// Body of `GET /api/categories`: the held set plus its load metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryNode>,
    #[serde(flatten)]
    pub info: LoadInfo,
}

/// Body returned after a successful upload, reload or reset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    /// Always "ok"; failures use [`error_response`]
    pub status: &'static str,
    #[serde(flatten)]
    pub info: LoadInfo,
    /// Absent for reset, which parses nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_info: Option<CsvInfo>,
}

impl LoadResponse {
    pub fn new(info: LoadInfo, csv_info: Option<CsvInfo>) -> Self {
        Self {
            status: "ok",
            info,
            csv_info,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}
