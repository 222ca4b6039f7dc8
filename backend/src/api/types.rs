//! REST API types.
//!
//! Pivot rows keep the dashboard table's column names
//! (`Year`, `Fabricante Produtor`, ..., `Share (%)`); envelopes are camelCase.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ServerError, StoreError};
use crate::models::PivotRow;
use crate::pivot::PivotTable;
use crate::store::{CoercionReport, Snapshot};

/// Response to a pivot query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResponse {
    /// Unique query identifier
    pub query_id: String,

    /// Status: "ok" or "empty"
    pub status: String,

    /// Aggregated rows, sorted by key
    pub rows: Vec<PivotRow>,

    pub metadata: PivotMetadata,
}

/// Figures behind a pivot response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotMetadata {
    pub group_count: usize,
    pub filtered_records: usize,
    pub grand_total: f64,
    /// Sum of rounded shares (may differ from 100)
    pub share_sum: i64,
    /// Records in the snapshot the query ran against
    pub snapshot_records: usize,
}

impl PivotResponse {
    pub fn new(table: PivotTable, snapshot_records: usize) -> Self {
        let metadata = PivotMetadata {
            group_count: table.rows.len(),
            filtered_records: table.filtered_records,
            grand_total: table.grand_total,
            share_sum: table.share_sum(),
            snapshot_records,
        };

        PivotResponse {
            query_id: Uuid::new_v4().to_string(),
            status: if table.is_empty() { "empty" } else { "ok" }.to_string(),
            rows: table.rows,
            metadata,
        }
    }
}

/// Response to a reload request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub status: String,
    pub records: usize,
    pub loaded_at: String,
    pub coercion: CoercionReport,
}

impl From<&Snapshot> for ReloadResponse {
    fn from(snapshot: &Snapshot) -> Self {
        ReloadResponse {
            status: "reloaded".to_string(),
            records: snapshot.records.len(),
            loaded_at: snapshot.loaded_at.to_rfc3339(),
            coercion: snapshot.report.clone(),
        }
    }
}

/// Create an error response
pub fn error_response(error: &str, details: &[String]) -> Value {
    json!({
        "queryId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "details": details,
        "rows": []
    })
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Query(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NoOrigin) => StatusCode::CONFLICT,
            Self::Store(StoreError::SourceUnavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = match &self {
            Self::Query(e) => error_response("Invalid selection", e.messages()),
            Self::BadRequest(msg) => error_response("Invalid request", std::slice::from_ref(msg)),
            other => error_response(&other.to_string(), &[]),
        };
        (self.status(), Json(body)).into_response()
    }
}
