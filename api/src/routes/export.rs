//! CSV export endpoint.
//!
//! `POST /api/exportcsv` takes a JSON array of series requests, fetches every
//! series, aligns them on timestamp and answers with a CSV attachment.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::export::{export_csv, ExportError};
use shared::fetch::FetchError;
use shared::models::BatchRequest;

/// Default name of the downloaded file.
pub const DEFAULT_FILENAME: &str = "export.csv";

/// Query parameters for the export endpoint.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Suggested download file name.
    pub filename: Option<String>,
}

/// Error response for export operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportErrorResponse {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

impl ExportErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

/// Creates the export routes with application state.
pub fn export_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/exportcsv", post(export_handler))
        .with_state(state)
}

/// Maps an export failure onto a status code and error body.
fn error_response(error: &ExportError) -> (StatusCode, Json<ExportErrorResponse>) {
    let (status, code) = match error {
        ExportError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        ExportError::SourceNotFound { .. } => (StatusCode::NOT_FOUND, "datasource_not_found"),
        ExportError::Registry(_) => (StatusCode::INTERNAL_SERVER_ERROR, "datasource_error"),
        ExportError::Fetch {
            source: FetchError::UnsupportedSource(_),
            ..
        } => (StatusCode::BAD_REQUEST, "unsupported_datasource"),
        ExportError::Fetch { .. } => (StatusCode::BAD_GATEWAY, "fetch_error"),
        ExportError::Writer(_) => (StatusCode::INTERNAL_SERVER_ERROR, "encoding_error"),
    };
    (status, Json(ExportErrorResponse::new(code, error.to_string())))
}

/// Reduces a requested file name to a safe `*.csv` name.
fn sanitize_filename(requested: Option<&str>) -> String {
    let cleaned: String = requested
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else if cleaned.to_ascii_lowercase().ends_with(".csv") {
        cleaned.to_string()
    } else {
        format!("{cleaned}.csv")
    }
}

/// Handler for CSV export.
///
/// The body is parsed by hand so malformed batches get the same JSON error
/// shape as every other failure.
async fn export_handler(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
    body: Bytes,
) -> Result<Response, (StatusCode, Json<ExportErrorResponse>)> {
    let batch = BatchRequest::from_json(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected export request");
        error_response(&ExportError::from(e))
    })?;

    let csv = export_csv(&batch, state.datasource_store(), state.fetcher())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "CSV export failed");
            error_response(&e)
        })?;

    let filename = sanitize_filename(params.filename.as_deref());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
