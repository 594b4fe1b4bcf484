//! Data source listing endpoint.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::{DataSource, DataSourceKind};

/// Query parameters for listing data sources.
#[derive(Debug, Deserialize)]
pub struct DataSourceListParams {
    /// Organization to list.
    pub org: i64,
}

/// A data source as exposed over the API, without connection details.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataSourceSummary {
    /// Data source name.
    pub name: String,
    /// Store type.
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
}

impl From<DataSource> for DataSourceSummary {
    fn from(source: DataSource) -> Self {
        Self {
            name: source.name,
            kind: source.kind,
        }
    }
}

/// Response for data source listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataSourceListResponse {
    /// Data sources of the organization, sorted by name.
    pub datasources: Vec<DataSourceSummary>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct DataSourceError {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

/// Creates the data source routes.
pub fn datasource_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/datasources", get(list_datasources))
        .with_state(state)
}

async fn list_datasources(
    State(state): State<AppState>,
    Query(params): Query<DataSourceListParams>,
) -> Result<Json<DataSourceListResponse>, (StatusCode, Json<DataSourceError>)> {
    let sources = state.datasource_store().list(params.org).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(DataSourceError {
                error: "datasource_error".to_string(),
                message: e.to_string(),
            }),
        )
    })?;

    Ok(Json(DataSourceListResponse {
        datasources: sources.into_iter().map(Into::into).collect(),
    }))
}
