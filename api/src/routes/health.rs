//! Health check endpoint.
//!
//! Reports liveness for load balancers, plus whether the data source registry
//! is readable and how many sources it holds.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" when the registry is readable, "degraded" otherwise.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Number of registered data sources, if the registry is readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasources: Option<usize>,
}

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check handler.
///
/// A degraded registry still answers 200 so the process is not restarted
/// for a lock failure; the status field carries the difference.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let datasources = state
        .datasource_store()
        .count()
        .inspect_err(|e| tracing::warn!(error = %e, "Data source registry unavailable"))
        .ok();

    let status = if datasources.is_some() {
        "healthy"
    } else {
        "degraded"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: status.to_string(),
            service: "seriesjoin-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            datasources,
        }),
    )
}
