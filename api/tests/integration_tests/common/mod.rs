//! Shared fixtures and HTTP helpers for the integration tests.
//!
//! The test app has two organizations. Org 1 owns the `telemetry`, `archive`
//! and `influx` sources; org 2 owns its own `telemetry`.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::fetch::{FetchError, InMemoryFetcher, RoutingFetcher};
use shared::models::{DataSource, DataSourceKind, Point, Series};
use shared::storage::InMemoryDataSourceStore;
use std::sync::Arc;
use std::time::Duration;

pub const T0: i64 = 1_473_842_792_837_738_370;
pub const T1: i64 = 1_473_842_793_973_036_635;
pub const T2: i64 = 1_473_842_795_105_317_504;
pub const T3: i64 = 1_473_842_796_226_293_423;

pub fn series(raw: &[(i64, f64)]) -> Series {
    Series::new(raw.iter().copied().map(Point::from).collect()).unwrap()
}

/// Creates a test router with two orgs of in-memory data sources.
pub fn test_app() -> (Router, Arc<InMemoryFetcher>) {
    let store = InMemoryDataSourceStore::with_sources([
        DataSource::new("telemetry", 1, DataSourceKind::Memory),
        DataSource::new("archive", 1, DataSourceKind::Memory),
        DataSource::new("telemetry", 2, DataSourceKind::Memory),
        DataSource::new("influx", 1, DataSourceKind::InfluxDb),
    ])
    .unwrap();

    let memory = Arc::new(
        InMemoryFetcher::new()
            .with_series("load_up", series(&[(T0, 1.0), (T1, 1.1), (T2, 1.2)]))
            .with_series("load_down", series(&[(T1, 2.1), (T2, 2.2), (T3, 2.3)]))
            .with_series("empty", Series::empty())
            .with_delay("load_up", Duration::from_millis(30))
            .with_failure(
                "unauthorized",
                FetchError::AuthenticationFailed("invalid credentials".into()),
            ),
    );

    let fetcher = RoutingFetcher::new().with_fetcher(DataSourceKind::Memory, Arc::clone(&memory));
    let state = AppState::new(Arc::new(store), Arc::new(fetcher));

    (create_router(state), memory)
}

/// Helper to POST a JSON body and return status, headers and raw text.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: Value,
) -> (StatusCode, header::HeaderMap, String) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body_bytes.to_vec()).unwrap();

    (status, headers, text)
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}
