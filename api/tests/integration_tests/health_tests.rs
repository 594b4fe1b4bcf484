//! Integration tests for the health check endpoint.

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_reports_datasource_count() {
    let (app, _fetcher) = test_app();

    let (status, response) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["datasources"], 4);
}
