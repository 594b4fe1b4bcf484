//! Integration tests for `GET /api/v1/datasources`.

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, test_app};

#[tokio::test]
async fn test_list_datasources() {
    let (app, _fetcher) = test_app();

    let (status, response) = get(app, "/api/v1/datasources?org=1").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = response["datasources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["archive", "influx", "telemetry"]);
}

#[tokio::test]
async fn test_list_unknown_org_is_empty() {
    let (app, _fetcher) = test_app();

    let (status, response) = get(app, "/api/v1/datasources?org=99").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["datasources"], json!([]));
}
