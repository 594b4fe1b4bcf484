//! Integration tests for `POST /api/exportcsv`.
//!
//! Tests cover:
//! - Column order and alignment of offset series
//! - Empty series and empty batches
//! - Resolution failures, fetch failures and invalid requests

use axum::http::{header, StatusCode};
use serde_json::{json, Value};

use super::common::{post_json, test_app};

#[tokio::test]
async fn test_export_two_offset_series() {
    let (app, _fetcher) = test_app();

    let batch = json!([
        {"measurement": "LoadUp", "query": "load_up", "datasource": "telemetry", "org": 1},
        {"measurement": "LoadDown", "query": "load_down", "datasource": "archive", "org": 1}
    ]);

    let (status, headers, csv) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        csv,
        "Time,LoadUp,LoadDown\n\
         2016-09-14T08:46:32.837Z,1,\n\
         2016-09-14T08:46:33.973Z,1.1,2.1\n\
         2016-09-14T08:46:35.105Z,1.2,2.2\n\
         2016-09-14T08:46:36.226Z,,2.3\n"
    );
}

#[tokio::test]
async fn test_column_order_follows_request_order() {
    let (app, _fetcher) = test_app();

    let batch = json!([
        {"measurement": "LoadDown", "query": "load_down", "datasource": "telemetry", "org": 1},
        {"measurement": "LoadUp", "query": "load_up", "datasource": "telemetry", "org": 1}
    ]);

    let (status, _headers, csv) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Time,LoadDown,LoadUp");
    assert_eq!(lines[1], "2016-09-14T08:46:32.837Z,,1");
    assert_eq!(lines[4], "2016-09-14T08:46:36.226Z,2.3,");
}

#[tokio::test]
async fn test_empty_series_keeps_its_column() {
    let (app, _fetcher) = test_app();

    let batch = json!([
        {"measurement": "up", "query": "load_up", "datasource": "telemetry", "org": 1},
        {"measurement": "nothing", "query": "empty", "datasource": "telemetry", "org": 1}
    ]);

    let (status, _headers, csv) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Time,up,nothing");
    assert!(lines[1..].iter().all(|l| l.ends_with(',')));
}

#[tokio::test]
async fn test_missing_measurement_gives_empty_header() {
    let (app, _fetcher) = test_app();

    let batch = json!([
        {"query": "load_down", "datasource": "telemetry", "org": 1}
    ]);

    let (status, _headers, csv) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::OK);
    assert!(csv.starts_with("Time,\n"));
}

#[tokio::test]
async fn test_empty_batch_returns_header_only() {
    let (app, _fetcher) = test_app();

    let (status, _headers, csv) = post_json(app, "/api/exportcsv", json!([])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(csv, "Time\n");
}

#[tokio::test]
async fn test_unknown_datasource_aborts_without_fetching() {
    let (app, fetcher) = test_app();

    let batch = json!([
        {"measurement": "up", "query": "load_up", "datasource": "telemetry", "org": 1},
        {"measurement": "x", "query": "load_down", "datasource": "missing", "org": 1}
    ]);

    let (status, _headers, body) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "datasource_not_found");
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_datasource_resolved_per_org() {
    let (app, _fetcher) = test_app();

    let batch = json!([
        {"query": "load_up", "datasource": "archive", "org": 2}
    ]);

    let (status, _headers, _body) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_one_failed_series_fails_the_batch() {
    let (app, _fetcher) = test_app();

    let batch = json!([
        {"measurement": "up", "query": "load_up", "datasource": "telemetry", "org": 1},
        {"measurement": "secret", "query": "unauthorized", "datasource": "telemetry", "org": 1}
    ]);

    let (status, _headers, body) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.starts_with("Time"));
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "fetch_error");
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("Authentication failed"));
}

#[tokio::test]
async fn test_invalid_entry_rejected() {
    let (app, fetcher) = test_app();

    let batch = json!([
        {"measurement": "up", "query": "", "datasource": "telemetry", "org": 1}
    ]);

    let (status, _headers, _body) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_non_array_body_rejected() {
    let (app, _fetcher) = test_app();

    let (status, _headers, body) = post_json(
        app,
        "/api/exportcsv",
        json!({"query": "load_up", "datasource": "telemetry", "org": 1}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "invalid_request");
}

#[tokio::test]
async fn test_unsupported_datasource_type() {
    let (app, _fetcher) = test_app();

    let batch = json!([
        {"query": "SELECT value FROM cpu", "datasource": "influx", "org": 1}
    ]);

    let (status, _headers, body) = post_json(app, "/api/exportcsv", batch).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"], "unsupported_datasource");
}
