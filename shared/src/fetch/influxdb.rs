//! `InfluxDB` 1.x series fetcher.
//!
//! Queries go through the HTTP `/query` endpoint with `epoch=ns`, so the
//! first column of every value row is a nanosecond timestamp. Only the first
//! series of the first statement result is read; its second column is the
//! sample value.

use super::{FetchError, SeriesFetcher};
use crate::models::{DataSource, Point, Series};
use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<ResultSeries>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultSeries {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Fetches series from `InfluxDB` over HTTP.
#[derive(Debug, Clone)]
pub struct InfluxDbFetcher {
    client: reqwest::Client,
}

impl InfluxDbFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unreachable(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn run(&self, source: &DataSource, query: &str) -> Result<Series, FetchError> {
        let url = format!("{}/query", source.url.trim_end_matches('/'));

        let mut request = self.client.get(&url).query(&[
            ("db", source.database.as_str()),
            ("q", query),
            ("epoch", "ns"),
        ]);
        if !source.user.is_empty() {
            request = request.basic_auth(&source.user, Some(&source.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::AuthenticationFailed(format!(
                "{} answered {status}",
                source.name
            )));
        }
        if status.is_server_error() {
            return Err(FetchError::Unreachable(format!(
                "{} answered {status}",
                source.name
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        parse_response(&body)
    }
}

impl SeriesFetcher for InfluxDbFetcher {
    fn fetch<'a>(
        &'a self,
        source: &'a DataSource,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Series, FetchError>> {
        Box::pin(self.run(source, query))
    }
}

/// Parses an `InfluxDB` `/query` JSON body into a series.
///
/// A statement that matched nothing has no `series` and yields an empty
/// series. Rows whose value is `null` are skipped.
///
/// # Errors
///
/// Returns [`FetchError::QueryRejected`] when the body carries an `error`,
/// and [`FetchError::MalformedResponse`] when it does not have the expected
/// shape.
pub fn parse_response(body: &[u8]) -> Result<Series, FetchError> {
    let response: QueryResponse = serde_json::from_slice(body)
        .map_err(|e| FetchError::MalformedResponse(format!("Invalid JSON: {e}")))?;

    if let Some(error) = response.error {
        return Err(FetchError::QueryRejected(error));
    }

    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::MalformedResponse("Response has no results".into()))?;

    if let Some(error) = result.error {
        return Err(FetchError::QueryRejected(error));
    }

    let Some(series) = result.series.into_iter().next() else {
        return Ok(Series::empty());
    };

    let mut points = Vec::with_capacity(series.values.len());
    for (index, row) in series.values.iter().enumerate() {
        if let Some(point) = parse_row(index, row)? {
            points.push(point);
        }
    }

    Ok(Series::from_unsorted(points))
}

fn parse_row(index: usize, row: &[Value]) -> Result<Option<Point>, FetchError> {
    let (Some(time), Some(value)) = (row.first(), row.get(1)) else {
        return Err(FetchError::MalformedResponse(format!(
            "Row {index} has fewer than two columns"
        )));
    };

    let timestamp = time.as_i64().ok_or_else(|| {
        FetchError::MalformedResponse(format!("Row {index} time is not an integer: {time}"))
    })?;

    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(|v| Some(Point::new(timestamp, v))).ok_or_else(|| {
            FetchError::MalformedResponse(format!("Row {index} value is out of range: {n}"))
        }),
        other => Err(FetchError::MalformedResponse(format!(
            "Row {index} value is not numeric: {other}"
        ))),
    }
}
