//! `ClickHouse` series fetcher.
//!
//! The query must return two columns named `timestamp` (`Int64`, nanoseconds
//! since the epoch) and `value` (`Float64`), for example:
//!
//! ```sql
//! SELECT toUnixTimestamp64Nano(ts) AS timestamp, avg(v) AS value
//! FROM readings GROUP BY timestamp ORDER BY timestamp
//! ```
//!
//! The `clickhouse` client treats `?` as a bind placeholder, so queries must
//! not contain a literal `?`.

use super::{FetchError, SeriesFetcher, DEFAULT_FETCH_TIMEOUT};
use crate::models::{DataSource, Point, Series};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

#[derive(::clickhouse::Row, serde::Deserialize)]
struct PointRow {
    timestamp: i64,
    value: f64,
}

/// Connection details a client is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    url: String,
    database: String,
    user: String,
    password: String,
}

impl From<&DataSource> for ClientKey {
    fn from(source: &DataSource) -> Self {
        Self {
            url: source.url.clone(),
            database: source.database.clone(),
            user: source.user.clone(),
            password: source.password.clone(),
        }
    }
}

/// Fetches series from `ClickHouse`.
///
/// One client is kept per set of connection details, so series and batches
/// that hit the same server share its connection pool. Clones share the
/// cache.
#[derive(Clone)]
pub struct ClickHouseFetcher {
    timeout: Duration,
    clients: Arc<RwLock<HashMap<ClientKey, Arc<::clickhouse::Client>>>>,
}

impl ClickHouseFetcher {
    /// Creates a fetcher whose queries are abandoned after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the cached client for `source`, building it on first use.
    fn client(&self, source: &DataSource) -> Arc<::clickhouse::Client> {
        let key = ClientKey::from(source);

        // The cache holds no invariant a panicking writer could break.
        if let Some(client) = self
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(client);
        }

        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        let client = clients.entry(key).or_insert_with(|| {
            tracing::debug!(source = %source.name, url = %source.url, "Creating ClickHouse client");
            Arc::new(build_client(source))
        });
        Arc::clone(client)
    }

    async fn run(&self, source: &DataSource, query: &str) -> Result<Series, FetchError> {
        let client = self.client(source);
        let rows = tokio::time::timeout(self.timeout, client.query(query).fetch_all::<PointRow>())
            .await
            .map_err(|_| {
                FetchError::Unreachable(format!(
                    "{} did not answer within {:?}",
                    source.name, self.timeout
                ))
            })?
            .map_err(|e| classify_error(&e))?;

        let points = rows
            .into_iter()
            .map(|row| Point::new(row.timestamp, row.value))
            .collect();

        Ok(Series::from_unsorted(points))
    }
}

impl Default for ClickHouseFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl std::fmt::Debug for ClickHouseFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseFetcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn build_client(source: &DataSource) -> ::clickhouse::Client {
    let mut client = ::clickhouse::Client::default().with_url(&source.url);
    if !source.database.is_empty() {
        client = client.with_database(&source.database);
    }
    if !source.user.is_empty() {
        client = client
            .with_user(&source.user)
            .with_password(&source.password);
    }
    client
}

impl SeriesFetcher for ClickHouseFetcher {
    fn fetch<'a>(
        &'a self,
        source: &'a DataSource,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Series, FetchError>> {
        Box::pin(self.run(source, query))
    }
}

/// Maps a `ClickHouse` client error onto a [`FetchError`].
fn classify_error(error: &::clickhouse::error::Error) -> FetchError {
    use ::clickhouse::error::Error;

    let message = error.to_string();
    match error {
        Error::Network(_) | Error::TimedOut => FetchError::Unreachable(message),
        Error::BadResponse(body) if is_authentication_failure(body) => {
            FetchError::AuthenticationFailed(message)
        }
        Error::BadResponse(_) => FetchError::QueryRejected(message),
        _ => FetchError::MalformedResponse(message),
    }
}

// ClickHouse reports code 516 (AUTHENTICATION_FAILED) for bad credentials.
fn is_authentication_failure(body: &str) -> bool {
    body.contains("AUTHENTICATION_FAILED") || body.contains("Code: 516")
}
