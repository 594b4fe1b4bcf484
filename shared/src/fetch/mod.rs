//! Series fetchers.
//!
//! A [`SeriesFetcher`] runs a query against a [`DataSource`] and returns the
//! resulting [`Series`], sorted and free of duplicate timestamps. Fetchers
//! for concrete stores live in submodules; [`RoutingFetcher`] dispatches on
//! the data source kind.

pub mod clickhouse;
pub mod influxdb;
pub mod memory;

pub use self::clickhouse::ClickHouseFetcher;
pub use influxdb::InfluxDbFetcher;
pub use memory::InMemoryFetcher;

use crate::models::{DataSource, DataSourceKind, Series};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default timeout applied to a single fetch by the HTTP-based fetchers.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching a series.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The store could not be reached (connection refused, timeout, 5xx).
    #[error("Data source unreachable: {0}")]
    Unreachable(String),

    /// The store rejected the credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The store answered, but refused to run the query.
    #[error("Query rejected: {0}")]
    QueryRejected(String),

    /// The store answered with something that is not a series.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No fetcher is configured for this kind of data source.
    #[error("Unsupported data source type: {0}")]
    UnsupportedSource(DataSourceKind),
}

/// Trait for series fetchers.
///
/// Implementations must be thread-safe (Send + Sync) and must return series
/// sorted by timestamp with no duplicates; [`Series`] enforces this.
pub trait SeriesFetcher: Send + Sync {
    /// Runs `query` against `source`.
    fn fetch<'a>(
        &'a self,
        source: &'a DataSource,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Series, FetchError>>;
}

impl<T: SeriesFetcher + ?Sized> SeriesFetcher for Arc<T> {
    fn fetch<'a>(
        &'a self,
        source: &'a DataSource,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Series, FetchError>> {
        (**self).fetch(source, query)
    }
}

/// Dispatches each fetch to the fetcher registered for the data source kind.
#[derive(Clone, Default)]
pub struct RoutingFetcher {
    fetchers: HashMap<DataSourceKind, Arc<dyn SeriesFetcher>>,
}

impl RoutingFetcher {
    /// Creates a router with no fetchers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router for the external stores (`InfluxDB` and `ClickHouse`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn for_external_stores(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new()
            .with_fetcher(DataSourceKind::InfluxDb, InfluxDbFetcher::new(timeout)?)
            .with_fetcher(DataSourceKind::ClickHouse, ClickHouseFetcher::new(timeout)))
    }

    /// Registers `fetcher` for `kind`, replacing any previous one.
    #[must_use]
    pub fn with_fetcher(
        mut self,
        kind: DataSourceKind,
        fetcher: impl SeriesFetcher + 'static,
    ) -> Self {
        self.fetchers.insert(kind, Arc::new(fetcher));
        self
    }

    /// Whether a fetcher is registered for `kind`.
    #[must_use]
    pub fn supports(&self, kind: DataSourceKind) -> bool {
        self.fetchers.contains_key(&kind)
    }
}

impl SeriesFetcher for RoutingFetcher {
    fn fetch<'a>(
        &'a self,
        source: &'a DataSource,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Series, FetchError>> {
        match self.fetchers.get(&source.kind) {
            Some(fetcher) => fetcher.fetch(source, query),
            None => {
                let kind = source.kind;
                Box::pin(async move { Err(FetchError::UnsupportedSource(kind)) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    #[tokio::test]
    async fn test_routing_dispatches_on_kind() {
        let memory = InMemoryFetcher::new().with_series(
            "q",
            Series::new(vec![Point::new(1, 1.0)]).unwrap(),
        );
        let router = RoutingFetcher::new().with_fetcher(DataSourceKind::Memory, memory);

        let source = DataSource::new("mem", 1, DataSourceKind::Memory);
        let series = router.fetch(&source, "q").await.unwrap();

        assert_eq!(series.len(), 1);
        assert!(router.supports(DataSourceKind::Memory));
        assert!(!router.supports(DataSourceKind::InfluxDb));
    }

    #[tokio::test]
    async fn test_routing_unsupported_kind() {
        let router = RoutingFetcher::new();
        let source = DataSource::new("influx", 1, DataSourceKind::InfluxDb);

        let result = router.fetch(&source, "SELECT 1").await;

        assert_eq!(
            result,
            Err(FetchError::UnsupportedSource(DataSourceKind::InfluxDb))
        );
    }

    #[test]
    fn test_external_stores_registered() {
        let router = RoutingFetcher::for_external_stores(DEFAULT_FETCH_TIMEOUT).unwrap();

        assert!(router.supports(DataSourceKind::InfluxDb));
        assert!(router.supports(DataSourceKind::ClickHouse));
        assert!(!router.supports(DataSourceKind::Memory));
    }
}
