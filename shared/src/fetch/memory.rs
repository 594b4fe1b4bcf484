//! In-memory series fetcher for development and testing.

use super::{FetchError, SeriesFetcher};
use crate::models::{DataSource, Series};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Answers queries from a fixed table of series.
///
/// Unknown queries return an empty series, the same way a store answers a
/// query matching no data.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    series: HashMap<String, Series>,
    failures: HashMap<String, FetchError>,
    delays: HashMap<String, Duration>,
    fetch_count: AtomicUsize,
}

impl InMemoryFetcher {
    /// Creates a fetcher that knows no queries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `query` with `series`.
    #[must_use]
    pub fn with_series(mut self, query: impl Into<String>, series: Series) -> Self {
        self.series.insert(query.into(), series);
        self
    }

    /// Fails `query` with `error`.
    #[must_use]
    pub fn with_failure(mut self, query: impl Into<String>, error: FetchError) -> Self {
        self.failures.insert(query.into(), error);
        self
    }

    /// Delays the answer to `query`.
    #[must_use]
    pub fn with_delay(mut self, query: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(query.into(), delay);
        self
    }

    /// Number of fetches started so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl SeriesFetcher for InMemoryFetcher {
    fn fetch<'a>(
        &'a self,
        source: &'a DataSource,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Series, FetchError>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        Box::pin(async move {
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }

            if let Some(error) = self.failures.get(query) {
                return Err(error.clone());
            }

            tracing::debug!(source = %source.name, query, "Serving series from memory");
            Ok(self.series.get(query).cloned().unwrap_or_default())
        })
    }
}
