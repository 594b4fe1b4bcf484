//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::config::Config;
use anyhow::{Context, Result};
use shared::fetch::{InMemoryFetcher, RoutingFetcher, SeriesFetcher};
use shared::models::DataSourceKind;
use shared::storage::{DataSourceStore, InMemoryDataSourceStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry used to resolve data sources by name and org.
    datasource_store: Arc<dyn DataSourceStore>,
    /// Fetcher used to run per-series queries.
    fetcher: Arc<dyn SeriesFetcher>,
}

impl AppState {
    /// Creates a new application state from a registry and a fetcher.
    pub fn new(datasource_store: Arc<dyn DataSourceStore>, fetcher: Arc<dyn SeriesFetcher>) -> Self {
        Self {
            datasource_store,
            fetcher,
        }
    }

    /// Builds the production state: data sources from the configured file,
    /// fetchers for the external stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the data source file cannot be loaded or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = match &config.datasources_path {
            Some(path) => InMemoryDataSourceStore::load_from_file(path)
                .with_context(|| format!("Failed to load data sources from {}", path.display()))?,
            None => {
                tracing::warn!("SERIESJOIN_DATASOURCES not set, starting with no data sources");
                InMemoryDataSourceStore::new()
            }
        };

        let fetcher = RoutingFetcher::for_external_stores(config.fetch_timeout)
            .context("Failed to initialise series fetchers")?;

        Ok(Self::new(Arc::new(store), Arc::new(fetcher)))
    }

    /// Creates a new application state with an empty in-memory registry and
    /// an in-memory fetcher for `memory` data sources.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        let fetcher =
            RoutingFetcher::new().with_fetcher(DataSourceKind::Memory, InMemoryFetcher::new());
        Self::new(Arc::new(InMemoryDataSourceStore::new()), Arc::new(fetcher))
    }

    /// Returns a reference to the data source registry.
    #[must_use]
    pub fn datasource_store(&self) -> &dyn DataSourceStore {
        self.datasource_store.as_ref()
    }

    /// Returns a reference to the series fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &dyn SeriesFetcher {
        self.fetcher.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
