//! Data source registry.
//!
//! Provides the `DataSourceStore` trait for resolving data sources by name
//! within an organization, and an `InMemoryDataSourceStore` that can be
//! seeded from a JSON file.

use crate::models::DataSource;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during data source store operations.
#[derive(Debug, Error)]
pub enum DataSourceStoreError {
    /// No data source with this name exists in the organization.
    #[error("Data source '{name}' not found in org {org_id}")]
    NotFound {
        /// Requested name.
        name: String,
        /// Requested organization.
        org_id: i64,
    },

    /// A data source with this name already exists in the organization.
    #[error("Data source '{name}' already exists in org {org_id}")]
    Duplicate {
        /// Conflicting name.
        name: String,
        /// Organization of the conflict.
        org_id: i64,
    },

    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on data source store")]
    LockError,

    /// The data source file could not be read.
    #[error("Failed to read data source file: {0}")]
    Io(#[from] std::io::Error),

    /// The data source file is not a JSON array of data sources.
    #[error("Invalid data source file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Trait for data source registries.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait DataSourceStore: Send + Sync {
    /// Resolves a data source by name within an organization.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceStoreError::NotFound`] if there is no match.
    fn get(&self, name: &str, org_id: i64) -> Result<DataSource, DataSourceStoreError>;

    /// Registers a data source.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceStoreError::Duplicate`] if the name is taken in
    /// that organization.
    fn insert(&self, source: DataSource) -> Result<(), DataSourceStoreError>;

    /// Lists the data sources of an organization, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self, org_id: i64) -> Result<Vec<DataSource>, DataSourceStoreError>;

    /// Returns the total number of data sources across organizations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn count(&self) -> Result<usize, DataSourceStoreError>;
}

type SourceKey = (i64, String);

/// In-memory data source store.
#[derive(Debug, Default)]
pub struct InMemoryDataSourceStore {
    sources: Arc<RwLock<HashMap<SourceKey, DataSource>>>,
}

impl InMemoryDataSourceStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `sources`.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceStoreError::Duplicate`] if two sources share a
    /// name within the same organization.
    pub fn with_sources(
        sources: impl IntoIterator<Item = DataSource>,
    ) -> Result<Self, DataSourceStoreError> {
        let store = Self::new();
        for source in sources {
            store.insert(source)?;
        }
        Ok(store)
    }

    /// Loads a store from a JSON file holding an array of data sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// contains duplicates.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, DataSourceStoreError> {
        let path = path.as_ref();
        let contents = std::fs::read(path)?;
        let sources: Vec<DataSource> = serde_json::from_slice(&contents)?;

        tracing::info!(
            path = %path.display(),
            count = sources.len(),
            "Loaded data sources"
        );

        Self::with_sources(sources)
    }
}

impl DataSourceStore for InMemoryDataSourceStore {
    fn get(&self, name: &str, org_id: i64) -> Result<DataSource, DataSourceStoreError> {
        let sources = self
            .sources
            .read()
            .map_err(|_| DataSourceStoreError::LockError)?;

        sources
            .get(&(org_id, name.to_string()))
            .cloned()
            .ok_or_else(|| DataSourceStoreError::NotFound {
                name: name.to_string(),
                org_id,
            })
    }

    fn insert(&self, source: DataSource) -> Result<(), DataSourceStoreError> {
        let mut sources = self
            .sources
            .write()
            .map_err(|_| DataSourceStoreError::LockError)?;

        let key = (source.org_id, source.name.clone());
        if sources.contains_key(&key) {
            return Err(DataSourceStoreError::Duplicate {
                name: source.name,
                org_id: source.org_id,
            });
        }
        sources.insert(key, source);
        Ok(())
    }

    fn list(&self, org_id: i64) -> Result<Vec<DataSource>, DataSourceStoreError> {
        let sources = self
            .sources
            .read()
            .map_err(|_| DataSourceStoreError::LockError)?;

        let mut listed: Vec<DataSource> = sources
            .values()
            .filter(|s| s.org_id == org_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    fn count(&self) -> Result<usize, DataSourceStoreError> {
        let sources = self
            .sources
            .read()
            .map_err(|_| DataSourceStoreError::LockError)?;
        Ok(sources.len())
    }
}
