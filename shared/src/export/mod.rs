//! Batch export pipeline.
//!
//! Turns a [`BatchRequest`] into an aligned [`Table`]:
//!
//! 1. every entry is validated;
//! 2. every data source is resolved, before anything is fetched;
//! 3. all series are fetched concurrently, in request order;
//! 4. the series are aligned and labelled.
//!
//! Any failure aborts the whole batch. A failed fetch never turns into an
//! empty column.

pub mod writer;

pub use writer::{format_timestamp, format_value, to_csv_string, write_csv, WriterError};

use crate::align::align;
use crate::fetch::{FetchError, SeriesFetcher};
use crate::models::{BatchRequest, DataSource, RequestValidationError, Table};
use crate::storage::{DataSourceStore, DataSourceStoreError};
use futures::future::try_join_all;
use thiserror::Error;

/// Errors that can occur while exporting a batch.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The batch failed validation.
    #[error(transparent)]
    InvalidRequest(#[from] RequestValidationError),

    /// A requested data source does not exist in the requested organization.
    #[error("Data source '{name}' not found in org {org_id}")]
    SourceNotFound {
        /// Requested name.
        name: String,
        /// Requested organization.
        org_id: i64,
    },

    /// The data source registry failed.
    #[error("Failed to query data sources: {0}")]
    Registry(DataSourceStoreError),

    /// Fetching one of the series failed.
    #[error("Series {index} ('{label}') failed: {source}")]
    Fetch {
        /// Position of the failing entry in the batch.
        index: usize,
        /// Column label of the failing entry.
        label: String,
        /// The underlying fetch failure.
        source: FetchError,
    },

    /// The table could not be serialized.
    #[error(transparent)]
    Writer(#[from] WriterError),
}

impl From<DataSourceStoreError> for ExportError {
    fn from(error: DataSourceStoreError) -> Self {
        match error {
            DataSourceStoreError::NotFound { name, org_id } => Self::SourceNotFound { name, org_id },
            other => Self::Registry(other),
        }
    }
}

fn resolve_sources<S>(batch: &BatchRequest, store: &S) -> Result<Vec<DataSource>, ExportError>
where
    S: DataSourceStore + ?Sized,
{
    batch
        .series
        .iter()
        .map(|entry| {
            store
                .get(&entry.source_name, entry.org_id)
                .map_err(ExportError::from)
        })
        .collect()
}

/// Runs a batch and returns the aligned table.
///
/// # Errors
///
/// Returns the first failure: validation, then source resolution, then the
/// first fetch to fail. No partial table is ever produced.
pub async fn export_batch<S, F>(
    batch: &BatchRequest,
    store: &S,
    fetcher: &F,
) -> Result<Table, ExportError>
where
    S: DataSourceStore + ?Sized,
    F: SeriesFetcher + ?Sized,
{
    batch.validate_entries()?;

    let sources = resolve_sources(batch, store).inspect_err(|e| {
        tracing::warn!(error = %e, "Failed to resolve data sources");
    })?;

    tracing::info!(series = batch.len(), "Starting batch export");

    let fetches = batch
        .series
        .iter()
        .zip(&sources)
        .enumerate()
        .map(|(index, (entry, source))| async move {
            tracing::debug!(
                index,
                source = %source.name,
                kind = %source.kind,
                "Fetching series"
            );

            fetcher
                .fetch(source, &entry.query)
                .await
                .map_err(|error| {
                    tracing::warn!(
                        index,
                        source = %source.name,
                        error = %error,
                        "Series fetch failed, aborting batch"
                    );
                    ExportError::Fetch {
                        index,
                        label: entry.column_label().to_string(),
                        source: error,
                    }
                })
        });

    let series = try_join_all(fetches).await?;

    let points: usize = series.iter().map(|s| s.len()).sum();
    let table = Table::new(batch.labels(), align(&series));

    tracing::info!(
        series = series.len(),
        points,
        columns = table.column_count(),
        rows = table.row_count(),
        "Batch export complete"
    );

    Ok(table)
}

/// Runs a batch and returns the aligned table as CSV text.
///
/// # Errors
///
/// Returns the same errors as [`export_batch`], plus
/// [`ExportError::Writer`] if serialization fails.
pub async fn export_csv<S, F>(
    batch: &BatchRequest,
    store: &S,
    fetcher: &F,
) -> Result<String, ExportError>
where
    S: DataSourceStore + ?Sized,
    F: SeriesFetcher + ?Sized,
{
    let table = export_batch(batch, store, fetcher).await?;
    Ok(to_csv_string(&table)?)
}
