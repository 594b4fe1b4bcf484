//! Batch export request model.
//!
//! A batch is a JSON array; each entry names a data source, a query to run
//! against it, and the column label for the resulting series. Entry order is
//! column order.
//!
//! ```json
//! [
//!     {
//!         "measurement": "LoadUp",
//!         "query": "SELECT \"value\" FROM \"LoadUp\" WHERE time >= 1392678000000ms",
//!         "datasource": "influxdb",
//!         "org": 1
//!     }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// One series to fetch as part of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SeriesRequest {
    /// Column label; an empty header cell is used when absent.
    #[serde(
        rename = "measurement",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,

    /// Query string passed verbatim to the data source.
    #[validate(length(min = 1, message = "Query cannot be empty"))]
    pub query: String,

    /// Name of the data source to query.
    #[serde(rename = "datasource")]
    #[validate(length(min = 1, message = "Data source name cannot be empty"))]
    pub source_name: String,

    /// Organization owning the data source.
    #[serde(rename = "org")]
    #[validate(range(min = 1, message = "Organization id must be positive"))]
    pub org_id: i64,
}

impl SeriesRequest {
    /// Creates a request without a label.
    #[must_use]
    pub fn new(query: impl Into<String>, source_name: impl Into<String>, org_id: i64) -> Self {
        Self {
            label: None,
            query: query.into(),
            source_name: source_name.into(),
            org_id,
        }
    }

    /// Sets the column label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The header cell for this series.
    #[must_use]
    pub fn column_label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }
}

/// Errors that can occur during batch request validation.
#[derive(Debug, Error)]
pub enum RequestValidationError {
    /// The batch body is not a valid JSON array of series requests.
    #[error("Malformed batch request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An entry failed field validation.
    #[error("Invalid entry {index}: {errors}")]
    InvalidEntry {
        /// Position of the entry in the batch.
        index: usize,
        /// Field-level failures.
        errors: validator::ValidationErrors,
    },
}

/// An ordered list of series requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchRequest {
    /// Entries in output column order.
    pub series: Vec<SeriesRequest>,
}

impl BatchRequest {
    /// Creates a batch from entries.
    #[must_use]
    pub fn new(series: Vec<SeriesRequest>) -> Self {
        Self { series }
    }

    /// Parses and validates a batch from a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any entry is invalid.
    pub fn from_json(body: &[u8]) -> Result<Self, RequestValidationError> {
        let batch: Self = serde_json::from_slice(body)?;
        batch.validate_entries()?;
        Ok(batch)
    }

    /// Validates every entry, reporting the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns [`RequestValidationError::InvalidEntry`] for the first entry
    /// failing validation.
    pub fn validate_entries(&self) -> Result<(), RequestValidationError> {
        for (index, entry) in self.series.iter().enumerate() {
            entry
                .validate()
                .map_err(|errors| RequestValidationError::InvalidEntry { index, errors })?;
        }
        Ok(())
    }

    /// Header labels in column order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(SeriesRequest::column_label)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the batch has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
