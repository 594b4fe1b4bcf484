//! Aligned row and table data model.

use serde::{Deserialize, Serialize};

/// Name of the fixed first column of every table.
pub const TIME_COLUMN: &str = "Time";

/// One output record of the aligner.
///
/// `values[i]` holds the sample of input series `i` at `timestamp`, or `None`
/// when that series has no sample there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// One cell per input series, in input order.
    pub values: Vec<Option<f64>>,
}

impl Row {
    /// Creates a row with every cell missing.
    #[must_use]
    pub fn missing(timestamp: i64, width: usize) -> Self {
        Self {
            timestamp,
            values: vec![None; width],
        }
    }

    /// Creates a row from explicit cells.
    #[must_use]
    pub fn new(timestamp: i64, values: Vec<Option<f64>>) -> Self {
        Self { timestamp, values }
    }

    /// Number of value cells (excluding the time column).
    #[must_use]
    pub fn width(&self) -> usize {
        self.values.len()
    }
}

/// An aligned table ready to be serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names; the first is always [`TIME_COLUMN`].
    pub header: Vec<String>,
    /// Rows in strictly increasing timestamp order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Builds a table from per-series labels and aligned rows.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::models::{Row, Table};
    ///
    /// let table = Table::new(["cpu", "mem"], vec![Row::new(10, vec![Some(1.0), None])]);
    /// assert_eq!(table.header, vec!["Time", "cpu", "mem"]);
    /// assert_eq!(table.column_count(), 3);
    /// ```
    #[must_use]
    pub fn new<I, S>(labels: I, rows: Vec<Row>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header = std::iter::once(TIME_COLUMN.to_string())
            .chain(labels.into_iter().map(Into::into))
            .collect();
        Self { header, rows }
    }

    /// Number of columns including the time column.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The per-series labels, without the time column.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        self.header.get(1..).unwrap_or_default()
    }
}
