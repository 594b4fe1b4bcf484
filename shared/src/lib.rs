//! Seriesjoin Shared Library
//!
//! This crate contains the types and logic used across the Seriesjoin
//! workspace: aligning independently sourced time series into one table and
//! exporting that table as CSV.
//!
//! # Modules
//!
//! - [`models`] - Points, series, aligned rows and tables, batch requests, data sources
//! - [`align`] - The k-way timestamp merge-join
//! - [`storage`] - Data source registry
//! - [`fetch`] - Series fetchers for external stores
//! - [`export`] - Batch export pipeline and CSV writer
//!
//! # Example
//!
//! ```
//! use shared::align::align;
//! use shared::export::to_csv_string;
//! use shared::models::{Point, Series, Table};
//!
//! let up = Series::new(vec![Point::new(0, 1.0), Point::new(1_000_000, 1.5)]).unwrap();
//! let down = Series::new(vec![Point::new(1_000_000, 0.5)]).unwrap();
//!
//! let table = Table::new(["up", "down"], align(&[up, down]));
//! let csv = to_csv_string(&table).unwrap();
//!
//! assert_eq!(
//!     csv,
//!     "Time,up,down\n1970-01-01T00:00:00.000Z,1,\n1970-01-01T00:00:00.001Z,1.5,0.5\n"
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod align;
pub mod export;
pub mod fetch;
pub mod models;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
