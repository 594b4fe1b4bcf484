//! Data models for Seriesjoin.
//!
//! This module contains the core data structures: input series, aligned
//! output, batch requests and data sources.

pub mod datasource;
pub mod request;
pub mod series;
pub mod table;

pub use datasource::{DataSource, DataSourceKind};
pub use request::{BatchRequest, RequestValidationError, SeriesRequest};
pub use series::{Point, Series, SeriesError};
pub use table::{Row, Table, TIME_COLUMN};
