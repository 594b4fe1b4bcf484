//! Storage traits and implementations.
//!
//! The `DataSourceStore` trait defines how data sources are resolved by name
//! within an organization, allowing different registries (in-memory,
//! file-backed, database-backed).

pub mod datasource_store;

pub use datasource_store::{DataSourceStore, DataSourceStoreError, InMemoryDataSourceStore};
