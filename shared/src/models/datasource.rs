//! Data source model.
//!
//! A data source names an external time-series store and the credentials used
//! to query it. Data sources are owned by an organization and resolved by
//! `(name, org_id)`.

use serde::{Deserialize, Serialize};

/// Kind of external store behind a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// InfluxDB 1.x HTTP API.
    InfluxDb,
    /// `ClickHouse` HTTP interface.
    ClickHouse,
    /// Process-local series, used for tests and demos.
    Memory,
}

impl std::fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InfluxDb => write!(f, "influxdb"),
            Self::ClickHouse => write!(f, "clickhouse"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// A named, organization-scoped connection to a time-series store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    /// Name used by batch requests to refer to this source.
    pub name: String,

    /// Owning organization.
    #[serde(rename = "org")]
    pub org_id: i64,

    /// Store type.
    #[serde(rename = "type")]
    pub kind: DataSourceKind,

    /// Base URL of the store (e.g. `http://localhost:8086`).
    #[serde(default)]
    pub url: String,

    /// Database to query.
    #[serde(default)]
    pub database: String,

    /// Username for authentication.
    #[serde(default)]
    pub user: String,

    /// Password for authentication.
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl DataSource {
    /// Creates a data source without connection details.
    #[must_use]
    pub fn new(name: impl Into<String>, org_id: i64, kind: DataSourceKind) -> Self {
        Self {
            name: name.into(),
            org_id,
            kind,
            url: String::new(),
            database: String::new(),
            user: String::new(),
            password: String::new(),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the database.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }
}

// Keeps passwords out of logs.
impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("name", &self.name)
            .field("org_id", &self.org_id)
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("database", &self.database)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}
