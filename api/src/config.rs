//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::fetch::DEFAULT_FETCH_TIMEOUT;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
///
/// Configuration values can be set via environment variables (a `.env` file
/// is honoured by the server binary):
/// - `SERIESJOIN_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `SERIESJOIN_PORT`: The port to listen on (default: 8080)
/// - `SERIESJOIN_DATASOURCES`: Path to a JSON file of data sources (default: none)
/// - `SERIESJOIN_FETCH_TIMEOUT_SECS`: Per-series fetch timeout (default: 30)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// File the data source registry is loaded from.
    pub datasources_path: Option<PathBuf>,
    /// Timeout applied to each series fetch.
    pub fetch_timeout: Duration,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SERIESJOIN_PORT` is set but cannot be parsed as a valid port number
    /// - `SERIESJOIN_FETCH_TIMEOUT_SECS` is set but is not a whole number of seconds
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("SERIESJOIN_HOST").unwrap_or(defaults.host);

        let port = lookup("SERIESJOIN_PORT")
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("SERIESJOIN_PORT is not a valid port")?
            .unwrap_or(defaults.port);

        let datasources_path = lookup("SERIESJOIN_DATASOURCES")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let fetch_timeout = lookup("SERIESJOIN_FETCH_TIMEOUT_SECS")
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("SERIESJOIN_FETCH_TIMEOUT_SECS is not a whole number of seconds")?
            .map_or(defaults.fetch_timeout, Duration::from_secs);

        Ok(Self {
            host,
            port,
            datasources_path,
            fetch_timeout,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            datasources_path: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}
