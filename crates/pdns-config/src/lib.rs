//! Shared configuration for the passive-DNS flex search client.
//!
//! Values are layered by `ortho_config`: built-in defaults, an optional TOML
//! file named by `--config-path` or `DNSDB_CONFIG_PATH`, `DNSDB_*`
//! environment variables, and finally the configuration flags split out of
//! the command line by the CLI.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;
mod logging;
mod server;

pub use defaults::{
    API_PREFIX, BLOCKED_API_KEY_PREFIXES, DEFAULT_LOG_FILTER, DEFAULT_SERVER, default_log_filter,
    default_log_format, default_server,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use server::{ServerUrl, ServerUrlError};

/// Configuration consumed by the `pdnsflex` binary.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "DNSDB")]
pub struct Config {
    /// API key sent in the `X-Api-Key` header.
    pub api_key: Option<String>,
    /// Base URL of the DNSDB-compatible server.
    #[ortho_config(default = defaults::default_server())]
    pub server: String,
    /// `tracing` filter expression applied to diagnostics.
    #[ortho_config(default = defaults::default_log_filter())]
    pub log_filter: String,
    /// Diagnostic output format.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Uniform connect and total timeout for every fetch, in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            server: defaults::default_server(),
            log_filter: defaults::default_log_filter(),
            log_format: defaults::default_log_format(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured diagnostic format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the optional per-fetch timeout. Zero means no timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Normalises the configured server into an API base URL.
    pub fn server_url(&self) -> Result<ServerUrl, ConfigError> {
        self.server.parse().map_err(ConfigError::Server)
    }

    /// Returns the API key once it has been checked against the block list.
    pub fn credentials(&self) -> Result<&str, ConfigError> {
        let key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        if BLOCKED_API_KEY_PREFIXES
            .iter()
            .any(|prefix| key.starts_with(prefix))
        {
            return Err(ConfigError::BlockedApiKey);
        }
        Ok(key)
    }
}

/// Errors raised when the loaded configuration cannot drive a query.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key was found in any configuration layer.
    #[error("no API key given; set DNSDB_API_KEY or api_key in the configuration file")]
    MissingApiKey,
    /// The key belongs to a class that may not use the flex API.
    #[error("the type of API key given is not allowed to use the DNSDB Flex API")]
    BlockedApiKey,
    /// The server setting is not a usable base URL.
    #[error("invalid server: {0}")]
    Server(#[source] ServerUrlError),
}
