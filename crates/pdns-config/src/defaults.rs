//! Built-in configuration defaults.

use crate::logging::LogFormat;

/// Server used when neither the environment nor a file names one.
pub const DEFAULT_SERVER: &str = "https://api.dnsdb.info";

/// Path prefix every flex API URL must carry.
pub const API_PREFIX: &str = "/dnsdb/v2";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// API key prefixes that may not use the flex API.
pub const BLOCKED_API_KEY_PREFIXES: &[&str] = &["dce-"];

/// Owned default server value used by the configuration loader.
#[must_use]
pub fn default_server() -> String {
    DEFAULT_SERVER.to_owned()
}

/// Owned log filter value used by the configuration loader.
#[must_use]
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default diagnostic format for an interactive client.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
