use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::defaults::API_PREFIX;

/// Normalised base URL of a flex API server.
///
/// A bare host gains an `https://` scheme and the `/dnsdb/v2` prefix is
/// appended when the configured value does not already carry it. The stored
/// form never ends in a slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl {
    base: String,
}

impl ServerUrl {
    /// Returns the normalised base URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }

    /// Appends an already-escaped request path to the base URL.
    #[must_use]
    pub fn with_path(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.base)
    }
}

impl FromStr for ServerUrl {
    type Err = ServerUrlError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ServerUrlError::Empty);
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_owned()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&with_scheme)?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ServerUrlError::UnsupportedScheme(other.to_owned())),
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ServerUrlError::MissingHost(input.to_owned()));
        }

        let mut base = with_scheme.trim_end_matches('/').to_owned();
        if !base.contains(API_PREFIX) {
            base.push_str(API_PREFIX);
        }
        Ok(Self { base })
    }
}

/// Errors encountered while normalising a server setting.
#[derive(Debug, Error)]
pub enum ServerUrlError {
    /// The setting was blank.
    #[error("server must not be empty")]
    Empty,
    /// Only HTTP and HTTPS are spoken.
    #[error("unsupported server scheme '{0}'")]
    UnsupportedScheme(String),
    /// The URL named no host.
    #[error("missing host in server '{0}'")]
    MissingHost(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
