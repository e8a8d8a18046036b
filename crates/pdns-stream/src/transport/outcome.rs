//! Transport outcome classification.

use std::error::Error as _;
use std::io;

use thiserror::Error;

/// A fetch-level failure that makes the process exit unsuccessfully.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be configured.
    #[error("could not initialise the transport")]
    Setup(#[source] reqwest::Error),
    /// The server's host name did not resolve.
    #[error("could not resolve host for {url}")]
    Resolve {
        /// Request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// No connection could be established.
    #[error("could not connect to {url}")]
    Connect {
        /// Request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The transfer failed after it started.
    #[error("transfer from {url} failed")]
    Transfer {
        /// Request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The presenter could not write its output.
    #[error("could not write results")]
    Output(#[source] io::Error),
}

/// Maps the result of a finished transfer onto a transport outcome.
///
/// Resolution and connection failures always count. Any other failure is
/// ignored once the fetch was stopped on purpose, whether by the output cap
/// or by a terminal condition.
pub fn classify(url: &str, transfer: Result<(), reqwest::Error>, stopped: bool) -> Result<(), TransportError> {
    let Err(source) = transfer else {
        return Ok(());
    };
    let url = url.to_owned();
    if is_resolve_failure(&source) {
        return Err(TransportError::Resolve { url, source });
    }
    if source.is_connect() {
        return Err(TransportError::Connect { url, source });
    }
    if stopped {
        return Ok(());
    }
    Err(TransportError::Transfer { url, source })
}

// The client reports name resolution failures as connect errors; the
// resolver's message is only visible further down the source chain.
fn is_resolve_failure(error: &reqwest::Error) -> bool {
    if !error.is_connect() {
        return false;
    }
    let mut current = error.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return true;
        }
        current = cause.source();
    }
    false
}
