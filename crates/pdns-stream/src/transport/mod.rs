//! HTTP transport context.
//!
//! [`Transport`] is created once per process with [`Transport::init`] and
//! consumed by [`Transport::shutdown`]. Every fetch shares its client, so
//! certificate, address-family, and timeout settings apply uniformly.

mod multiplexer;
mod outcome;
mod request;

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use tracing::debug;

pub use multiplexer::{Multiplexer, WAIT_SLICE};
pub use outcome::{TransportError, classify};
pub use request::{ApiSystem, NDJSON, RequestError, prepare};

/// Address family used for outgoing connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IpFamily {
    /// Whatever the resolver returns.
    #[default]
    Any,
    /// IPv4 only.
    V4,
    /// IPv6 only.
    V6,
}

impl IpFamily {
    const fn local_address(self) -> Option<IpAddr> {
        match self {
            Self::Any => None,
            Self::V4 => Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            Self::V6 => Some(IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
        }
    }
}

/// Settings applied to every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportSettings {
    /// Skip certificate validation.
    pub insecure: bool,
    /// Address family pin.
    pub ip_family: IpFamily,
    /// Uniform connect and total timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Shared HTTP client for all fetches of one process.
#[derive(Debug)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] when the client cannot be built,
    /// for example when no TLS backend is available.
    pub fn init(settings: &TransportSettings) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.insecure)
            .local_address(settings.ip_family.local_address());
        if let Some(timeout) = settings.timeout {
            builder = builder.connect_timeout(timeout).timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Setup)?;
        debug!(
            insecure = settings.insecure,
            family = ?settings.ip_family,
            timeout = ?settings.timeout,
            "transport initialised"
        );
        Ok(Self { client })
    }

    /// Creates an empty multiplexer sharing this transport's client.
    #[must_use]
    pub fn multiplexer<'p>(&self) -> Multiplexer<'p> {
        Multiplexer::new(self.client.clone())
    }

    /// Releases the transport.
    pub fn shutdown(self) {
        debug!("transport shut down");
        drop(self.client);
    }
}
