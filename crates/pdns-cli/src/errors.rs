//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use pdns_config::ConfigError;
use pdns_stream::{RequestError, TransportError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    /// Invalid option values; reported with a pointer to `-h`.
    #[error("{0}")]
    Usage(String),
    /// A glob that is unlikely to match anything, refused without `--force`.
    #[error("Error: {0}\nYou may not get results from your search.")]
    UnhelpfulGlob(&'static str),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to build the request: {0}")]
    Request(#[from] RequestError),
    #[error("{0}")]
    Transport(#[from] TransportError),
    #[error("failed to start the I/O runtime: {0}")]
    Runtime(io::Error),
    #[error("failed to write output: {0}")]
    Output(io::Error),
}

impl AppError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub(crate) const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}
