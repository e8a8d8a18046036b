use tracing::{debug, warn};

use super::fetch::Fetch;
use crate::descriptor::QueryDescriptor;
use crate::protocol::{Decoder, ProtocolState};

/// Status label for a query whose response was not 2xx.
pub const STATUS_ERROR: &str = "ERROR";
/// Status label for a query that completed without producing anything.
pub const STATUS_NOERROR: &str = "NOERROR";
/// Message paired with [`STATUS_NOERROR`].
pub const NO_RESULTS_MESSAGE: &str = "no results found for query.";

/// A query's final `(status, message)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatus {
    /// Short status label.
    pub status: String,
    /// Human-readable detail.
    pub message: String,
}

impl QueryStatus {
    /// Stores a status in `slot` unless one is already there. Returns
    /// whether the slot was filled.
    pub fn set_once(slot: &mut Option<Self>, status: &str, message: impl Into<String>) -> bool {
        if slot.is_some() {
            return false;
        }
        *slot = Some(Self {
            status: status.to_owned(),
            message: message.into(),
        });
        true
    }
}

/// One logical search and, while it runs, its fetch.
#[derive(Debug)]
pub struct Query {
    descriptor: QueryDescriptor,
    path: String,
    pub(super) fetch: Option<Fetch>,
    pub(super) status: Option<QueryStatus>,
    pub(super) decoder: Decoder,
}

impl Query {
    /// Creates a query for `descriptor` addressed by `path`, with `fetch`
    /// attached.
    #[must_use]
    pub fn new(descriptor: QueryDescriptor, path: impl Into<String>, fetch: Fetch) -> Self {
        Self {
            descriptor,
            path: path.into(),
            fetch: Some(fetch),
            status: None,
            decoder: Decoder::new(),
        }
    }

    /// The search this query runs.
    #[must_use]
    pub const fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Request path, relative to the API base.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The attached fetch, if it has not been released.
    #[must_use]
    pub const fn fetch(&self) -> Option<&Fetch> {
        self.fetch.as_ref()
    }

    /// Final status, once set.
    #[must_use]
    pub const fn status(&self) -> Option<&QueryStatus> {
        self.status.as_ref()
    }

    /// Current protocol state.
    #[must_use]
    pub const fn state(&self) -> ProtocolState {
        self.decoder.state()
    }

    /// Sets the final status unless one was already recorded.
    pub fn set_status(&mut self, status: &str, message: impl Into<String>) -> bool {
        QueryStatus::set_once(&mut self.status, status, message)
    }

    /// Detaches and releases the fetch. Safe to call any number of times.
    ///
    /// Returns the number of buffered octets that were discarded.
    pub fn release_fetch(&mut self) -> usize {
        let Some(mut fetch) = self.fetch.take() else {
            return 0;
        };
        let stranded = fetch.deblocker.strand();
        if stranded != 0 {
            warn!(octets = stranded, path = %self.path, "stranding octets");
        }
        debug!(url = %fetch.url(), "released fetch");
        stranded
    }

    /// End-of-life teardown. Idempotent.
    pub fn teardown(&mut self) {
        self.release_fetch();
        debug!(path = %self.path, state = %self.state(), "query torn down");
    }

    /// Snapshot of the query's outcome.
    #[must_use]
    pub fn report(&self, produced: u64) -> QueryReport {
        QueryReport {
            state: self.state(),
            status: self.status.clone(),
            server_message: self.decoder.server_message().map(str::to_owned),
            produced,
            rejected: self.decoder.rejected(),
        }
    }
}

/// What a finished query amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    /// Final protocol state.
    pub state: ProtocolState,
    /// Final status, if any.
    pub status: Option<QueryStatus>,
    /// Last `msg` sent by the server.
    pub server_message: Option<String>,
    /// Records handed to the presenter.
    pub produced: u64,
    /// Lines dropped because they failed to decode.
    pub rejected: u64,
}

impl QueryReport {
    /// One-line summary for the user, if there is anything to say.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let msg = self.server_message.as_deref().unwrap_or_default();
        match self.state {
            ProtocolState::Limited => Some(format!("Query limited: {msg}")),
            ProtocolState::Failed => Some(format!("Query failed: {msg}")),
            ProtocolState::Missing => Some(format!("Query response_missing: {msg}")),
            _ => self
                .status
                .as_ref()
                .map(|status| format!("Query status: {} ({})", status.status, status.message)),
        }
    }
}
