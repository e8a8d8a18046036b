use std::io;

use reqwest::Url;
use reqwest::header::HeaderMap;
use tracing::{debug, trace, warn};

use super::query::{NO_RESULTS_MESSAGE, Query, QueryReport, QueryStatus, STATUS_ERROR, STATUS_NOERROR};
use crate::governor::OutputGovernor;
use crate::presenter::{PresentContext, Presenter};
use crate::transport::{TransportError, classify};

/// What the transport should do after a chunk was absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// Abort the transfer; the stop is intentional.
    Stop,
}

/// Output-cap scope owning exactly one query.
///
/// Dropping a writer tears its query down, so every exit path releases the
/// fetch exactly once.
pub struct Writer<'p> {
    query: Query,
    governor: OutputGovernor,
    presenter: Box<dyn Presenter + 'p>,
    output_error: Option<io::Error>,
}

impl<'p> Writer<'p> {
    /// Wraps `query`, capping output at the descriptor's output limit.
    #[must_use]
    pub fn new(query: Query, presenter: Box<dyn Presenter + 'p>) -> Self {
        let governor = OutputGovernor::new(query.descriptor().output_limit);
        Self {
            query,
            governor,
            presenter,
            output_error: None,
        }
    }

    /// The owned query.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Records handed to the presenter so far.
    #[must_use]
    pub const fn produced(&self) -> u64 {
        self.governor.produced()
    }

    /// URL and headers for the transfer, while a fetch is attached.
    #[must_use]
    pub fn request(&self) -> Option<(Url, HeaderMap)> {
        self.query
            .fetch
            .as_ref()
            .map(|fetch| (fetch.url().clone(), fetch.headers().clone()))
    }

    /// Stores the HTTP status of the response.
    pub fn record_response(&mut self, code: u16) {
        if let Some(fetch) = self.query.fetch.as_mut()
            && fetch.response_code.is_none()
        {
            trace!(code, url = %fetch.url(), "response started");
            fetch.response_code = Some(code);
        }
    }

    /// Absorbs one chunk of the response body.
    pub fn receive(&mut self, chunk: &[u8]) -> Flow {
        let Self {
            query,
            governor,
            presenter,
            output_error,
        } = self;
        let Some(fetch) = query.fetch.as_mut() else {
            warn!(octets = chunk.len(), "data arrived for a released fetch");
            return Flow::Stop;
        };
        trace!(octets = chunk.len(), url = %fetch.url(), "chunk received");

        if let Some(code) = fetch.response_code
            && !fetch.is_success()
        {
            let message = status_line(chunk, code);
            if QueryStatus::set_once(&mut query.status, STATUS_ERROR, message.clone()) {
                warn!(code, url = %fetch.url(), "request failed");
            }
            debug!(message = %message, "server said");
            fetch.deblocker.clear();
            return Flow::Continue;
        }

        fetch.deblocker.push(chunk);
        while let Some(line) = fetch.deblocker.next_record() {
            if governor.cap_reached() {
                debug!(cap = governor.cap(), "hit output limit");
                query.decoder.self_limit();
                fetch.stopped = true;
                fetch.deblocker.clear();
                return Flow::Stop;
            }

            if let Some(observation) = query.decoder.feed(&line) {
                let context = PresentContext {
                    produced: governor.produced(),
                    output_cap: governor.cap(),
                };
                if let Err(error) = presenter.present(&observation, &line, &context) {
                    warn!(%error, "presenter failed");
                    *output_error = Some(error);
                    fetch.stopped = true;
                    return Flow::Stop;
                }
                governor.record_produced();
            }

            if query.decoder.state().is_terminal() {
                fetch.stopped = true;
            }
        }
        Flow::Continue
    }

    /// Completion handling once the transport reports the transfer done.
    ///
    /// Classifies the outcome, fills in the "no results" status, marks a
    /// stream that ended without a terminal condition, and releases the
    /// fetch.
    pub fn complete(&mut self, transfer: Result<(), reqwest::Error>) -> Result<(), TransportError> {
        let Some(fetch) = self.query.fetch.as_ref() else {
            return Ok(());
        };
        let stopped = fetch.stopped();
        let success = fetch.is_success();
        debug!(
            url = %fetch.url(),
            code = fetch.response_code(),
            state = %self.query.state(),
            produced = self.governor.produced(),
            "fetch done"
        );

        let mut outcome = classify(fetch.url().as_str(), transfer, stopped);
        if let Some(error) = self.output_error.take() {
            outcome = outcome.and(Err(TransportError::Output(error)));
        }

        if self.governor.produced() == 0 {
            self.query.set_status(STATUS_NOERROR, NO_RESULTS_MESSAGE);
        }
        if outcome.is_ok() && success && !stopped {
            self.query.decoder.mark_missing();
        }

        self.query.release_fetch();
        outcome
    }

    /// Tears the query down, flushes the presenter, and reports.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Output`] when the presenter cannot flush.
    pub fn finish(mut self) -> Result<QueryReport, TransportError> {
        self.query.teardown();
        self.presenter.finish().map_err(TransportError::Output)?;
        Ok(self.query.report(self.governor.produced()))
    }
}

impl Drop for Writer<'_> {
    fn drop(&mut self) {
        self.query.teardown();
    }
}

fn status_line(chunk: &[u8], code: u16) -> String {
    let text = String::from_utf8_lossy(chunk);
    let line = text.split(['\r', '\n']).next().unwrap_or_default();
    if line.eq_ignore_ascii_case("<html>") {
        format!("HTTP Status {code}")
    } else {
        line.to_owned()
    }
}
