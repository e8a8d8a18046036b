use std::time::Duration;

use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use tracing::{debug, trace};

use super::outcome::TransportError;
use crate::lifecycle::{Flow, Writer};

/// Upper bound on a single wait for fetch progress.
pub const WAIT_SLICE: Duration = Duration::from_secs(1);

struct Completion<'p> {
    writer: Writer<'p>,
    transfer: Result<(), reqwest::Error>,
}

/// Drives a set of fetches on the current thread.
///
/// Bytes are decoded and presented inside the fetch that received them,
/// so records of one query are handled strictly in arrival order. Fetches
/// of different queries interleave freely.
pub struct Multiplexer<'p> {
    client: Client,
    in_flight: FuturesUnordered<LocalBoxFuture<'p, Completion<'p>>>,
    finished: Vec<Writer<'p>>,
    failures: Vec<TransportError>,
}

impl<'p> Multiplexer<'p> {
    pub(super) fn new(client: Client) -> Self {
        Self {
            client,
            in_flight: FuturesUnordered::new(),
            finished: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Number of fetches still open.
    #[must_use]
    pub fn open(&self) -> usize {
        self.in_flight.len()
    }

    /// Transport failures observed so far.
    #[must_use]
    pub fn failures(&self) -> &[TransportError] {
        &self.failures
    }

    /// Starts the writer's fetch.
    pub fn launch(&mut self, writer: Writer<'p>) {
        let client = self.client.clone();
        self.in_flight.push(drive(client, writer).boxed_local());
    }

    /// Runs fetches until at most `threshold` remain open, then drains
    /// every fetch that has already completed.
    ///
    /// A threshold of zero waits for everything.
    pub async fn run(&mut self, threshold: usize) {
        let mut idle = 0_u32;
        while self.in_flight.len() > threshold {
            match tokio::time::timeout(WAIT_SLICE, self.in_flight.next()).await {
                Ok(Some(completion)) => {
                    idle = 0;
                    self.drain(completion);
                }
                Ok(None) => break,
                Err(_) => {
                    idle = idle.saturating_add(1);
                    trace!(open = self.in_flight.len(), idle, "waiting for fetches");
                }
            }
        }
        while let Some(Some(completion)) = self.in_flight.next().now_or_never() {
            self.drain(completion);
        }
    }

    fn drain(&mut self, completion: Completion<'p>) {
        let Completion { mut writer, transfer } = completion;
        if let Err(error) = writer.complete(transfer) {
            debug!(%error, "fetch failed");
            self.failures.push(error);
        }
        self.finished.push(writer);
    }

    /// Hands back the finished writers and every transport failure.
    ///
    /// Fetches still open are dropped, which aborts their transfers and
    /// tears their queries down.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Writer<'p>>, Vec<TransportError>) {
        if !self.in_flight.is_empty() {
            debug!(open = self.in_flight.len(), "abandoning open fetches");
        }
        (self.finished, self.failures)
    }
}

async fn drive(client: Client, mut writer: Writer<'_>) -> Completion<'_> {
    let transfer = stream_body(&client, &mut writer).await;
    Completion { writer, transfer }
}

async fn stream_body(client: &Client, writer: &mut Writer<'_>) -> Result<(), reqwest::Error> {
    let Some((url, headers)) = writer.request() else {
        return Ok(());
    };
    debug!(url = %url, "fetch started");
    let mut response = client.get(url).headers(headers).send().await?;
    writer.record_response(response.status().as_u16());
    while let Some(chunk) = response.chunk().await? {
        if writer.receive(&chunk) == Flow::Stop {
            debug!("aborting fetch");
            return Ok(());
        }
    }
    Ok(())
}
