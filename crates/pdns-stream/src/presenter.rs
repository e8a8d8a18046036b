//! Presentation seam.
//!
//! The engine calls [`Presenter::present`] once per forwarded observation,
//! in delivery order. What happens to the observation is up to the
//! implementation.

use std::io;

use crate::protocol::Observation;

/// Writer-side facts available to a presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentContext {
    /// Records produced before this one.
    pub produced: u64,
    /// Output cap of the owning writer.
    pub output_cap: Option<u64>,
}

/// Receives forwarded observations.
pub trait Presenter {
    /// Presents one observation. `raw` is the record line as received.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the presenter's sink; the engine stops
    /// the fetch and reports an output failure.
    fn present(
        &mut self,
        observation: &Observation,
        raw: &[u8],
        context: &PresentContext,
    ) -> io::Result<()>;

    /// Flushes buffered output once the query is over.
    ///
    /// # Errors
    ///
    /// Returns any error raised while flushing.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}
