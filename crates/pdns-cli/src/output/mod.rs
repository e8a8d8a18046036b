//! Presenters that render forwarded observations on stdout.
//!
//! JSON output copies each observation object back out compactly. The two
//! batch forms produce input for a follow-up batch lookup.

mod batch;
mod json;

use std::io::{BufWriter, Write};

use pdns_stream::Presenter;

pub(crate) use batch::{BatchPresenter, DedupBatchPresenter};
pub(crate) use json::JsonPresenter;

/// Output form selected by `-j`, `-F` or `-T`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Presentation {
    /// One compact JSON object per line.
    #[default]
    Json,
    /// Batch lookup lines.
    Batch,
    /// Batch lookup lines with repeated names folded.
    BatchDedup,
}

impl Presentation {
    /// Resolves the presentation flags; clap keeps only the last one set.
    pub(crate) const fn from_flags(batch: bool, batch_dedup: bool) -> Self {
        match (batch, batch_dedup) {
            (true, _) => Self::Batch,
            (false, true) => Self::BatchDedup,
            (false, false) => Self::Json,
        }
    }
}

/// Builds a buffered presenter writing to `sink`.
pub(crate) fn presenter_for<'p, W>(presentation: Presentation, sink: W) -> Box<dyn Presenter + 'p>
where
    W: Write + 'p,
{
    let sink = BufWriter::new(sink);
    match presentation {
        Presentation::Json => Box::new(JsonPresenter::new(sink)),
        Presentation::Batch => Box::new(BatchPresenter::new(sink)),
        Presentation::BatchDedup => Box::new(DedupBatchPresenter::new(sink)),
    }
}

/// Rrtypes whose rdata is a domain name and so safe to print literally.
const NAME_RRTYPES: &[&str] = &[
    "CNAME", "TYPE5", "NS", "TYPE2", "PTR", "TYPE12", "MB", "TYPE7", "MD", "TYPE3", "MF", "TYPE4",
    "MG", "TYPE8", "MR", "TYPE9",
];

/// Longest rrtype mnemonic worth comparing against [`NAME_RRTYPES`].
const MAX_RRTYPE_LEN: usize = 11;

fn rdata_is_name(rrtype: Option<&str>) -> bool {
    rrtype.is_some_and(|rrtype| {
        rrtype.len() <= MAX_RRTYPE_LEN
            && NAME_RRTYPES
                .iter()
                .any(|known| known.eq_ignore_ascii_case(rrtype))
    })
}
