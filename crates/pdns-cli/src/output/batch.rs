//! Batch-lookup line presenters.

use std::io::{self, Write};

use pdns_stream::{Observation, PresentContext, Presenter};
use tracing::warn;

use super::rdata_is_name;

/// The part of an observation a batch line is built from.
enum Subject<'o> {
    Name(&'o str),
    Data(&'o str),
}

fn subject(observation: &Observation) -> Option<Subject<'_>> {
    match (observation.rrname.as_deref(), observation.rdata.as_deref()) {
        (Some(rrname), _) => Some(Subject::Name(rrname)),
        (None, Some(rdata)) => Some(Subject::Data(rdata)),
        (None, None) => {
            warn!(
                fields = observation.fields().len(),
                "observation has neither rrname nor rdata; not presented"
            );
            None
        }
    }
}

pub(crate) struct BatchPresenter<W: Write> {
    sink: W,
}

impl<W: Write> BatchPresenter<W> {
    pub(crate) const fn new(sink: W) -> Self {
        Self { sink }
    }
}

impl<W: Write> Presenter for BatchPresenter<W> {
    fn present(&mut self, observation: &Observation, _raw: &[u8], _context: &PresentContext) -> io::Result<()> {
        let rrtype = observation.rrtype.as_deref().unwrap_or_default();
        match subject(observation) {
            Some(Subject::Name(rrname)) => writeln!(self.sink, "rrset/name/{rrname}/{rrtype}"),
            Some(Subject::Data(rdata)) if rdata_is_name(observation.rrtype.as_deref()) => {
                writeln!(self.sink, "rdata/name/{rdata}/{rrtype}")
            }
            Some(Subject::Data(rdata)) => {
                let raw = observation.raw_rdata.as_deref().unwrap_or_default();
                writeln!(self.sink, "rdata/raw/{raw}/{rrtype}")?;
                writeln!(self.sink, "# rdata/name/{rdata}/{rrtype}")
            }
            None => Ok(()),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

/// Folds consecutive observations of one name into a single lookup line,
/// listing each rrtype as a comment.
pub(crate) struct DedupBatchPresenter<W: Write> {
    sink: W,
    last_printed: String,
}

impl<W: Write> DedupBatchPresenter<W> {
    pub(crate) const fn new(sink: W) -> Self {
        Self {
            sink,
            last_printed: String::new(),
        }
    }

    fn print_once(&mut self, line: String) -> io::Result<()> {
        if line != self.last_printed {
            writeln!(self.sink, "{line}")?;
            self.last_printed = line;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for DedupBatchPresenter<W> {
    fn present(&mut self, observation: &Observation, _raw: &[u8], _context: &PresentContext) -> io::Result<()> {
        let rrtype = observation.rrtype.as_deref().unwrap_or_default();
        match subject(observation) {
            Some(Subject::Name(rrname)) => {
                self.print_once(format!("rrset/name/{rrname}"))?;
                writeln!(self.sink, "# rrset/name/{rrname}/{rrtype}")
            }
            Some(Subject::Data(rdata)) => {
                let line = if rdata_is_name(observation.rrtype.as_deref()) {
                    format!("rdata/name/{rdata}")
                } else {
                    let raw = observation.raw_rdata.as_deref().unwrap_or_default();
                    format!("rdata/raw/{raw}")
                };
                self.print_once(line)?;
                writeln!(self.sink, "# rdata/name/{rdata}/{rrtype}")
            }
            None => Ok(()),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
