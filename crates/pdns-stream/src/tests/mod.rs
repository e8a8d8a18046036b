//! Crate-level writer tests and BDD scenarios.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use reqwest::header::HeaderMap;

use crate::descriptor::{QueryDescriptor, SearchMethod, SearchTarget};
use crate::lifecycle::{Fetch, Flow, Query, Writer};
use crate::presenter::{PresentContext, Presenter};
use crate::protocol::{Observation, ProtocolState};


pub(crate) type Presented = Rc<RefCell<Vec<String>>>;

/// Records the owner name of every presented observation.
pub(crate) struct Recorder(pub(crate) Presented);

impl Presenter for Recorder {
    fn present(
        &mut self,
        observation: &Observation,
        _raw: &[u8],
        _context: &PresentContext,
    ) -> io::Result<()> {
        let name = observation
            .rrname
            .clone()
            .or_else(|| observation.rdata.clone())
            .unwrap_or_default();
        self.0.borrow_mut().push(name);
        Ok(())
    }
}

pub(crate) fn observation_line(rrname: &str) -> String {
    format!(
        "{{\"obj\":{{\"rrname\":\"{rrname}\",\"rrtype\":\"A\",\"count\":1,\"time_first\":1,\"time_last\":2}}}}\n"
    )
}

/// Begin, three observations, succeeded.
pub(crate) fn sample_stream() -> String {
    let mut stream = String::from("{\"cond\":\"begin\"}\n");
    for name in ["a.example.com", "b.example.com", "c.example.com"] {
        stream.push_str(&observation_line(name));
    }
    stream.push_str("{\"cond\":\"succeeded\"}\n");
    stream
}

pub(crate) fn capped_writer(cap: Option<u64>) -> (Writer<'static>, Presented) {
    let mut descriptor = QueryDescriptor::new(SearchMethod::Glob, SearchTarget::RrNames, "example.*");
    descriptor.output_limit = cap;
    let url = "http://localhost/dnsdb/v2/glob/rrnames/example.*"
        .parse()
        .expect("static url");
    let fetch = Fetch::new(url, HeaderMap::new());
    let query = Query::new(descriptor, "glob/rrnames/example.*", fetch);
    let presented = Presented::default();
    let writer = Writer::new(query, Box::new(Recorder(Rc::clone(&presented))));
    (writer, presented)
}

pub(crate) fn feed(writer: &mut Writer<'_>, stream: &[u8], chunk: usize) {
    for piece in stream.chunks(chunk.max(1)) {
        if writer.receive(piece) == Flow::Stop {
            break;
        }
    }
}

#[test]
fn self_limited_end_to_end_without_network() {
    let (mut writer, presented) = capped_writer(Some(2));
    writer.record_response(200);
    feed(&mut writer, sample_stream().as_bytes(), 3);
    assert!(writer.complete(Ok(())).is_ok());
    let report = writer.finish().expect("finish");
    assert_eq!(*presented.borrow(), ["a.example.com", "b.example.com"]);
    assert_eq!(report.state, ProtocolState::SelfLimited);
    assert_eq!(report.produced, 2);
}

#[test]
fn dropping_a_writer_mid_stream_releases_its_fetch() {
    let (mut writer, _) = capped_writer(None);
    writer.record_response(200);
    feed(&mut writer, b"{\"cond\":\"begin\"}\n{\"obj\":", 4);
    assert!(writer.query().fetch().is_some());
    drop(writer);
}
