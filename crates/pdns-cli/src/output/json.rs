//! Newline-delimited JSON presenter.

use std::io::{self, Write};

use pdns_stream::{Observation, PresentContext, Presenter};

pub(crate) struct JsonPresenter<W: Write> {
    sink: W,
}

impl<W: Write> JsonPresenter<W> {
    pub(crate) const fn new(sink: W) -> Self {
        Self { sink }
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn present(&mut self, observation: &Observation, _raw: &[u8], _context: &PresentContext) -> io::Result<()> {
        serde_json::to_writer(&mut self.sink, observation.fields())?;
        self.sink.write_all(b"\n")
    }

    fn finish(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn observation(value: Value) -> Observation {
        let Value::Object(fields) = value else {
            panic!("observation must be an object");
        };
        Observation::from_fields(fields).expect("well-typed fields")
    }

    #[test]
    fn objects_are_written_compactly_in_server_order() {
        let mut presenter = JsonPresenter::new(Vec::new());
        let context = PresentContext {
            produced: 0,
            output_cap: None,
        };
        let first = observation(json!({"rrname": "b.example.", "rrtype": "A", "count": 2}));
        let second = observation(Value::Object(Map::new()));

        presenter.present(&first, b"", &context).expect("write");
        presenter.present(&second, b"", &context).expect("write");
        presenter.finish().expect("flush");

        let written = String::from_utf8(presenter.sink).expect("utf8");
        assert_eq!(written, "{\"rrname\":\"b.example.\",\"rrtype\":\"A\",\"count\":2}\n{}\n");
    }
}
