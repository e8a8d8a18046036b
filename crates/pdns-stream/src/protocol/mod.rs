//! SAF record decoding.
//!
//! Each deblocked line is a JSON object of the shape
//! `{"cond"?: string, "msg"?: string, "obj"?: {...}}`. The [`Decoder`]
//! turns lines into [`Record`]s, drives the query's [`ProtocolState`], and
//! hands back the observations that should reach the presenter. Malformed
//! lines are reported and skipped; they never end the stream.

mod state;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace, warn};

pub use state::{Cond, ProtocolState, Transition, transition};

/// Raised when a line cannot be decoded into a [`Record`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line is not JSON.
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    /// The line is JSON but not an object.
    #[error("record must be a JSON object")]
    NotAnObject,
    /// A known field carries a value of the wrong type.
    #[error("{field} must be {expected}")]
    WrongType {
        /// Offending field name.
        field: &'static str,
        /// Human description of the required type.
        expected: &'static str,
    },
}

/// One decoded line of the result stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Stream condition, if present.
    pub cond: Option<Cond>,
    /// Server-supplied message, if present.
    pub msg: Option<String>,
    /// Data payload, if present.
    pub obj: Option<Observation>,
}

impl Record {
    /// Decodes one line, without its trailing newline.
    pub fn decode(line: &[u8]) -> Result<Self, ProtocolError> {
        let Value::Object(envelope) = serde_json::from_slice::<Value>(line)? else {
            return Err(ProtocolError::NotAnObject);
        };
        let cond = string_field(&envelope, "cond")?.map(|value| Cond::parse(&value));
        let msg = string_field(&envelope, "msg")?;
        let obj = match envelope.get("obj") {
            None => None,
            Some(Value::Object(fields)) => Some(Observation::from_fields(fields.clone())?),
            Some(_) => {
                return Err(ProtocolError::WrongType {
                    field: "obj",
                    expected: "an object",
                });
            }
        };
        Ok(Self { cond, msg, obj })
    }
}

/// A single passive-DNS observation carried in `obj`.
///
/// Typed accessors cover the fields the client understands; the full
/// object is retained, in server order, for presenters that echo it.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Owner name, for rrnames searches.
    pub rrname: Option<String>,
    /// Presentation-form record data, for rdata searches.
    pub rdata: Option<String>,
    /// Hex-encoded record data when no presentation form exists.
    pub raw_rdata: Option<String>,
    /// Resource record type.
    pub rrtype: Option<String>,
    /// Number of times the observation was seen.
    pub count: Option<u64>,
    /// First time seen, seconds since the epoch.
    pub time_first: Option<u64>,
    /// Last time seen, seconds since the epoch.
    pub time_last: Option<u64>,
    fields: Map<String, Value>,
}

impl Observation {
    /// Builds an observation from the `obj` member of a record.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, ProtocolError> {
        Ok(Self {
            rrname: string_field(&fields, "rrname")?,
            rdata: string_field(&fields, "rdata")?,
            raw_rdata: string_field(&fields, "raw_rdata")?,
            rrtype: string_field(&fields, "rrtype")?,
            count: integer_field(&fields, "count")?,
            time_first: integer_field(&fields, "time_first")?,
            time_last: integer_field(&fields, "time_last")?,
            fields,
        })
    }

    /// The object exactly as the server sent it.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

fn string_field(map: &Map<String, Value>, field: &'static str) -> Result<Option<String>, ProtocolError> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ProtocolError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

fn integer_field(map: &Map<String, Value>, field: &'static str) -> Result<Option<u64>, ProtocolError> {
    match map.get(field) {
        None => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or(ProtocolError::WrongType {
            field,
            expected: "a non-negative integer",
        }),
    }
}

/// Protocol side of one query: its state, the last server message, and a
/// count of lines that failed to decode.
#[derive(Debug, Default)]
pub struct Decoder {
    state: ProtocolState,
    server_message: Option<String>,
    rejected: u64,
}

impl Decoder {
    /// Creates a decoder in the `init` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current protocol state.
    #[must_use]
    pub const fn state(&self) -> ProtocolState {
        self.state
    }

    /// Most recent `msg` value sent by the server.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    /// Number of lines dropped because they failed to decode.
    #[must_use]
    pub const fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Feeds one line and returns the observation to forward, if any.
    pub fn feed(&mut self, line: &[u8]) -> Option<Observation> {
        if line.iter().all(u8::is_ascii_whitespace) {
            trace!("skipping blank line");
            return None;
        }
        let record = match Record::decode(line) {
            Ok(record) => record,
            Err(error) => {
                self.rejected += 1;
                warn!(%error, octets = line.len(), "dropping undecodable record");
                return None;
            }
        };

        if let Some(msg) = record.msg {
            debug!(msg = %msg, "server message");
            self.server_message = Some(msg);
        }
        if let Some(Cond::Unknown(value)) = &record.cond {
            warn!(cond = %value, "unknown value for \"cond\"");
        }

        let next = transition(self.state, record.cond.as_ref(), record.obj.is_some());
        if next.state != self.state {
            debug!(from = %self.state, to = %next.state, "protocol state change");
            self.state = next.state;
        }
        if next.forward { record.obj } else { None }
    }

    /// Records that the client stopped the stream at its output cap.
    ///
    /// A terminal condition already sent by the server is kept.
    pub fn self_limit(&mut self) {
        if !self.state.is_terminal() {
            self.state = ProtocolState::SelfLimited;
        }
    }

    /// Records that a clean stream ended without a terminal condition.
    pub fn mark_missing(&mut self) {
        if !self.state.is_terminal() {
            self.state = ProtocolState::Missing;
        }
    }
}
