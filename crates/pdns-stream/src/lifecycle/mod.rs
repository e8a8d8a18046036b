//! Ownership graph for a running search.
//!
//! A [`Writer`] owns one [`Query`], which owns at most one [`Fetch`]. The
//! fetch is reachable only through its query, so the two can never
//! disagree about whether they are linked, and releasing the fetch is a
//! `take` on the query's slot. Teardown is idempotent and also runs when a
//! writer is dropped.

mod fetch;
mod query;
mod writer;

pub use fetch::Fetch;
pub use query::{NO_RESULTS_MESSAGE, Query, QueryReport, QueryStatus, STATUS_ERROR, STATUS_NOERROR};
pub use writer::{Flow, Writer};
