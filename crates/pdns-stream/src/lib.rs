//! Streaming engine for passive-DNS flex searches.
//!
//! A search is described by a [`QueryDescriptor`], addressed through an
//! [`ApiSystem`], and run by a [`Multiplexer`] obtained from a
//! [`Transport`]. Response bytes are reassembled into lines by a
//! [`Deblocker`], decoded as SAF records by a [`Decoder`], capped by an
//! [`OutputGovernor`], and handed to a [`Presenter`].
//!
//! Everything runs on one thread. The only suspension point is the
//! multiplexer waiting for network progress.

pub mod deblock;
pub mod descriptor;
pub mod fence;
pub mod governor;
pub mod lifecycle;
pub mod presenter;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod tests;

pub use deblock::Deblocker;
pub use descriptor::{QueryDescriptor, ReturnMode, SearchMethod, SearchTarget};
pub use fence::{FenceError, TimeFence};
pub use governor::OutputGovernor;
pub use lifecycle::{Fetch, Flow, Query, QueryReport, QueryStatus, Writer};
pub use presenter::{PresentContext, Presenter};
pub use protocol::{Cond, Decoder, Observation, ProtocolError, ProtocolState, Record};
pub use transport::{
    ApiSystem, IpFamily, Multiplexer, RequestError, Transport, TransportError, TransportSettings,
};
