use reqwest::Url;
use reqwest::header::HeaderMap;

use crate::deblock::Deblocker;

/// One network transfer belonging to a query.
///
/// The fetch owns its receive buffer. It is only ever reachable through
/// its query, so detaching it from the query and releasing it are the same
/// step.
#[derive(Debug)]
pub struct Fetch {
    url: Url,
    headers: HeaderMap,
    pub(super) deblocker: Deblocker,
    pub(super) response_code: Option<u16>,
    pub(super) stopped: bool,
}

impl Fetch {
    /// Creates a fetch that has not started yet.
    #[must_use]
    pub fn new(url: Url, headers: HeaderMap) -> Self {
        Self {
            url,
            headers,
            deblocker: Deblocker::new(),
            response_code: None,
            stopped: false,
        }
    }

    /// Request URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers, including authentication.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// HTTP status of the response, once known.
    #[must_use]
    pub const fn response_code(&self) -> Option<u16> {
        self.response_code
    }

    /// True when the client ended the transfer on purpose.
    #[must_use]
    pub const fn stopped(&self) -> bool {
        self.stopped
    }

    pub(super) fn is_success(&self) -> bool {
        self.response_code
            .is_some_and(|code| (200..300).contains(&code))
    }
}
