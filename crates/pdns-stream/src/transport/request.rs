//! Request construction seam.

use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, InvalidHeaderValue};
use thiserror::Error;
use tracing::debug;

use crate::descriptor::QueryDescriptor;
use crate::fence::{FenceError, TimeFence};
use crate::lifecycle::Fetch;

/// Media type requested for streamed results.
pub const NDJSON: &str = "application/x-ndjson";

/// Errors raised while building a request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The time fence is unusable.
    #[error(transparent)]
    Fence(#[from] FenceError),
    /// The URL could not be assembled.
    #[error("invalid request URL '{url}'")]
    Url {
        /// The text that failed to parse.
        url: String,
        /// Parser diagnostic.
        #[source]
        source: url::ParseError,
    },
    /// A header value contained forbidden characters.
    #[error("invalid value for header {name}")]
    Header {
        /// Header name.
        name: &'static str,
        /// Validation failure.
        #[source]
        source: InvalidHeaderValue,
    },
}

/// An API flavour: knows how to address a search and how to authenticate.
pub trait ApiSystem {
    /// Short name of the system, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Builds the full URL for `path` with the descriptor's parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Url`] when the result is not a valid URL.
    fn url(&self, path: &str, descriptor: &QueryDescriptor, fence: &TimeFence) -> Result<Url, RequestError>;

    /// Adds authentication material to the request headers.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Header`] when the credentials cannot be
    /// carried in a header.
    fn authenticate(&self, headers: &mut HeaderMap) -> Result<(), RequestError>;
}

/// Builds the fetch for one search: URL, `Accept` header, and credentials.
pub fn prepare(
    system: &dyn ApiSystem,
    path: &str,
    descriptor: &QueryDescriptor,
) -> Result<Fetch, RequestError> {
    let fence = TimeFence::for_descriptor(descriptor)?;
    let url = system.url(path, descriptor, &fence)?;
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(NDJSON));
    system.authenticate(&mut headers)?;
    debug!(system = system.name(), url = %url, "prepared fetch");
    Ok(Fetch::new(url, headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{SearchMethod, SearchTarget};

    struct Plain;

    impl ApiSystem for Plain {
        fn name(&self) -> &'static str {
            "plain"
        }

        fn url(&self, path: &str, _: &QueryDescriptor, fence: &TimeFence) -> Result<Url, RequestError> {
            let text = format!("http://localhost/{path}");
            let mut url = Url::parse(&text).map_err(|source| RequestError::Url { url: text, source })?;
            if let Some(after) = fence.last_after {
                url.query_pairs_mut()
                    .append_pair("time_last_after", &after.to_string());
            }
            Ok(url)
        }

        fn authenticate(&self, headers: &mut HeaderMap) -> Result<(), RequestError> {
            headers.insert("x-api-key", HeaderValue::from_static("k"));
            Ok(())
        }
    }

    #[test]
    fn prepare_sets_accept_and_credentials() {
        let mut descriptor = QueryDescriptor::new(SearchMethod::Glob, SearchTarget::RrNames, "*.a.");
        descriptor.after = Some(10);
        let fetch = prepare(&Plain, "glob/rrnames/*.a.", &descriptor).expect("prepared");
        assert_eq!(fetch.url().as_str(), "http://localhost/glob/rrnames/*.a.?time_last_after=10");
        assert_eq!(fetch.headers().get(ACCEPT).map(HeaderValue::as_bytes), Some(NDJSON.as_bytes()));
        assert!(fetch.headers().contains_key("x-api-key"));
    }

    #[test]
    fn prepare_rejects_inverted_fence() {
        let mut descriptor = QueryDescriptor::new(SearchMethod::Regex, SearchTarget::Rdata, "x");
        descriptor.after = Some(20);
        descriptor.before = Some(10);
        let error = prepare(&Plain, "regex/rdata/x", &descriptor).expect_err("inverted");
        assert!(matches!(error, RequestError::Fence(FenceError::Inverted { .. })));
    }
}
