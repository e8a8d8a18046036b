//! DNSDB API v2 flavour of [`ApiSystem`].

use pdns_config::ServerUrl;
use pdns_stream::{ApiSystem, QueryDescriptor, RequestError, TimeFence};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderValue};

/// Name accepted by `-u`.
pub(crate) const SYSTEM_NAME: &str = "dnsdb2";
/// Header carrying the API key.
pub(crate) const API_KEY_HEADER: &str = "x-api-key";
/// Reported to the server as `swclient`.
pub(crate) const SWCLIENT: &str = "pdnsflex";

/// Everything except ALPHA / DIGIT / `-._~` is escaped in path segments.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Builds the `{method}/{target}/{value}[/{rrtype}]` search path.
pub(crate) fn search_path(descriptor: &QueryDescriptor) -> String {
    let value = utf8_percent_encode(&descriptor.value, PATH_SEGMENT);
    let mut path = format!("{}/{}/{value}", descriptor.method, descriptor.target);
    if let Some(rrtype) = descriptor.rrtype.as_deref() {
        path.push('/');
        path.extend(utf8_percent_encode(rrtype, PATH_SEGMENT));
    }
    path
}

pub(crate) struct Dnsdb {
    server: ServerUrl,
    api_key: String,
    version: &'static str,
}

impl Dnsdb {
    pub(crate) fn new(server: ServerUrl, api_key: impl Into<String>, version: &'static str) -> Self {
        Self {
            server,
            api_key: api_key.into(),
            version,
        }
    }
}

impl ApiSystem for Dnsdb {
    fn name(&self) -> &'static str {
        SYSTEM_NAME
    }

    fn url(&self, path: &str, descriptor: &QueryDescriptor, fence: &TimeFence) -> Result<Url, RequestError> {
        let text = self.server.with_path(path);
        let mut url = Url::parse(&text).map_err(|source| RequestError::Url { url: text, source })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("swclient", SWCLIENT);
            pairs.append_pair("version", self.version);
            if descriptor.offset > 0 {
                pairs.append_pair("offset", &descriptor.offset.to_string());
            }
            if let Some(limit) = descriptor.query_limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            let bounds = [
                ("time_first_after", fence.first_after),
                ("time_first_before", fence.first_before),
                ("time_last_after", fence.last_after),
                ("time_last_before", fence.last_before),
            ];
            for (name, value) in bounds {
                if let Some(value) = value {
                    pairs.append_pair(name, &value.to_string());
                }
            }
            if let Some(exclude) = descriptor.exclude.as_deref() {
                pairs.append_pair("exclude", exclude);
            }
        }
        Ok(url)
    }

    fn authenticate(&self, headers: &mut HeaderMap) -> Result<(), RequestError> {
        let mut value = HeaderValue::from_str(&self.api_key).map_err(|source| RequestError::Header {
            name: API_KEY_HEADER,
            source,
        })?;
        value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, value);
        Ok(())
    }
}
