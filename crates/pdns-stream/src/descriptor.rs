//! Validated description of one flex search.

use std::fmt;

/// How the search value is interpreted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMethod {
    /// Extended regular expression.
    Regex,
    /// Shell-style glob.
    Glob,
}

impl SearchMethod {
    /// Path segment naming the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Glob => "glob",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Which side of the observation the search value is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchTarget {
    /// Owner names.
    #[default]
    RrNames,
    /// Record data.
    Rdata,
}

impl SearchTarget {
    /// Path segment naming the target.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RrNames => "rrnames",
            Self::Rdata => "rdata",
        }
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Shape of the returned observations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnMode {
    /// Name or data plus rrtype only.
    #[default]
    Terse,
}

/// Immutable description of a search, built once from validated input.
///
/// Timestamps are seconds since the Unix epoch. `None` means the bound or
/// limit was not requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Regex or glob.
    pub method: SearchMethod,
    /// Owner names or record data.
    pub target: SearchTarget,
    /// Shape of the returned observations.
    pub mode: ReturnMode,
    /// The expression to search for, unescaped.
    pub value: String,
    /// Optional expression whose matches are removed from the results.
    pub exclude: Option<String>,
    /// Optional rrtype filter, unescaped.
    pub rrtype: Option<String>,
    /// Fence start.
    pub after: Option<u64>,
    /// Fence end.
    pub before: Option<u64>,
    /// Strict containment instead of overlap.
    pub complete: bool,
    /// Server-side result limit.
    pub query_limit: Option<u64>,
    /// Client-side output cap.
    pub output_limit: Option<u64>,
    /// Number of results the server skips.
    pub offset: u64,
}

impl QueryDescriptor {
    /// Creates a descriptor with every optional field unset.
    #[must_use]
    pub fn new(method: SearchMethod, target: SearchTarget, value: impl Into<String>) -> Self {
        Self {
            method,
            target,
            mode: ReturnMode::default(),
            value: value.into(),
            exclude: None,
            rrtype: None,
            after: None,
            before: None,
            complete: false,
            query_limit: None,
            output_limit: None,
            offset: 0,
        }
    }
}
