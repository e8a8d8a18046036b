//! Command-line interface definition for `pdnsflex`.
//!
//! Only query options live here. Configuration flags such as `--server`
//! are split off before parsing and handed to the configuration loader.

use clap::{ArgAction, Parser};

/// Command-line interface for the passive-DNS flex search client.
#[derive(Parser, Debug, Default)]
#[command(
    name = "pdnsflex",
    about = "Search a passive-DNS store by regular expression or glob",
    disable_version_flag = true,
    after_help = "for -A and -B, use absolute format YYYY-MM-DD[ HH:MM:SS],\n\
                  or relative format %dw%dd%dh%dm%ds."
)]
pub(crate) struct Cli {
    /// Search using an extended regular expression.
    #[arg(long, value_name = "REGEX")]
    pub(crate) regex: Option<String>,
    /// Search using a glob.
    #[arg(long, value_name = "GLOB")]
    pub(crate) glob: Option<String>,
    /// Remove matches of this expression from the results.
    #[arg(long, value_name = "GLOB|REGEX")]
    pub(crate) exclude: Option<String>,
    /// Issue possibly invalid or non-useful glob queries.
    #[arg(long)]
    pub(crate) force: bool,
    /// Shape of returned observations (terse|t).
    #[arg(long, value_name = "MODE")]
    pub(crate) mode: Option<String>,
    /// What to search (rrnames|n or rdata|d).
    #[arg(short = 's', value_name = "WHAT")]
    pub(crate) search: Option<String>,
    /// Restrict results to this rrtype.
    #[arg(short = 't', value_name = "RRTYPE")]
    pub(crate) rrtype: Option<String>,
    /// Only observations after this time.
    #[arg(short = 'A', value_name = "TIME", allow_hyphen_values = true)]
    pub(crate) after: Option<String>,
    /// Only observations before this time.
    #[arg(short = 'B', value_name = "TIME", allow_hyphen_values = true)]
    pub(crate) before: Option<String>,
    /// Complete (strict) time matching for -A and -B.
    #[arg(short = 'c')]
    pub(crate) complete: bool,
    /// Server-side result limit.
    #[arg(short = 'l', value_name = "QUERY-LIMIT", allow_hyphen_values = true)]
    pub(crate) query_limit: Option<String>,
    /// Stop after this many records have been printed.
    #[arg(short = 'L', value_name = "OUTPUT-LIMIT", allow_hyphen_values = true)]
    pub(crate) output_limit: Option<String>,
    /// Skip this many results.
    #[arg(short = 'O', value_name = "OFFSET", allow_hyphen_values = true)]
    pub(crate) offset: Option<String>,
    /// Emit one JSON object per line (default).
    #[arg(short = 'j', overrides_with_all = ["batch", "batch_dedup"])]
    pub(crate) json: bool,
    /// Emit batch-mode lines.
    #[arg(short = 'F', overrides_with_all = ["json", "batch_dedup"])]
    pub(crate) batch: bool,
    /// Emit batch-mode lines with deduplicated rrtypes.
    #[arg(short = 'T', overrides_with_all = ["json", "batch"])]
    pub(crate) batch_dedup: bool,
    /// Passive-DNS system to query.
    #[arg(short = 'u', value_name = "SYSTEM")]
    pub(crate) system: Option<String>,
    /// Turn off TLS certificate verification.
    #[arg(short = 'U')]
    pub(crate) insecure: bool,
    /// Connect over IPv4 only.
    #[arg(short = '4', overrides_with = "ipv6")]
    pub(crate) ipv4: bool,
    /// Connect over IPv6 only.
    #[arg(short = '6', overrides_with = "ipv4")]
    pub(crate) ipv6: bool,
    /// Suppress warnings.
    #[arg(short = 'q')]
    pub(crate) quiet: bool,
    /// Increase diagnostic output; repeatable.
    #[arg(short = 'd', action = ArgAction::Count)]
    pub(crate) debug: u8,
    /// Show the program version.
    #[arg(short = 'v')]
    pub(crate) version: bool,
}

impl Cli {
    /// Log filter implied by `-q` and `-d`, if either was given.
    pub(crate) fn log_filter_override(&self) -> Option<&'static str> {
        match (self.quiet, self.debug) {
            (_, 2..) => Some("trace"),
            (_, 1) => Some("debug"),
            (true, 0) => Some("error"),
            (false, 0) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pdnsflex").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn last_presentation_flag_wins() {
        let cli = parse(&["--glob", "*.example.", "-F", "-j"]);
        assert!(cli.json);
        assert!(!cli.batch);
    }

    #[test]
    fn negative_limits_reach_validation() {
        let cli = parse(&["--glob", "x.", "-l", "-1"]);
        assert_eq!(cli.query_limit.as_deref(), Some("-1"));
    }

    #[rstest]
    #[case(&[], None)]
    #[case(&["-q"], Some("error"))]
    #[case(&["-d"], Some("debug"))]
    #[case(&["-q", "-dd"], Some("trace"))]
    fn verbosity_maps_to_filters(#[case] flags: &[&str], #[case] expected: Option<&str>) {
        assert_eq!(parse(flags).log_filter_override(), expected);
    }

    #[test]
    fn positional_arguments_are_rejected() {
        let result = Cli::try_parse_from(["pdnsflex", "--glob", "x.", "stray"]);
        assert!(result.is_err());
    }
}
