//! Validation of query options into a [`SearchPlan`].
//!
//! Checks run in the order an operator would expect to hear about them:
//! per-option problems first, then the cross-option rules.

use pdns_stream::{QueryDescriptor, ReturnMode, SearchMethod, SearchTarget};
use time::OffsetDateTime;

use crate::cli::Cli;
use crate::dnsdb;
use crate::errors::AppError;
use crate::output::Presentation;
use crate::timestamp;

/// Longest accepted search or exclusion expression, in bytes.
pub(crate) const MAX_VALUE_LEN: usize = 4096;

const NOT_PRINTABLE: &str = "expression argument is not printable ASCII.\n\
    Use \\DDD to encode non-printable characters, where DDD is the decimal value of the character";
const RDATA_GLOB_ENDING: &str = "a glob search argument for rdata should end either in a period,\n\
    a double quote, or certain glob special characters (*, ?, or ]).";
const RRNAMES_GLOB_ENDING: &str = "a glob search argument for rrnames should end either in a period\n\
    or certain glob special characters (*, ?, or ]).";

/// Everything the runner needs to issue one search.
#[derive(Debug)]
pub(crate) struct SearchPlan {
    pub(crate) descriptor: QueryDescriptor,
    pub(crate) presentation: Presentation,
    /// Non-fatal complaints to show unless `-q` was given.
    pub(crate) warnings: Vec<String>,
}

pub(crate) fn plan(cli: &Cli, now: OffsetDateTime) -> Result<SearchPlan, AppError> {
    let (method, value) = search_expression(cli)?;
    let exclude = cli
        .exclude
        .as_deref()
        .map(|exclude| expression("--exclude", exclude))
        .transpose()?;
    let mode = cli.mode.as_deref().map(return_mode).transpose()?.unwrap_or_default();
    let after = cli.after.as_deref().map(|text| time_bound("-A", text, now)).transpose()?;
    let before = cli.before.as_deref().map(|text| time_bound("-B", text, now)).transpose()?;
    let query_limit = cli
        .query_limit
        .as_deref()
        .map(|text| limit(text, 0, "-l must be zero or positive"))
        .transpose()?;
    let output_limit = cli
        .output_limit
        .as_deref()
        .map(|text| limit(text, 1, "-L must be positive"))
        .transpose()?;
    let offset = cli
        .offset
        .as_deref()
        .map(|text| limit(text, 0, "-O must be zero or positive"))
        .transpose()?
        .unwrap_or(0);
    let target = cli.search.as_deref().map(search_target).transpose()?.unwrap_or_default();
    if let Some(system) = cli.system.as_deref() {
        if system != dnsdb::SYSTEM_NAME {
            return Err(AppError::usage("-u must refer to a pdns system"));
        }
    }

    let Some(value) = value else {
        return Err(AppError::usage(
            "Need to provide a --regex or --glob option and its argument",
        ));
    };

    let mut warnings = Vec::new();
    if method == SearchMethod::Glob {
        if let Some(complaint) = glob_ending(&value, target) {
            if !cli.force {
                return Err(AppError::UnhelpfulGlob(complaint));
            }
            warnings.push(format!(
                "Warning: {complaint}\nYou may not get results from your search."
            ));
        }
    } else if cli.force {
        return Err(AppError::usage("--force only makes sense with a glob query"));
    }

    if !cli.force {
        let printable = |text: &str| text.bytes().all(|byte| (0x20..=0x7e).contains(&byte));
        if !printable(&value) || exclude.as_deref().is_some_and(|text| !printable(text)) {
            return Err(AppError::usage(NOT_PRINTABLE));
        }
    }

    if let (Some(after), Some(before)) = (after, before) {
        if after > before {
            return Err(AppError::usage("-A value must be before -B value (for now)"));
        }
    }
    if cli.complete && after.is_none() && before.is_none() {
        return Err(AppError::usage("-c without -A or -B makes no sense."));
    }

    let mut descriptor = QueryDescriptor::new(method, target, value);
    descriptor.mode = mode;
    descriptor.exclude = exclude;
    descriptor.rrtype.clone_from(&cli.rrtype);
    descriptor.after = after;
    descriptor.before = before;
    descriptor.complete = cli.complete;
    descriptor.query_limit = query_limit;
    descriptor.output_limit = output_limit.or(query_limit);
    descriptor.offset = offset;

    Ok(SearchPlan {
        descriptor,
        presentation: Presentation::from_flags(cli.batch, cli.batch_dedup),
        warnings,
    })
}

fn search_expression(cli: &Cli) -> Result<(SearchMethod, Option<String>), AppError> {
    let regex = cli
        .regex
        .as_deref()
        .map(|value| expression("--regex", value))
        .transpose()?;
    let glob = cli
        .glob
        .as_deref()
        .map(|value| expression("--glob", value))
        .transpose()?;
    match (regex, glob) {
        (Some(_), Some(_)) => Err(AppError::usage(
            "Cannot specify --glob or --regex more than once",
        )),
        (Some(regex), None) => Ok((SearchMethod::Regex, Some(regex))),
        (None, glob) => Ok((SearchMethod::Glob, glob)),
    }
}

fn expression(flag: &str, value: &str) -> Result<String, AppError> {
    if value.is_empty() {
        return Err(AppError::usage(format!(
            "The {flag} option requires a non-empty argument"
        )));
    }
    if value.len() > MAX_VALUE_LEN {
        return Err(AppError::usage(format!(
            "The {flag} option is too long ({MAX_VALUE_LEN} is the maximum length)"
        )));
    }
    Ok(value.to_owned())
}

fn return_mode(text: &str) -> Result<ReturnMode, AppError> {
    match text {
        "" => Err(AppError::usage("The --mode option requires a non-empty argument")),
        "terse" | "t" => Ok(ReturnMode::Terse),
        _ => Err(AppError::usage("Illegal mode value, must be 'terse'|'t'")),
    }
}

fn search_target(text: &str) -> Result<SearchTarget, AppError> {
    match text {
        "rrnames" | "n" => Ok(SearchTarget::RrNames),
        "rdata" | "d" => Ok(SearchTarget::Rdata),
        _ => Err(AppError::usage(
            "Illegal what to search, must be 'rrnames'|'n' or 'rdata'|'d'",
        )),
    }
}

fn time_bound(flag: &str, text: &str, now: OffsetDateTime) -> Result<u64, AppError> {
    timestamp::parse(text, now).ok_or_else(|| AppError::usage(format!("bad {flag} timestamp")))
}

fn limit(text: &str, minimum: i64, complaint: &str) -> Result<u64, AppError> {
    text.trim()
        .parse::<i64>()
        .ok()
        .filter(|value| *value >= minimum)
        .and_then(|value| u64::try_from(value).ok())
        .ok_or_else(|| AppError::usage(complaint))
}

/// Returns why a glob is unlikely to match, if it is.
fn glob_ending(value: &str, target: SearchTarget) -> Option<&'static str> {
    match (value.chars().last()?, target) {
        ('*' | '?' | ']' | '.', _) | ('"', SearchTarget::Rdata) => None,
        (_, SearchTarget::Rdata) => Some(RDATA_GLOB_ENDING),
        (_, SearchTarget::RrNames) => Some(RRNAMES_GLOB_ENDING),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-03-01 00:00:00 UTC);

    fn plan_for(args: &[&str]) -> Result<SearchPlan, AppError> {
        let cli = Cli::try_parse_from(std::iter::once("pdnsflex").chain(args.iter().copied()))
            .expect("arguments parse");
        plan(&cli, NOW)
    }

    fn usage_message(args: &[&str]) -> String {
        match plan_for(args) {
            Err(AppError::Usage(message)) => message,
            other => panic!("expected a usage error, got {other:?}"),
        }
    }

    #[test]
    fn glob_search_builds_descriptor() {
        let plan = plan_for(&["--glob", "*.example.com.", "-t", "A", "-l", "5", "-O", "2"])
            .expect("valid plan");
        let descriptor = plan.descriptor;
        assert_eq!(descriptor.method, SearchMethod::Glob);
        assert_eq!(descriptor.target, SearchTarget::RrNames);
        assert_eq!(descriptor.rrtype.as_deref(), Some("A"));
        assert_eq!(descriptor.query_limit, Some(5));
        assert_eq!(descriptor.output_limit, Some(5), "output cap follows -l");
        assert_eq!(descriptor.offset, 2);
        assert_eq!(plan.presentation, Presentation::Json);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn explicit_output_limit_wins() {
        let plan = plan_for(&["--regex", "^www", "-l", "100", "-L", "3"]).expect("valid plan");
        assert_eq!(plan.descriptor.output_limit, Some(3));
    }

    #[rstest]
    #[case(&["-s", "n"], "Need to provide a --regex or --glob option and its argument")]
    #[case(&["--regex", "a", "--glob", "b."], "Cannot specify --glob or --regex more than once")]
    #[case(&["--glob", ""], "The --glob option requires a non-empty argument")]
    #[case(&["--regex", "x", "--force"], "--force only makes sense with a glob query")]
    #[case(&["--regex", "x", "-l", "-1"], "-l must be zero or positive")]
    #[case(&["--regex", "x", "-L", "0"], "-L must be positive")]
    #[case(&["--regex", "x", "-O", "many"], "-O must be zero or positive")]
    #[case(&["--regex", "x", "-A", "0"], "bad -A timestamp")]
    #[case(&["--regex", "x", "-s", "both"], "Illegal what to search, must be 'rrnames'|'n' or 'rdata'|'d'")]
    #[case(&["--regex", "x", "--mode", "full"], "Illegal mode value, must be 'terse'|'t'")]
    #[case(&["--regex", "x", "-u", "circl"], "-u must refer to a pdns system")]
    #[case(&["--regex", "x", "-c"], "-c without -A or -B makes no sense.")]
    #[case(
        &["--regex", "x", "-A", "2024-02-01", "-B", "2024-01-01"],
        "-A value must be before -B value (for now)"
    )]
    fn invalid_options_are_usage_errors(#[case] args: &[&str], #[case] expected: &str) {
        assert_eq!(usage_message(args), expected);
    }

    #[test]
    fn overlong_expression_is_rejected() {
        let long = "a".repeat(MAX_VALUE_LEN + 1);
        let message = usage_message(&["--regex", &long]);
        assert_eq!(message, "The --regex option is too long (4096 is the maximum length)");
    }

    #[test]
    fn control_characters_need_force() {
        assert_eq!(usage_message(&["--regex", "a\tb"]), NOT_PRINTABLE);
        assert_eq!(usage_message(&["--regex", "ok", "--exclude", "a\u{7f}"]), NOT_PRINTABLE);
        assert!(plan_for(&["--glob", "a\tb.", "--force"]).is_ok());
    }

    #[test]
    fn unhelpful_glob_is_fatal_without_force() {
        let error = plan_for(&["--glob", "example"]).expect_err("bad ending");
        assert!(matches!(error, AppError::UnhelpfulGlob(RRNAMES_GLOB_ENDING)));
    }

    #[test]
    fn unhelpful_glob_is_a_warning_with_force() {
        let plan = plan_for(&["--glob", "example", "--force", "-s", "d"]).expect("forced");
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].starts_with("Warning: a glob search argument for rdata"));
    }

    #[rstest]
    #[case("*.example.", SearchTarget::RrNames, true)]
    #[case("www.example.co?", SearchTarget::RrNames, true)]
    #[case("\"v=spf1*", SearchTarget::Rdata, true)]
    #[case("\"text\"", SearchTarget::Rdata, true)]
    #[case("\"text\"", SearchTarget::RrNames, false)]
    #[case("example.com", SearchTarget::Rdata, false)]
    fn glob_endings(#[case] value: &str, #[case] target: SearchTarget, #[case] useful: bool) {
        assert_eq!(glob_ending(value, target).is_none(), useful);
    }

    #[test]
    fn complete_with_bounds_is_kept() {
        let plan = plan_for(&["--glob", "x.", "-A", "2024-01-01", "-c"]).expect("valid plan");
        assert!(plan.descriptor.complete);
        assert_eq!(plan.descriptor.after, Some(1_704_067_200));
    }
}
