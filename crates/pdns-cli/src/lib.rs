//! Command-line runtime for `pdnsflex`, a passive-DNS flex search client.
//!
//! The runner parses and validates query options, loads layered
//! configuration, and drives one streamed search through the
//! `pdns-stream` engine, rendering observations on stdout and per-query
//! summaries on stderr. Configuration loading and the IO streams can be
//! substituted so tests exercise the whole path in-process.

use std::error::Error as _;
use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use pdns_stream::transport::prepare;
use pdns_stream::{IpFamily, Query, QueryReport, Transport, TransportError, TransportSettings, Writer};
use time::OffsetDateTime;
use tracing::debug;

mod cli;
mod config;
mod dnsdb;
mod errors;
mod output;
mod search;
mod telemetry;
mod timestamp;

use cli::Cli;
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use dnsdb::Dnsdb;
pub(crate) use errors::AppError;
use search::SearchPlan;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `pdns_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--server",
    "--log-filter",
    "--log-format",
    "--timeout-secs",
];
/// Query options whose value may be given as the next argument.
const VALUE_LONG_FLAGS: &[&str] = &["regex", "glob", "exclude", "mode"];
const VALUE_SHORT_FLAGS: &[char] = &['A', 'B', 'l', 'L', 'O', 's', 't', 'u'];

const PROGRAM: &str = "pdnsflex";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        match self.execute(&args) {
            Ok(exit_code) => exit_code,
            Err(AppError::CliUsage(error)) if !error.use_stderr() => {
                let _ = write!(self.io.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(AppError::CliUsage(error)) => {
                let _ = write!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
            Err(error) if error.is_usage() => {
                let _ = writeln!(
                    self.io.stderr,
                    "error: {error}\n\ntry   {PROGRAM} -h   for a short description of program usage."
                );
                ExitCode::FAILURE
            }
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, args: &[OsString]) -> Result<ExitCode, AppError> {
        let split = split_config_arguments(args);
        let cli = Cli::try_parse_from(split.cli_arguments.iter().cloned()).map_err(AppError::CliUsage)?;
        if cli.version {
            writeln!(self.io.stdout, "{PROGRAM}: version {VERSION}").map_err(AppError::Output)?;
            return Ok(ExitCode::SUCCESS);
        }

        let plan = search::plan(&cli, OffsetDateTime::now_utc())?;
        if !cli.quiet {
            for warning in &plan.warnings {
                writeln!(self.io.stderr, "{warning}").map_err(AppError::Output)?;
            }
        }

        let mut config = self.loader.load(&split.config_arguments)?;
        if let Some(filter) = cli.log_filter_override() {
            filter.clone_into(&mut config.log_filter);
        }
        telemetry::initialise(&config)?;
        debug!(descriptor = ?plan.descriptor, presentation = ?plan.presentation, "query options");

        let system = Dnsdb::new(config.server_url()?, config.credentials()?, VERSION);
        let settings = TransportSettings {
            insecure: cli.insecure,
            ip_family: ip_family(&cli),
            timeout: config.timeout(),
        };
        self.search(&system, &settings, plan, cli.quiet)
    }

    fn search(
        &mut self,
        system: &Dnsdb,
        settings: &TransportSettings,
        plan: SearchPlan,
        quiet: bool,
    ) -> Result<ExitCode, AppError> {
        let SearchPlan {
            descriptor,
            presentation,
            ..
        } = plan;
        let path = dnsdb::search_path(&descriptor);
        let fetch = prepare(system, &path, &descriptor)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(AppError::Runtime)?;
        let transport = Transport::init(settings)?;

        let (reports, mut failures) = {
            let presenter = output::presenter_for(presentation, &mut *self.io.stdout);
            let writer = Writer::new(Query::new(descriptor, path, fetch), presenter);
            let mut multiplexer = transport.multiplexer();
            multiplexer.launch(writer);
            runtime.block_on(multiplexer.run(0));
            let (writers, failures) = multiplexer.into_parts();
            let reports: Vec<Result<QueryReport, TransportError>> =
                writers.into_iter().map(Writer::finish).collect();
            (reports, failures)
        };
        transport.shutdown();

        for report in reports {
            match report {
                Ok(report) => {
                    if quiet {
                        continue;
                    }
                    if let Some(summary) = report.summary() {
                        writeln!(self.io.stderr, "{summary}").map_err(AppError::Output)?;
                    }
                }
                Err(error) => failures.push(error),
            }
        }
        for failure in &failures {
            writeln!(self.io.stderr, "warning: {}", describe(failure)).map_err(AppError::Output)?;
        }

        Ok(if failures.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

const fn ip_family(cli: &Cli) -> IpFamily {
    match (cli.ipv4, cli.ipv6) {
        (true, _) => IpFamily::V4,
        (false, true) => IpFamily::V6,
        (false, false) => IpFamily::Any,
    }
}

/// Renders an error with its chain of causes.
fn describe(error: &TransportError) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}
