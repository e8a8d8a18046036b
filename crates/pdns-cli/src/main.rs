//! Entry point for `pdnsflex`.
//!
//! Delegates to [`pdns_cli::run`] with locked standard streams.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    pdns_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
