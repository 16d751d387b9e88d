//! crates/cli/src/frontend.rs
//! Entry points: parse, install tracing, attach, execute, map to exit codes.

mod arguments;
mod command_builder;
mod execution;
mod render;

use std::ffi::OsString;
use std::io::Write;

use clap::error::ErrorKind;
use logging::{Logger, Options};
use logging_sink::{LogSink, SystemSink};
use tracing_subscriber::EnvFilter;

use self::arguments::{Action, parse_args};
pub use self::command_builder::PROGRAM_NAME;
use self::execution::{CliError, execute};

/// Exit code of a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for unparsable command lines.
pub const EXIT_USAGE: i32 = 1;
/// Exit code for a failed operation.
pub const EXIT_FAILURE: i32 = 2;

/// Environment variable holding a `tracing` filter for the tool's own
/// diagnostics, e.g. `SHARELOG_TRACE=registry=debug`.
pub const TRACE_ENV: &str = "SHARELOG_TRACE";

/// Runs `sharelogctl` with options from the environment, writing emitted
/// lines to the system log.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let options = Options::from_env();
    let sink = SystemSink::new(options.facility, PROGRAM_NAME);
    run_with(arguments, options, sink, stdout, stderr)
}

/// Runs `sharelogctl` against explicit options and sink.
pub fn run_with<I, S, Out, Err>(
    arguments: I,
    options: Options,
    sink: impl LogSink + 'static,
    stdout: &mut Out,
    stderr: &mut Err,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => return report_usage(&error, stdout, stderr),
    };
    init_tracing(parsed.verbose, stderr);

    let result = match parsed.action {
        Action::Errors => render::error_table(stdout).map_err(CliError::from),
        action => {
            let logger = Logger::with_sink(options, sink);
            execute(action, &logger, stdout)
        }
    };

    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
            EXIT_FAILURE
        }
    }
}

fn report_usage<Out: Write, Err: Write>(error: &clap::Error, stdout: &mut Out, stderr: &mut Err) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = write!(stdout, "{}", error.render());
            EXIT_SUCCESS
        }
        _ => {
            let _ = write!(stderr, "{}", error.render());
            EXIT_USAGE
        }
    }
}

/// Installs a stderr subscriber when `--verbose` or [`TRACE_ENV`] asks for
/// one. The environment filter wins over `--verbose`.
fn init_tracing<Err: Write>(verbose: bool, stderr: &mut Err) {
    let filter = match std::env::var(TRACE_ENV) {
        Ok(spec) if !spec.is_empty() => EnvFilter::try_new(spec),
        _ if verbose => EnvFilter::try_new("debug"),
        _ => return,
    };
    match filter {
        Ok(filter) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
        Err(error) => {
            let _ = writeln!(stderr, "{PROGRAM_NAME}: ignoring {TRACE_ENV}: {error}");
        }
    }
}
