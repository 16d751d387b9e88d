//! crates/cli/src/frontend/arguments.rs
//! Turns clap matches into an [`Action`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::ArgMatches;
use clap::error::ErrorKind;
use logging::{ContextFlags, Level};

use super::command_builder::{PROGRAM_NAME, clap_command};

/// What one invocation asks for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Action {
    Show {
        name: Option<String>,
    },
    SetLevel {
        name: String,
        level: Level,
    },
    SetFlag {
        name: String,
        flag: ContextFlags,
        on: bool,
    },
    Log {
        context: Option<String>,
        msgid: Option<String>,
        kvpairs: Option<String>,
        level: Level,
        message: String,
    },
    Dump {
        context: Option<String>,
        level: Level,
        file: PathBuf,
    },
    Reload,
    DevMode {
        on: bool,
    },
    Errors,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ParsedArgs {
    pub(crate) verbose: bool,
    pub(crate) action: Action,
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;
    let verbose = matches.get_flag("verbose");
    let Some((command, mut sub)) = matches.remove_subcommand() else {
        return Err(clap_command().error(ErrorKind::MissingSubcommand, "a command is required"));
    };

    let action = match command.as_str() {
        "show" => Action::Show {
            name: sub.remove_one("name"),
        },
        "set" => Action::SetLevel {
            name: required(&mut sub, "name")?,
            level: required(&mut sub, "level")?,
        },
        "flag" => Action::SetFlag {
            name: required(&mut sub, "name")?,
            flag: flag_bit(&required::<String>(&mut sub, "flag")?),
            on: required::<String>(&mut sub, "state")? == "on",
        },
        "log" => Action::Log {
            context: sub.remove_one("context"),
            msgid: sub.remove_one("msgid"),
            kvpairs: sub.remove_one("kvpairs"),
            level: required(&mut sub, "level")?,
            message: required(&mut sub, "message")?,
        },
        "dump" => Action::Dump {
            context: sub.remove_one("context"),
            level: required(&mut sub, "level")?,
            file: required(&mut sub, "file")?,
        },
        "reload" => Action::Reload,
        "dev-mode" => Action::DevMode {
            on: required::<String>(&mut sub, "state")? == "on",
        },
        "errors" => Action::Errors,
        other => {
            return Err(clap_command().error(
                ErrorKind::InvalidSubcommand,
                format!("unrecognized command '{other}'"),
            ));
        }
    };

    Ok(ParsedArgs { verbose, action })
}

fn required<T>(matches: &mut ArgMatches, id: &str) -> Result<T, clap::Error>
where
    T: Clone + Send + Sync + 'static,
{
    matches.remove_one(id).ok_or_else(|| {
        clap_command().error(
            ErrorKind::MissingRequiredArgument,
            format!("missing required argument '{id}'"),
        )
    })
}

fn flag_bit(name: &str) -> ContextFlags {
    match name {
        "pid" => ContextFlags::LOG_PROCESS_IDS,
        "tid" => ContextFlags::LOG_THREAD_IDS,
        _ => ContextFlags::LOG_TO_CONSOLE,
    }
}
