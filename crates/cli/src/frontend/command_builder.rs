//! crates/cli/src/frontend/command_builder.rs

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};
use logging::Level;

/// Name the tool reports itself under.
pub const PROGRAM_NAME: &str = "sharelogctl";

pub(crate) const FLAG_NAMES: [&str; 3] = ["pid", "tid", "console"];
pub(crate) const SWITCH_STATES: [&str; 2] = ["on", "off"];

/// Builds the `clap` command used for parsing.
pub(crate) fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .about("Inspect and adjust the shared sharelog context registry")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Trace the tool's own registry and configuration activity to stderr.")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("show")
                .about("List every context, or show one")
                .arg(Arg::new("name").value_name("NAME")),
        )
        .subcommand(
            Command::new("set")
                .about("Set the enabled level of a context")
                .arg(name_arg())
                .arg(level_arg()),
        )
        .subcommand(
            Command::new("flag")
                .about("Switch a context flag on or off")
                .arg(name_arg())
                .arg(
                    Arg::new("flag")
                        .value_name("FLAG")
                        .required(true)
                        .value_parser(FLAG_NAMES),
                )
                .arg(state_arg()),
        )
        .subcommand(
            Command::new("log")
                .about("Write one line through the emission pipeline")
                .arg(context_arg())
                .arg(
                    Arg::new("msgid")
                        .long("msgid")
                        .short('m')
                        .value_name("MSGID")
                        .help("Message-id; omit at debug level."),
                )
                .arg(
                    Arg::new("kvpairs")
                        .long("kv")
                        .short('k')
                        .value_name("JSON")
                        .help("JSON object written ahead of the message."),
                )
                .arg(level_arg())
                .arg(Arg::new("message").value_name("MESSAGE").required(true)),
        )
        .subcommand(
            Command::new("dump")
                .about("Write a hex dump of a file")
                .arg(context_arg())
                .arg(level_arg())
                .arg(
                    Arg::new("file")
                        .value_name("FILE")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(Command::new("reload").about("Re-read configuration files"))
        .subcommand(
            Command::new("dev-mode")
                .about("Switch level-change auditing on or off")
                .arg(state_arg()),
        )
        .subcommand(Command::new("errors").about("Print the error codes and their names"))
}

fn name_arg() -> Arg {
    Arg::new("name").value_name("NAME").required(true)
}

fn context_arg() -> Arg {
    Arg::new("context")
        .long("context")
        .short('c')
        .value_name("NAME")
        .help("Context to write through; the global context when omitted.")
}

fn level_arg() -> Arg {
    Arg::new("level")
        .value_name("LEVEL")
        .required(true)
        .value_parser(parse_level)
}

fn state_arg() -> Arg {
    Arg::new("state")
        .value_name("STATE")
        .required(true)
        .value_parser(SWITCH_STATES)
}

fn parse_level(value: &str) -> Result<Level, String> {
    Level::from_label(value).ok_or_else(|| {
        let labels: Vec<&str> = Level::ALL.iter().map(|level| level.label()).collect();
        format!("unknown level '{value}' (expected one of: {})", labels.join(", "))
    })
}
