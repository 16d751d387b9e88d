//! crates/cli/src/frontend/render.rs
//! Plain-text tables printed by `show` and `errors`.

use std::io::{self, Write};

use logging::{ContextFlags, LogError};
use registry::{ContextInfo, Registry};

const FLAG_LABELS: [(ContextFlags, &str); 4] = [
    (ContextFlags::LOG_PROCESS_IDS, "pid"),
    (ContextFlags::LOG_THREAD_IDS, "tid"),
    (ContextFlags::LOG_TO_CONSOLE, "console"),
    (ContextFlags::OVERRIDDEN, "overridden"),
];

pub(crate) const fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// Comma-separated flag names, `-` when none are set.
pub(crate) fn flag_list(flags: ContextFlags) -> String {
    let names: Vec<&str> = FLAG_LABELS
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, label)| *label)
        .collect();
    if names.is_empty() {
        "-".to_owned()
    } else {
        names.join(",")
    }
}

pub(crate) fn context_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{:>5}  {:<31}  {:<8}  FLAGS", "INDEX", "NAME", "LEVEL")
}

pub(crate) fn context_row<W: Write>(out: &mut W, info: &ContextInfo) -> io::Result<()> {
    writeln!(
        out,
        "{:>5}  {:<31}  {:<8}  {}",
        info.handle.index(),
        info.name,
        info.level.label(),
        flag_list(info.flags)
    )
}

/// Every context, global first, followed by the registry switches.
pub(crate) fn context_table<W: Write>(out: &mut W, registry: &Registry) -> io::Result<()> {
    context_header(out)?;
    for info in registry.contexts() {
        context_row(out, &info)?;
    }
    writeln!(out)?;
    writeln!(out, "context-logging: {}", on_off(registry.context_logging()))?;
    writeln!(out, "dev-mode: {}", on_off(registry.dev_mode()))?;
    writeln!(
        out,
        "shared: {}",
        registry
            .region_path()
            .map_or_else(|| "no (process-local)".to_owned(), |path| path.display().to_string())
    )
}

pub(crate) fn error_table<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{:>4}  {:<20}  DESCRIPTION", "CODE", "NAME")?;
    for error in LogError::ALL {
        writeln!(out, "{:>4}  {:<20}  {error}", error.code(), error.debug_name())?;
    }
    Ok(())
}
