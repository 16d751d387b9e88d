//! crates/registry/src/audit.rs
//! Developer-mode trail of level changes.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use fs2::FileExt;

use crate::level::Level;

const COMMAND_LINE_CAPACITY: usize = 511;

/// Formats one audit line.
pub(crate) fn audit_line(command_line: &str, component: &str, from: Level, to: Level) -> String {
    format!(
        "PROCINFO:{command_line} COMPONENT:{component} ORIGINLEVEL:{} INPUTLEVEL:{}\n",
        from.as_i32(),
        to.as_i32()
    )
}

/// Appends a line recording who changed `component` from `from` to `to`.
///
/// The file is locked exclusively for the duration of the write so lines
/// from concurrent processes never interleave.
pub(crate) fn record_level_change(path: &Path, component: &str, from: Level, to: Level) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o644)
        .open(path)?;
    file.lock_exclusive()?;
    let command_line = logging_sink::process::command_line(COMMAND_LINE_CAPACITY);
    let result = file.write_all(audit_line(&command_line, component, from, to).as_bytes());
    let unlocked = FileExt::unlock(&file);
    result.and(unlocked)
}
