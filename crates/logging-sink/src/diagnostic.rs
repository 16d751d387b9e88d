//! crates/logging-sink/src/diagnostic.rs
//!
//! Library self-reporting. Defects the caller should see (a malformed
//! message-id, a rejected configuration entry, a truncated line) are written
//! to the system log as ordinary structured lines so they show up next to
//! the offending output.

use std::fmt::{self, Write as _};

use crate::sink::LogSink;
use crate::syslog::SyslogPriority;

/// Component name used for diagnostics that are not tied to a caller's
/// context, such as configuration parsing.
pub const LIBRARY_COMPONENT: &str = "ShareLogLib";

/// Capacity of a single diagnostic line in bytes.
pub const DIAGNOSTIC_LINE_CAPACITY: usize = 1024;

/// Writes `"<pidtid> <identifier> <component> <text>"` lines to a sink.
///
/// The text is expected to start with a message-id followed by a JSON
/// object, e.g. `INVALID_MSGID {"MSGID":"a b"} MSGID contains space, { or }.`
#[derive(Clone, Copy)]
pub struct Diagnostics<'a> {
    sink: &'a dyn LogSink,
    identifier: &'a str,
}

impl fmt::Debug for Diagnostics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

impl<'a> Diagnostics<'a> {
    /// Binds a diagnostics writer to `sink`, tagging lines with `identifier`.
    pub fn new(sink: &'a dyn LogSink, identifier: &'a str) -> Self {
        Self { sink, identifier }
    }

    /// Reports a defect at error priority.
    pub fn error(&self, component: &str, pidtid: &str, text: fmt::Arguments<'_>) {
        self.emit(SyslogPriority::Error, component, pidtid, text);
    }

    /// Reports a recoverable condition at warning priority.
    pub fn warning(&self, component: &str, pidtid: &str, text: fmt::Arguments<'_>) {
        self.emit(SyslogPriority::Warning, component, pidtid, text);
    }

    fn emit(&self, priority: SyslogPriority, component: &str, pidtid: &str, text: fmt::Arguments<'_>) {
        let line = render_line(pidtid, self.identifier, component, text);
        self.sink.syslog(priority, &line);
    }
}

fn render_line(pidtid: &str, identifier: &str, component: &str, text: fmt::Arguments<'_>) -> String {
    let mut line = String::with_capacity(128);
    // Writing into a String cannot fail.
    let _ = write!(line, "{pidtid} {identifier} {component} {text}");
    if line.len() > DIAGNOSTIC_LINE_CAPACITY {
        let mut end = DIAGNOSTIC_LINE_CAPACITY;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        line.truncate(end);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn error_line_has_four_fields() {
        let sink = MemorySink::new();
        let diagnostics = Diagnostics::new(&sink, "sharelog");
        diagnostics.error(
            "APP",
            "[42]",
            format_args!("LONG_MSGID {{\"MSGID\":\"{}\"}} too long", "X"),
        );

        assert_eq!(
            sink.syslog_lines(),
            vec![(
                SyslogPriority::Error,
                "[42] sharelog APP LONG_MSGID {\"MSGID\":\"X\"} too long".to_owned()
            )]
        );
    }

    #[test]
    fn warning_uses_warning_priority() {
        let sink = MemorySink::new();
        Diagnostics::new(&sink, "id").warning(LIBRARY_COMPONENT, "[]", format_args!("W {{}}"));
        let lines = sink.syslog_lines();
        assert_eq!(lines[0].0, SyslogPriority::Warning);
        assert_eq!(lines[0].1, "[] id ShareLogLib W {}");
    }

    #[test]
    fn long_lines_are_capped() {
        let text = "é".repeat(DIAGNOSTIC_LINE_CAPACITY);
        let line = render_line("[]", "id", "C", format_args!("{text}"));
        assert!(line.len() <= DIAGNOSTIC_LINE_CAPACITY);
        assert!(line.starts_with("[] id C é"));
    }
}
