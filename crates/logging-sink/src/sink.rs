//! crates/logging-sink/src/sink.rs
//!
//! The [`LogSink`] seam between the emission pipeline and the outside world.

use std::io::{self, Write};
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::line_mode::LineMode;
use crate::signals::SignalMaskGuard;
use crate::syslog::{SyslogConfig, SyslogFacility, SyslogGuard, SyslogPriority, syslog_message};

/// Console stream selected by the configured level ranges.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ConsoleStream {
    /// Standard error.
    Stderr,
    /// Standard output.
    Stdout,
}

/// Destination for fully formatted lines.
///
/// Implementations receive one call per accepted line and must not fail the
/// caller: delivery is best effort.
pub trait LogSink: Send + Sync {
    /// Writes one line to the system log.
    fn syslog(&self, priority: SyslogPriority, line: &str);

    /// Echoes one line to a console stream. The line carries its own newline
    /// policy through `line_mode`.
    fn console(&self, stream: ConsoleStream, line: &str, line_mode: LineMode);
}

/// Sink writing to syslog(3) and the real standard streams.
#[derive(Debug)]
pub struct SystemSink {
    config: SyslogConfig,
}

impl SystemSink {
    /// Creates a sink that opens the system log lazily with `facility` and
    /// the program name as ident.
    pub fn new(facility: SyslogFacility, ident: &str) -> Self {
        Self {
            config: SyslogConfig::new(facility, ident),
        }
    }

    fn ensure_open(&self) {
        static CONNECTION: OnceLock<SyslogGuard> = OnceLock::new();
        CONNECTION.get_or_init(|| self.config.open());
    }
}

impl LogSink for SystemSink {
    fn syslog(&self, priority: SyslogPriority, line: &str) {
        self.ensure_open();
        let _signals = SignalMaskGuard::block_all();
        syslog_message(priority, line);
    }

    fn console(&self, stream: ConsoleStream, line: &str, line_mode: LineMode) {
        let result = match stream {
            ConsoleStream::Stderr => write_line(&mut io::stderr().lock(), line, line_mode),
            ConsoleStream::Stdout => write_line(&mut io::stdout().lock(), line, line_mode),
        };
        if let Err(error) = result {
            tracing::debug!(%error, ?stream, "console echo failed");
        }
    }
}

fn write_line<W: Write>(writer: &mut W, line: &str, line_mode: LineMode) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    if line_mode.append_newline() {
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// One captured write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SinkRecord {
    /// A system-log line.
    Syslog {
        /// Priority the line was written with.
        priority: SyslogPriority,
        /// Line text.
        line: String,
    },
    /// A console echo, newline included when the line mode asked for one.
    Console {
        /// Stream the line was written to.
        stream: ConsoleStream,
        /// Line text.
        line: String,
    },
}

/// Sink that keeps every write in memory.
///
/// Used by tests and by tooling that wants to preview what a call would
/// emit without touching the system log.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SinkRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every captured record.
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the captured system-log lines.
    pub fn syslog_lines(&self) -> Vec<(SyslogPriority, String)> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                SinkRecord::Syslog { priority, line } => Some((priority, line)),
                SinkRecord::Console { .. } => None,
            })
            .collect()
    }

    /// Returns the captured console lines for `stream`.
    pub fn console_lines(&self, stream: ConsoleStream) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                SinkRecord::Console { stream: s, line } if s == stream => Some(line),
                _ => None,
            })
            .collect()
    }

    /// Drops every captured record.
    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&self, record: SinkRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl LogSink for MemorySink {
    fn syslog(&self, priority: SyslogPriority, line: &str) {
        self.push(SinkRecord::Syslog {
            priority,
            line: line.to_owned(),
        });
    }

    fn console(&self, stream: ConsoleStream, line: &str, line_mode: LineMode) {
        let mut line = line.to_owned();
        if line_mode.append_newline() {
            line.push('\n');
        }
        self.push(SinkRecord::Console { stream, line });
    }
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn syslog(&self, priority: SyslogPriority, line: &str) {
        (**self).syslog(priority, line);
    }

    fn console(&self, stream: ConsoleStream, line: &str, line_mode: LineMode) {
        (**self).console(stream, line, line_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.syslog(SyslogPriority::Info, "first");
        sink.console(ConsoleStream::Stdout, "second", LineMode::WithNewline);
        sink.console(ConsoleStream::Stderr, "third\n", LineMode::WithoutNewline);

        assert_eq!(
            sink.records(),
            vec![
                SinkRecord::Syslog {
                    priority: SyslogPriority::Info,
                    line: "first".to_owned(),
                },
                SinkRecord::Console {
                    stream: ConsoleStream::Stdout,
                    line: "second\n".to_owned(),
                },
                SinkRecord::Console {
                    stream: ConsoleStream::Stderr,
                    line: "third\n".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn console_lines_filter_by_stream() {
        let sink = MemorySink::new();
        sink.console(ConsoleStream::Stdout, "out", LineMode::WithNewline);
        sink.console(ConsoleStream::Stderr, "err", LineMode::WithNewline);

        assert_eq!(sink.console_lines(ConsoleStream::Stderr), vec!["err\n"]);
        assert_eq!(sink.console_lines(ConsoleStream::Stdout), vec!["out\n"]);
    }

    #[test]
    fn clear_discards_records() {
        let sink = MemorySink::new();
        sink.syslog(SyslogPriority::Error, "gone");
        sink.clear();
        assert!(sink.records().is_empty());
    }

    #[test]
    fn arc_forwards_to_inner_sink() {
        let inner = Arc::new(MemorySink::new());
        let shared: Arc<MemorySink> = Arc::clone(&inner);
        shared.syslog(SyslogPriority::Notice, "via arc");
        assert_eq!(inner.syslog_lines().len(), 1);
    }

    #[test]
    fn write_line_honours_line_mode() {
        let mut buffer = Vec::new();
        write_line(&mut buffer, "a", LineMode::WithNewline).expect("write");
        write_line(&mut buffer, "b\n", LineMode::WithoutNewline).expect("write");
        assert_eq!(buffer, b"a\nb\n");
    }
}
