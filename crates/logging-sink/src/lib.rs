#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging-sink/src/lib.rs
//!
//! # Overview
//!
//! `logging-sink` is the boundary between the sharelog emission pipeline and
//! the operating system. It owns every side effect a log call can have: the
//! system-log write, the optional console echo and the library's own
//! diagnostic lines.
//!
//! # Design
//!
//! The pipeline talks to a [`LogSink`]. [`SystemSink`] forwards to
//! syslog(3) and the standard streams; [`MemorySink`] keeps writes in memory
//! so tests and tooling can inspect exactly what would have been emitted.
//! [`Diagnostics`] formats self-reported defects and routes them through the
//! same sink.
//!
//! # Invariants
//!
//! - A system-log write through [`SystemSink`] runs with every signal blocked
//!   on the calling thread; the previous mask is restored afterwards.
//! - [`ErrnoGuard`] lets callers keep `errno` unchanged across a log call.
//! - Sinks never report failure to the caller; delivery is best effort.
//!
//! # Examples
//!
//! ```
//! use logging_sink::{ConsoleStream, LineMode, LogSink, MemorySink, SyslogPriority};
//!
//! let sink = MemorySink::new();
//! sink.syslog(SyslogPriority::Info, "[] sharelog APP START {} up");
//! sink.console(ConsoleStream::Stdout, "app[] APP {} up", LineMode::for_line("{} up"));
//!
//! assert_eq!(sink.syslog_lines().len(), 1);
//! assert_eq!(sink.console_lines(ConsoleStream::Stdout), vec!["app[] APP {} up\n"]);
//! ```

mod diagnostic;
mod line_mode;
pub mod process;
mod signals;
mod sink;
mod syslog;

pub use diagnostic::{DIAGNOSTIC_LINE_CAPACITY, Diagnostics, LIBRARY_COMPONENT};
pub use line_mode::LineMode;
pub use signals::{ErrnoGuard, SignalMaskGuard};
pub use sink::{ConsoleStream, LogSink, MemorySink, SinkRecord, SystemSink};
pub use syslog::{
    FALLBACK_SYSLOG_TAG, MAX_IDENT_LEN, SyslogConfig, SyslogFacility, SyslogGuard, SyslogPriority,
    syslog_message,
};
