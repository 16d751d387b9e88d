#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging/src/lib.rs
//!
//! # Overview
//!
//! `logging` is the emission side of sharelog. A [`Logger`] attaches to the
//! machine-wide context registry, applies configuration when it is the
//! first attacher, and turns calls into system-log lines of the form
//!
//! ```text
//! <pidtid> <identifier> <component> <msgid> <payload>
//! ```
//!
//! where the payload opens with a JSON object followed by free text.
//!
//! # Design
//!
//! - Every call passes the level gate first. The gate reads the context's
//!   enabled level without taking the registry lock.
//! - In strict mode message-ids and the leading JSON object are validated
//!   before anything is written; lenient mode skips content checks.
//! - Payloads are rendered into a fixed 1024-byte buffer. Longer payloads
//!   are cut and reported with a warning diagnostic, never dropped.
//! - Rejected calls are reported as diagnostic lines under the library
//!   component and return a [`LogError`].
//! - A payload of exactly `!loglib loadconf` re-reads configuration instead
//!   of being written.
//!
//! # Invariants
//!
//! - `errno` observed by the caller is unchanged by a logging call.
//! - Console echo needs the context's console flag and a level inside the
//!   stream's configured range.
//!
//! # Errors
//!
//! All operations return [`LogResult`]; see [`LogError`] for the taxonomy.
//!
//! # Examples
//!
//! ```
//! use logging::{Level, LogError, Logger, Options, log_kv};
//! use logging_sink::MemorySink;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = Logger::with_sink(Options::in_dir(dir.path()), MemorySink::new());
//! let ui = logger.context(Some("APP.UI")).unwrap();
//! logger.registry().set_level(ui, Level::Warning).unwrap();
//!
//! assert_eq!(
//!     log_kv!(logger, ui, Level::Info, "STARTED", "ready"),
//!     Err(LogError::LevelDisabled)
//! );
//! log_kv!(logger, ui, Level::Warning, "SLOW_FRAME", { "MS" => 48 }, "frame took too long").unwrap();
//! ```

mod command;
mod dump;
mod line;
mod logger;
mod macros;
mod message;
mod msgid;
mod options;
mod payload;

use std::sync::OnceLock;

pub use command::{AdminCommand, COMMAND_PREFIX};
pub use dump::{BYTES_PER_LINE, DumpFormat, FULL_LINE_LEN};
pub use line::{PAYLOAD_CAPACITY, SNIPPET_LEN};
pub use logger::Logger;
pub use message::{FormatFlags, JsonValue, KeyedMessage};
#[doc(hidden)]
pub use message::{KeyValueBody, format_descriptor, key_list};
pub use msgid::{DEBUG_MSGID, MAX_MSGID_LEN};
pub use options::{DEFAULT_IDENTIFIER, Options, env};
pub use payload::{KEY_SEPARATOR, MAX_JSON_PREFIX};
pub use registry::{ContextFlags, ContextHandle, Level, LogError, LogResult};

/// The process-wide logger, created on first use from
/// [`Options::from_env`].
pub fn global() -> &'static Logger {
    static GLOBAL: OnceLock<Logger> = OnceLock::new();
    GLOBAL.get_or_init(|| Logger::new(Options::from_env()))
}
