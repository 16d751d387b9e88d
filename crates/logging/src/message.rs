//! crates/logging/src/message.rs
//!
//! Inputs of the keyed API and the helpers the logging macros expand to.

use std::fmt;

use bitflags::bitflags;
use logging_sink::process;
use serde::Serialize;

use crate::payload::KEY_SEPARATOR;

bitflags! {
    /// Options of a keyed message.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct FormatFlags: u32 {
        /// A monotonic timestamp is rendered ahead of the declared keys and
        /// takes one extra conversion in the format descriptor.
        const WITH_CLOCK = 1;
    }
}

/// A structured line for [`Logger::log_kv`](crate::Logger::log_kv).
///
/// `args` renders the whole payload, `{"KEY":value,...} free text`.
/// `keys` lists the declared keys joined by the start-of-heading character
/// and `formats` holds one `%` conversion per rendered value; both are
/// cross-checked against `kv_count` before anything is written.
#[derive(Clone, Copy, Debug)]
pub struct KeyedMessage<'a> {
    /// Message-id; must be `None` at debug level.
    pub msgid: Option<&'a str>,
    /// Number of declared keys.
    pub kv_count: usize,
    /// Separator-joined key list.
    pub keys: Option<&'a str>,
    /// Format descriptor.
    pub formats: Option<&'a str>,
    /// Message options.
    pub flags: FormatFlags,
    /// Payload renderer.
    pub args: fmt::Arguments<'a>,
}

impl<'a> KeyedMessage<'a> {
    /// A message with no keys.
    pub fn plain(msgid: Option<&'a str>, args: fmt::Arguments<'a>) -> Self {
        Self {
            msgid,
            kv_count: 0,
            keys: None,
            formats: None,
            flags: FormatFlags::empty(),
            args,
        }
    }
}

/// Renders a value as JSON.
///
/// Serialization failures surface as [`fmt::Error`], which the pipeline
/// reports as a failed format.
#[derive(Clone, Copy, Debug)]
pub struct JsonValue<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> fmt::Display for JsonValue<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self.0).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Joins keys with the key separator.
#[doc(hidden)]
pub fn key_list(keys: &[&str]) -> String {
    let mut list = String::new();
    for (index, key) in keys.iter().enumerate() {
        if index > 0 {
            list.push(KEY_SEPARATOR);
        }
        list.push_str(key);
    }
    list
}

/// One `%s` conversion per value, plus one for the clock.
#[doc(hidden)]
pub fn format_descriptor(kv_count: usize, flags: FormatFlags) -> String {
    let conversions = kv_count + usize::from(flags.contains(FormatFlags::WITH_CLOCK));
    "%s".repeat(conversions)
}

/// Payload body of the logging macros: `{"K":v,...} text`.
#[doc(hidden)]
pub struct KeyValueBody<'a> {
    keys: &'a [&'a str],
    values: &'a [&'a dyn fmt::Display],
    clock: Option<(i64, i64)>,
    text: fmt::Arguments<'a>,
}

impl<'a> KeyValueBody<'a> {
    /// Pairs `keys` with `values`; a clock reading is taken now when
    /// `flags` asks for one.
    pub fn new(
        keys: &'a [&'a str],
        values: &'a [&'a dyn fmt::Display],
        flags: FormatFlags,
        text: fmt::Arguments<'a>,
    ) -> Self {
        Self {
            keys,
            values,
            clock: flags
                .contains(FormatFlags::WITH_CLOCK)
                .then(process::monotonic_clock),
            text,
        }
    }
}

impl fmt::Display for KeyValueBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        if let Some((secs, nanos)) = self.clock {
            write!(f, "\"CLOCK\":\"{secs}.{nanos:09}\"")?;
            first = false;
        }
        for (key, value) in self.keys.iter().zip(self.values) {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "\"{key}\":{value}")?;
        }
        write!(f, "}} {}", self.text)
    }
}
