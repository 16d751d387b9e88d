//! crates/logging/src/line.rs
//!
//! Fixed-capacity line assembly and the escaped snippets quoted by
//! diagnostics.

use std::fmt::{self, Write as _};

/// Capacity of a formatted payload in bytes.
pub const PAYLOAD_CAPACITY: usize = 1024;

/// Bytes of original content quoted in a diagnostic before escaping.
pub const SNIPPET_LEN: usize = 127;

/// A payload rendered into at most [`PAYLOAD_CAPACITY`] bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct FormattedLine {
    /// Rendered text, cut at a character boundary when over capacity.
    pub(crate) text: String,
    /// Whether the rendering was longer than the capacity.
    pub(crate) truncated: bool,
}

/// `fmt::Write` adapter that keeps the first `capacity` bytes and counts
/// the rest.
struct CappedWriter {
    text: String,
    capacity: usize,
    overflow: bool,
}

impl fmt::Write for CappedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.overflow {
            return Ok(());
        }
        let room = self.capacity - self.text.len();
        if s.len() <= room {
            self.text.push_str(s);
        } else {
            let mut end = room;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            self.text.push_str(&s[..end]);
            self.overflow = true;
        }
        Ok(())
    }
}

/// Renders `args` into a line of at most `capacity` bytes.
///
/// Returns `Err` only when a `Display` implementation inside `args` fails.
pub(crate) fn format_capped(args: fmt::Arguments<'_>, capacity: usize) -> Result<FormattedLine, fmt::Error> {
    let mut writer = CappedWriter {
        text: String::with_capacity(capacity.min(256)),
        capacity,
        overflow: false,
    };
    writer.write_fmt(args)?;
    Ok(FormattedLine {
        text: writer.text,
        truncated: writer.overflow,
    })
}

/// Quotes the first [`SNIPPET_LEN`] bytes of `text` with C-style escapes:
/// `\b \f \n \r \t \v \\ \"` by name, other control and non-ASCII bytes as
/// three-digit octal.
pub(crate) fn escaped_snippet(text: &str) -> String {
    let bytes = &text.as_bytes()[..text.len().min(SNIPPET_LEN)];
    let mut out = String::with_capacity(bytes.len() + 8);
    for &byte in bytes {
        match byte {
            0x08 => out.push_str("\\b"),
            0x0c => out.push_str("\\f"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x0b => out.push_str("\\v"),
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                // Writing into a String cannot fail.
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_capacity_is_not_truncated() {
        let text = "a".repeat(PAYLOAD_CAPACITY);
        let line = format_capped(format_args!("{text}"), PAYLOAD_CAPACITY).expect("format");
        assert!(!line.truncated);
        assert_eq!(line.text.len(), PAYLOAD_CAPACITY);
    }

    #[test]
    fn one_byte_over_is_truncated() {
        let text = "a".repeat(PAYLOAD_CAPACITY + 1);
        let line = format_capped(format_args!("{text}"), PAYLOAD_CAPACITY).expect("format");
        assert!(line.truncated);
        assert_eq!(line.text.len(), PAYLOAD_CAPACITY);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = format!("{}é", "a".repeat(PAYLOAD_CAPACITY - 1));
        let line = format_capped(format_args!("{text}"), PAYLOAD_CAPACITY).expect("format");
        assert!(line.truncated);
        assert_eq!(line.text.len(), PAYLOAD_CAPACITY - 1);
    }

    #[test]
    fn display_failure_is_reported() {
        struct Failing;
        impl fmt::Display for Failing {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }
        assert!(format_capped(format_args!("{Failing}"), PAYLOAD_CAPACITY).is_err());
    }

    #[test]
    fn snippet_escapes_and_caps() {
        assert_eq!(escaped_snippet("a\"b\\c\n\t"), "a\\\"b\\\\c\\n\\t");
        assert_eq!(escaped_snippet("\u{1}é"), "\\001\\303\\251");
        let long = "x".repeat(500);
        assert_eq!(escaped_snippet(&long).len(), SNIPPET_LEN);
    }
}
