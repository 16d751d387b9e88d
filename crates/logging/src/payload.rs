//! crates/logging/src/payload.rs
//!
//! Checks on the structured part of a line: the JSON object that opens the
//! payload, the key list of the keyed API and its format descriptor.

use serde::de::IgnoredAny;

use crate::message::FormatFlags;

/// Largest JSON prefix, in bytes, that is still parsed.
pub const MAX_JSON_PREFIX: usize = 1023;

/// Separator between keys in a key list (ASCII start of heading).
pub const KEY_SEPARATOR: char = '\u{1}';

/// Where a candidate JSON prefix may end.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JsonBoundary {
    /// After any `}`.
    Brace,
    /// After a `}` that is followed by a space.
    BraceSpace,
}

impl JsonBoundary {
    const fn pattern(self) -> &'static str {
        match self {
            Self::Brace => "}",
            Self::BraceSpace => "} ",
        }
    }
}

/// Why a JSON prefix was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JsonProblem {
    /// No prefix parses as JSON.
    Malformed,
    /// The candidate prefixes grew past [`MAX_JSON_PREFIX`] first.
    TooLarge,
}

impl JsonProblem {
    pub(crate) const fn cause(self) -> &'static str {
        match self {
            Self::Malformed => "The json string is wrong.",
            Self::TooLarge => "The json string exceeded 1024 bytes.",
        }
    }
}

/// Finds the shortest prefix of `text` that ends at a `boundary` and is a
/// complete JSON value.
///
/// Free text may follow the JSON object and may itself contain braces, so
/// every boundary is tried in turn until one parses.
pub(crate) fn validate_json_prefix(text: &str, boundary: JsonBoundary) -> Result<(), JsonProblem> {
    let pattern = boundary.pattern();
    for (position, _) in text.match_indices(pattern) {
        let end = position + pattern.len();
        if end > MAX_JSON_PREFIX {
            return Err(JsonProblem::TooLarge);
        }
        if serde_json::from_str::<IgnoredAny>(&text[..end]).is_ok() {
            return Ok(());
        }
    }
    Err(JsonProblem::Malformed)
}

/// Why a key list was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum KeyProblem {
    /// No key list was supplied.
    Missing,
    /// Keys were declared but the count is zero.
    NoKeys,
    /// Key `key` (1-based) holds a control or non-ASCII character, or a
    /// backslash that does not escape `"` or `\`.
    InvalidChar {
        /// 1-based key position.
        key: usize,
        /// Offending character.
        ch: char,
    },
    /// The number of keys differs from the declared count.
    CountMismatch {
        /// Declared count.
        declared: usize,
        /// Keys found in the list.
        found: usize,
    },
}

/// Checks a separator-joined key list against the declared count.
pub(crate) fn validate_keys(kv_count: usize, keys: Option<&str>) -> Result<(), KeyProblem> {
    let keys = keys.ok_or(KeyProblem::Missing)?;
    if kv_count == 0 {
        return Err(KeyProblem::NoKeys);
    }

    let mut current = 1;
    let mut chars = keys.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == KEY_SEPARATOR {
            current += 1;
        } else if ch < ' ' || ch >= '\u{7f}' {
            return Err(KeyProblem::InvalidChar { key: current, ch });
        } else if ch == '\\' {
            match chars.peek() {
                Some('"' | '\\') => {
                    chars.next();
                }
                other => {
                    return Err(KeyProblem::InvalidChar {
                        key: current,
                        ch: other.copied().unwrap_or('\\'),
                    });
                }
            }
        }
    }

    if current == kv_count {
        Ok(())
    } else {
        Err(KeyProblem::CountMismatch {
            declared: kv_count,
            found: current,
        })
    }
}

/// Counts `%` conversions in a format descriptor; `%%` is a literal.
pub(crate) fn count_conversions(format: &str) -> usize {
    let mut count = 0;
    let mut bytes = format.bytes();
    while let Some(byte) = bytes.next() {
        if byte == b'%' {
            let mut rest = bytes.clone();
            if rest.next() == Some(b'%') {
                bytes = rest;
            } else {
                count += 1;
            }
        }
    }
    count
}

/// Checks that `format` carries one conversion per key, plus one for the
/// timestamp when [`FormatFlags::WITH_CLOCK`] is set.
pub(crate) fn validate_format(flags: FormatFlags, kv_count: usize, format: Option<&str>) -> bool {
    let Some(format) = format else {
        return false;
    };
    if kv_count == 0 {
        return false;
    }
    let expected = kv_count + usize::from(flags.contains(FormatFlags::WITH_CLOCK));
    count_conversions(format) == expected
}
