//! crates/registry/src/error.rs
//!
//! Caller-facing error taxonomy shared by every sharelog crate.

use thiserror::Error;

/// Result type for registry and emission operations.
pub type LogResult<T> = Result<T, LogError>;

/// Flat error enumeration returned by sharelog operations.
///
/// Every variant has a stable numeric [`code`](Self::code) and a short
/// [`debug_name`](Self::debug_name). The names are meant for diagnostics,
/// not for end users.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum LogError {
    /// A required argument was missing or unusable.
    #[error("invalid parameter")]
    InvalidParameter,
    /// A context index was outside `0..context_count()`.
    #[error("invalid context index")]
    InvalidContextIndex,
    /// A handle does not refer to a context slot.
    #[error("invalid context")]
    InvalidContext,
    /// A numeric level outside the accepted range.
    #[error("invalid level")]
    InvalidLevel,
    /// A format string or keyed-message description was inconsistent.
    #[error("invalid format")]
    InvalidFormat,
    /// Malformed payload data, or a missing buffer with a non-zero length.
    #[error("invalid data")]
    InvalidData,
    /// An empty buffer was supplied where data was required.
    #[error("no data")]
    NoData,
    /// A payload exceeded the line capacity.
    #[error("too much data")]
    TooMuchData,
    /// The context's enabled level filters the message out.
    ///
    /// This is the expected filtering outcome, not a defect.
    #[error("level disabled")]
    LevelDisabled,
    /// The formatting engine reported a failure.
    #[error("format string failed")]
    FormatStringFailed,
    /// No context slots remain.
    #[error("too many contexts")]
    TooManyContexts,
    /// A context name broke the length or character rules.
    #[error("invalid context name")]
    InvalidContextName,
    /// No context with the requested name is registered.
    #[error("context not found")]
    ContextNotFound,
    /// The destination buffer could not hold the whole value.
    #[error("buffer too small")]
    BufferTooSmall,
    /// A message-id was missing, too long or contained a reserved character.
    #[error("invalid message id")]
    InvalidMsgId,
    /// A message-id was present but empty.
    #[error("empty message id")]
    EmptyMsgId,
    /// Logging is switched off for this process.
    #[error("logging disabled")]
    LoggingDisabled,
    /// Unclassified failure.
    #[error("unknown error")]
    Unknown,
}

impl LogError {
    /// Every variant, in code order.
    pub const ALL: [Self; 18] = [
        Self::InvalidParameter,
        Self::InvalidContextIndex,
        Self::InvalidContext,
        Self::InvalidLevel,
        Self::InvalidFormat,
        Self::InvalidData,
        Self::NoData,
        Self::TooMuchData,
        Self::LevelDisabled,
        Self::FormatStringFailed,
        Self::TooManyContexts,
        Self::InvalidContextName,
        Self::ContextNotFound,
        Self::BufferTooSmall,
        Self::InvalidMsgId,
        Self::EmptyMsgId,
        Self::LoggingDisabled,
        Self::Unknown,
    ];

    /// Stable numeric code. `0` is reserved for success.
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidParameter => 1,
            Self::InvalidContextIndex => 2,
            Self::InvalidContext => 3,
            Self::InvalidLevel => 4,
            Self::InvalidFormat => 5,
            Self::InvalidData => 6,
            Self::NoData => 7,
            Self::TooMuchData => 8,
            Self::LevelDisabled => 9,
            Self::FormatStringFailed => 10,
            Self::TooManyContexts => 11,
            Self::InvalidContextName => 12,
            Self::ContextNotFound => 13,
            Self::BufferTooSmall => 14,
            Self::InvalidMsgId => 15,
            Self::EmptyMsgId => 16,
            Self::LoggingDisabled => 17,
            Self::Unknown => 999,
        }
    }

    /// Short debug name, e.g. `"InvalidMsgID"`.
    pub const fn debug_name(self) -> &'static str {
        match self {
            Self::InvalidParameter => "InvalidParameter",
            Self::InvalidContextIndex => "InvalidContextIndex",
            Self::InvalidContext => "InvalidContext",
            Self::InvalidLevel => "InvalidLevel",
            Self::InvalidFormat => "InvalidFormat",
            Self::InvalidData => "InvalidData",
            Self::NoData => "NoData",
            Self::TooMuchData => "TooMuchData",
            Self::LevelDisabled => "LevelDisabled",
            Self::FormatStringFailed => "FormatStringFailed",
            Self::TooManyContexts => "TooManyContexts",
            Self::InvalidContextName => "InvalidContextName",
            Self::ContextNotFound => "ContextNotFound",
            Self::BufferTooSmall => "BufferTooSmall",
            Self::InvalidMsgId => "InvalidMsgID",
            Self::EmptyMsgId => "EmptyMsgID",
            Self::LoggingDisabled => "LoggingDisabled",
            Self::Unknown => "Unknown",
        }
    }

    /// Maps a raw code back onto a variant. `0` and unassigned codes yield
    /// `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|error| error.code() == code)
    }
}

/// Returns the debug name for any raw code: `"None"` for success, `"?"` for
/// codes outside the taxonomy.
///
/// ```
/// use registry::debug_string;
///
/// assert_eq!(debug_string(0), "None");
/// assert_eq!(debug_string(15), "InvalidMsgID");
/// assert_eq!(debug_string(42), "?");
/// ```
pub fn debug_string(code: i32) -> &'static str {
    if code == 0 {
        return "None";
    }
    LogError::from_code(code).map_or("?", LogError::debug_name)
}

/// Returns the raw code for an operation outcome, `0` on success.
pub fn result_code<T>(result: &LogResult<T>) -> i32 {
    result.as_ref().map_or_else(|error| error.code(), |_| 0)
}
