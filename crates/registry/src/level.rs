//! crates/registry/src/level.rs
//! Severity levels and their configuration labels.

use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

/// Severity level, syslog numbering. Lower is more severe.
///
/// [`Level::None`] sits below [`Level::Emergency`] and, used as a context's
/// enabled level, suppresses everything.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(i32)]
pub enum Level {
    /// Logging disabled.
    None = -1,
    /// System is unusable.
    Emergency = 0,
    /// Action must be taken immediately.
    Alert = 1,
    /// Critical conditions.
    Critical = 2,
    /// Error conditions.
    Error = 3,
    /// Warning conditions.
    Warning = 4,
    /// Normal but significant condition.
    Notice = 5,
    /// Informational.
    Info = 6,
    /// Debug-level messages.
    Debug = 7,
}

const LABELS: [(Level, &str); 9] = [
    (Level::None, "none"),
    (Level::Emergency, "emerg"),
    (Level::Alert, "alert"),
    (Level::Critical, "crit"),
    (Level::Error, "err"),
    (Level::Warning, "warning"),
    (Level::Notice, "notice"),
    (Level::Info, "info"),
    (Level::Debug, "debug"),
];

impl Level {
    /// Every level from `None` to `Debug`.
    pub const ALL: [Self; 9] = [
        Self::None,
        Self::Emergency,
        Self::Alert,
        Self::Critical,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    /// Parses a configuration label. Matching is exact and case-sensitive.
    ///
    /// ```
    /// use registry::Level;
    ///
    /// assert_eq!(Level::from_label("warning"), Some(Level::Warning));
    /// assert_eq!(Level::from_label("WARNING"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        LABELS
            .iter()
            .find(|(_, candidate)| *candidate == label)
            .map(|(level, _)| *level)
    }

    /// Returns the configuration label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Emergency => "emerg",
            Self::Alert => "alert",
            Self::Critical => "crit",
            Self::Error => "err",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Maps a raw value in `-1..=7` onto a level.
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::None),
            0 => Some(Self::Emergency),
            1 => Some(Self::Alert),
            2 => Some(Self::Critical),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    /// Raw numeric value.
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// True for levels a message may carry (`Emergency..=Debug`).
    pub const fn is_message_level(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Level gate: with `self` as a context's enabled level, reports whether
    /// a message at `message` passes.
    pub fn admits(self, message: Self) -> bool {
        message.is_message_level() && message.as_i32() <= self.as_i32()
    }
}

impl TryFrom<i32> for Level {
    type Error = LogError;

    fn try_from(value: i32) -> Result<Self, LogError> {
        Self::from_i32(value).ok_or(LogError::InvalidLevel)
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or(LogError::InvalidLevel)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
