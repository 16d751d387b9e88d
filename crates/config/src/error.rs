//! crates/config/src/error.rs
//!
//! File-level and entry-level configuration errors.

use std::io;

use thiserror::Error;

/// Result type for loading a configuration document.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure to turn a file into a [`ConfigDocument`](crate::ConfigDocument).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// The file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
    /// The top-level JSON value is not an object.
    #[error("configuration root is not an object")]
    NotAnObject,
}

/// Problem with a single entry of a `contexts` or `overrides` array.
///
/// Entry errors never abort a file; the applier reports them and moves on.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EntryError {
    /// The entry has no `name` member.
    #[error("context entry {index} has no name")]
    MissingName {
        /// Position in the array.
        index: usize,
    },
    /// The `name` member is not a string.
    #[error("context entry {index} has a non-string name")]
    InvalidName {
        /// Position in the array.
        index: usize,
    },
    /// The entry has no `level` member.
    #[error("context {name} has no level")]
    MissingLevel {
        /// Position in the array.
        index: usize,
        /// Context name.
        name: String,
    },
    /// The `level` member is not a string.
    #[error("context {name} has a non-string level")]
    InvalidLevelValue {
        /// Position in the array.
        index: usize,
        /// Context name.
        name: String,
    },
    /// An override entry is not an object or has a non-string member.
    #[error("override entry {index} is malformed")]
    InvalidOverride {
        /// Position in the array.
        index: usize,
    },
}

impl EntryError {
    /// Message-id used when reporting the error.
    pub const fn msgid(&self) -> &'static str {
        match self {
            Self::MissingName { .. } => "NO_CTX_NAME",
            Self::InvalidName { .. } => "CTX_NAME_ERR",
            Self::MissingLevel { .. } => "CTX_LVL_MISSING",
            Self::InvalidLevelValue { .. } => "NO_CTX_LVL",
            Self::InvalidOverride { .. } => "PARSE_ERROR",
        }
    }

    /// Position of the offending entry in its array.
    pub const fn index(&self) -> usize {
        match self {
            Self::MissingName { index }
            | Self::InvalidName { index }
            | Self::MissingLevel { index, .. }
            | Self::InvalidLevelValue { index, .. }
            | Self::InvalidOverride { index } => *index,
        }
    }
}
