//! crates/config/src/document.rs
//!
//! Typed view over a parsed configuration file.
//!
//! ```json
//! {
//!   "contextLogging": true,
//!   "contexts": [
//!     { "name": "APP", "level": "warning", "logToConsole": true }
//!   ],
//!   "overrides": [
//!     { "level": "debug" },
//!     { "name": "APP.NET", "level": "err" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigResult, EntryError};

const LOG_PROCESS_IDS_TAG: &str = "logProcessIds";
const LOG_THREAD_IDS_TAG: &str = "logThreadIds";
const LOG_TO_CONSOLE_TAG: &str = "logToConsole";
const LEVEL_TAG: &str = "level";
const NAME_TAG: &str = "name";

/// State of an optional boolean member.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FlagValue {
    /// Member not present.
    #[default]
    Absent,
    /// Member present with a boolean value.
    Set(bool),
    /// Member present but not a boolean.
    Invalid,
}

impl FlagValue {
    fn read(object: &Map<String, Value>, key: &str) -> Self {
        match object.get(key) {
            None => Self::Absent,
            Some(Value::Bool(value)) => Self::Set(*value),
            Some(_) => Self::Invalid,
        }
    }
}

/// One member of the `contexts` array.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContextEntry {
    /// Position in the array.
    pub index: usize,
    /// Context name, not yet validated.
    pub name: String,
    /// Level label, not yet parsed.
    pub level: String,
    /// `logProcessIds`.
    pub log_process_ids: FlagValue,
    /// `logThreadIds`.
    pub log_thread_ids: FlagValue,
    /// `logToConsole`.
    pub log_to_console: FlagValue,
}

/// One member of the `overrides` array.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverrideEntry {
    /// Position in the array.
    pub index: usize,
    /// Target context; `None` targets every registered context.
    pub name: Option<String>,
    /// Level label; an entry without one changes nothing.
    pub level: Option<String>,
}

/// A parsed configuration file.
#[derive(Clone, Debug)]
pub struct ConfigDocument {
    source: PathBuf,
    root: Map<String, Value>,
}

impl ConfigDocument {
    /// Reads and parses `path`.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Parses `text`, recording `source` for diagnostics.
    pub fn parse(source: impl Into<PathBuf>, text: &str) -> ConfigResult<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(root) => Ok(Self {
                source: source.into(),
                root,
            }),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    /// File the document came from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The `contextLogging` switch, if present.
    pub fn context_logging(&self) -> FlagValue {
        FlagValue::read(&self.root, "contextLogging")
    }

    /// Reports whether a `contexts` array is present.
    pub fn has_contexts(&self) -> bool {
        self.root.get("contexts").is_some_and(Value::is_array)
    }

    /// Reports whether an `overrides` array is present.
    pub fn has_overrides(&self) -> bool {
        self.root.get("overrides").is_some_and(Value::is_array)
    }

    /// Entries of the `contexts` array. `null` members are skipped.
    pub fn contexts(&self) -> Vec<Result<ContextEntry, EntryError>> {
        array(&self.root, "contexts")
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(index, value)| context_entry(index, value))
            .collect()
    }

    /// Entries of the `overrides` array.
    pub fn overrides(&self) -> Vec<Result<OverrideEntry, EntryError>> {
        array(&self.root, "overrides")
            .iter()
            .enumerate()
            .map(|(index, value)| override_entry(index, value))
            .collect()
    }

    /// Reports whether any context entry carries a name.
    pub fn names_any_context(&self) -> bool {
        array(&self.root, "contexts")
            .iter()
            .any(|value| value.get(NAME_TAG).is_some())
    }
}

fn array<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    root.get(key)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

fn context_entry(index: usize, value: &Value) -> Result<ContextEntry, EntryError> {
    let object = value.as_object().ok_or(EntryError::MissingName { index })?;
    let name = match object.get(NAME_TAG) {
        None => return Err(EntryError::MissingName { index }),
        Some(Value::String(name)) => name.clone(),
        Some(_) => return Err(EntryError::InvalidName { index }),
    };
    let level = match object.get(LEVEL_TAG) {
        None => return Err(EntryError::MissingLevel { index, name }),
        Some(Value::String(level)) => level.clone(),
        Some(_) => return Err(EntryError::InvalidLevelValue { index, name }),
    };
    Ok(ContextEntry {
        index,
        name,
        level,
        log_process_ids: FlagValue::read(object, LOG_PROCESS_IDS_TAG),
        log_thread_ids: FlagValue::read(object, LOG_THREAD_IDS_TAG),
        log_to_console: FlagValue::read(object, LOG_TO_CONSOLE_TAG),
    })
}

fn override_entry(index: usize, value: &Value) -> Result<OverrideEntry, EntryError> {
    let object = value
        .as_object()
        .ok_or(EntryError::InvalidOverride { index })?;
    let optional_string = |key: &str| match object.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(EntryError::InvalidOverride { index }),
    };
    Ok(OverrideEntry {
        index,
        name: optional_string(NAME_TAG)?,
        level: optional_string(LEVEL_TAG)?,
    })
}
