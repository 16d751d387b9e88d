//! crates/registry/src/context.rs
//!
//! Context names, flags and the opaque handle exported to callers.

use std::fmt;

use bitflags::bitflags;

use crate::error::{LogError, LogResult};
use crate::level::Level;

/// Longest accepted context name.
pub const MAX_CONTEXT_NAME_LEN: usize = 31;

/// Reserved name of the global context.
pub const GLOBAL_CONTEXT_NAME: &str = "<global>";

/// Reserved name of the pre-registered default-library context.
pub const DEFAULT_LIB_CONTEXT_NAME: &str = "<default-lib>";

/// Context that receives legacy unstructured output.
pub const LEGACY_CONTEXT_NAME: &str = "LegacyLog";

bitflags! {
    /// Per-context behaviour flags.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct ContextFlags: u32 {
        /// Tag lines with the process id.
        const LOG_PROCESS_IDS = 1;
        /// Tag lines with the thread id when it differs from the process id.
        const LOG_THREAD_IDS = 1 << 1;
        /// Echo lines to the console streams.
        const LOG_TO_CONSOLE = 1 << 2;
        /// Set once flags were assigned explicitly; protects them from
        /// global-flag propagation on reload.
        const OVERRIDDEN = 1 << 31;
    }
}

/// Checks a context name against the naming rules.
///
/// Names are 1..=31 characters from `[A-Za-z0-9._-]`; the two reserved
/// names are always accepted.
///
/// ```
/// use registry::{validate_name, LogError};
///
/// assert!(validate_name("APP.UI").is_ok());
/// assert_eq!(validate_name("app ui"), Err(LogError::InvalidContextName));
/// ```
pub fn validate_name(name: &str) -> LogResult<()> {
    if name == GLOBAL_CONTEXT_NAME || name == DEFAULT_LIB_CONTEXT_NAME {
        return Ok(());
    }
    if name.is_empty() || name.len() > MAX_CONTEXT_NAME_LEN {
        return Err(LogError::InvalidContextName);
    }
    if name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
    {
        Ok(())
    } else {
        Err(LogError::InvalidContextName)
    }
}

/// Iterates the dotted ancestors of `name`, most specific first.
///
/// `"A.B.C"` yields `"A.B"` then `"A"`.
pub(crate) fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    let mut current = name;
    std::iter::from_fn(move || {
        let cut = current.rfind('.')?;
        current = &current[..cut];
        Some(current)
    })
}

/// Opaque reference to a registry slot.
///
/// Slots are append-only and never freed, so a handle stays valid for the
/// life of the registry it came from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ContextHandle(u32);

impl ContextHandle {
    /// The global context.
    pub const GLOBAL: Self = Self(0);

    /// The default-library context pre-registered in the first user slot.
    pub const DEFAULT_LIB: Self = Self(1);

    pub(crate) const fn from_slot(slot: usize) -> Self {
        Self(slot as u32 + 1)
    }

    /// Slot index for user contexts, `None` for global.
    pub(crate) const fn slot(self) -> Option<usize> {
        match self.0 {
            0 => None,
            n => Some(n as usize - 1),
        }
    }

    /// Reports whether this is the global handle.
    pub const fn is_global(self) -> bool {
        self.0 == 0
    }

    /// Enumeration index as used by `context_at`: `0` is global, `n` is the
    /// n-th created context.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Rebuilds a handle from an enumeration index.
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of one context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContextInfo {
    /// Handle of the context.
    pub handle: ContextHandle,
    /// Registered name.
    pub name: String,
    /// Enabled level.
    pub level: Level,
    /// Behaviour flags.
    pub flags: ContextFlags,
}
