//! crates/registry/src/options.rs
//! Locations of the shared region, its lock and the level audit file.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default backing file of the shared region.
pub const DEFAULT_REGION_PATH: &str = "/dev/shm/sharelog.region";
/// Default cross-process lock file.
pub const DEFAULT_LOCK_PATH: &str = "/dev/shm/sharelog.lock";
/// Default audit file for level changes made in developer mode.
pub const DEFAULT_LEVEL_AUDIT_PATH: &str = "/tmp/sharelog-set-level.log";

/// Filesystem locations used by a [`Registry`](crate::Registry).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryOptions {
    /// File mapped as the shared region.
    pub region_path: PathBuf,
    /// File locked around registry mutations.
    pub lock_path: PathBuf,
    /// File receiving one line per level change while developer mode is on.
    pub level_audit_path: PathBuf,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            region_path: PathBuf::from(DEFAULT_REGION_PATH),
            lock_path: PathBuf::from(DEFAULT_LOCK_PATH),
            level_audit_path: PathBuf::from(DEFAULT_LEVEL_AUDIT_PATH),
        }
    }
}

impl RegistryOptions {
    /// Places all three files under `dir`. Handy for tests and sandboxes.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            region_path: dir.join("sharelog.region"),
            lock_path: dir.join("sharelog.lock"),
            level_audit_path: dir.join("sharelog-set-level.log"),
        }
    }
}

/// Selects how strictly message content is checked.
///
/// `Lenient` skips message-id, JSON and keyed-format validation and reads
/// only the default configuration file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ValidationMode {
    /// Every check runs.
    #[default]
    Strict,
    /// Content checks are skipped.
    Lenient,
}

impl ValidationMode {
    /// Reports whether content checks run.
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown validation mode '{other}'")),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_shm() {
        let options = RegistryOptions::default();
        assert_eq!(options.region_path, PathBuf::from(DEFAULT_REGION_PATH));
        assert_eq!(options.lock_path, PathBuf::from(DEFAULT_LOCK_PATH));
    }

    #[test]
    fn in_dir_keeps_files_together() {
        let options = RegistryOptions::in_dir("/tmp/x");
        assert!(options.region_path.starts_with("/tmp/x"));
        assert!(options.lock_path.starts_with("/tmp/x"));
        assert!(options.level_audit_path.starts_with("/tmp/x"));
    }

    #[test]
    fn validation_mode_parses() {
        assert_eq!("strict".parse(), Ok(ValidationMode::Strict));
        assert_eq!("lenient".parse(), Ok(ValidationMode::Lenient));
        assert!("loose".parse::<ValidationMode>().is_err());
        assert_eq!(ValidationMode::Lenient.to_string(), "lenient");
    }
}
