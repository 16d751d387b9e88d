//! crates/logging/src/options.rs
//! Start-up options of a [`Logger`](crate::Logger).

use std::path::PathBuf;

use config::ConfigPaths;
use logging_sink::SyslogFacility;
use registry::{RegistryOptions, ValidationMode};

/// Default identifier written into every system-log line.
pub const DEFAULT_IDENTIFIER: &str = "sharelog";

/// Environment variables read by [`Options::from_env`].
pub mod env {
    /// Region backing file.
    pub const REGION: &str = "SHARELOG_REGION";
    /// Registry lock file.
    pub const LOCK: &str = "SHARELOG_LOCK";
    /// Developer-mode audit file.
    pub const AUDIT_LOG: &str = "SHARELOG_AUDIT_LOG";
    /// Configuration directory.
    pub const CONFIG_DIR: &str = "SHARELOG_CONFIG_DIR";
    /// Overrides file.
    pub const OVERRIDES: &str = "SHARELOG_OVERRIDES";
    /// `strict` or `lenient`.
    pub const MODE: &str = "SHARELOG_MODE";
    /// System-log identifier.
    pub const IDENT: &str = "SHARELOG_IDENT";
    /// System-log facility name.
    pub const FACILITY: &str = "SHARELOG_FACILITY";
}

/// Everything a [`Logger`](crate::Logger) needs to start.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Options {
    /// Shared region, lock and audit file locations.
    pub registry: RegistryOptions,
    /// Configuration file locations.
    pub config: ConfigPaths,
    /// Whether content checks run.
    pub mode: ValidationMode,
    /// Identifier written into every system-log line.
    pub identifier: String,
    /// Facility used when opening the system log.
    pub facility: SyslogFacility,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            registry: RegistryOptions::default(),
            config: ConfigPaths::default(),
            mode: ValidationMode::default(),
            identifier: DEFAULT_IDENTIFIER.to_owned(),
            facility: SyslogFacility::default(),
        }
    }
}

impl Options {
    /// Defaults overlaid with the `SHARELOG_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable in
    /// [`env`]. Unparsable mode or facility values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        let path = |name: &str| lookup(name).filter(|value| !value.is_empty()).map(PathBuf::from);

        if let Some(value) = path(env::REGION) {
            options.registry.region_path = value;
        }
        if let Some(value) = path(env::LOCK) {
            options.registry.lock_path = value;
        }
        if let Some(value) = path(env::AUDIT_LOG) {
            options.registry.level_audit_path = value;
        }
        if let Some(value) = path(env::CONFIG_DIR) {
            options.config.config_dir = value;
        }
        if let Some(value) = path(env::OVERRIDES) {
            options.config.overrides_file = value;
        }
        if let Some(value) = lookup(env::MODE) {
            match value.parse() {
                Ok(mode) => options.mode = mode,
                Err(error) => tracing::warn!(variable = env::MODE, %error, "ignoring setting"),
            }
        }
        if let Some(value) = lookup(env::IDENT).filter(|value| !value.is_empty()) {
            options.identifier = value;
        }
        if let Some(value) = lookup(env::FACILITY) {
            match SyslogFacility::from_name(&value) {
                Some(facility) => options.facility = facility,
                None => tracing::warn!(
                    variable = env::FACILITY,
                    value = %value,
                    "ignoring unknown facility"
                ),
            }
        }
        options
    }

    /// Options keeping every file inside `dir`: region, lock and audit
    /// files, a `sharelog.d` configuration directory and an
    /// `overrides.conf` file.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            registry: RegistryOptions::in_dir(&dir),
            config: ConfigPaths {
                config_dir: dir.join("sharelog.d"),
                overrides_file: dir.join("overrides.conf"),
                ..ConfigPaths::default()
            },
            ..Self::default()
        }
    }
}
