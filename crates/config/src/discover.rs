//! crates/config/src/discover.rs
//! Where configuration files live and how the directory is enumerated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default configuration directory.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/sharelog.d";
/// Name of the default file inside the configuration directory.
pub const DEFAULT_CONFIG_FILE: &str = "default.conf";
/// Default overrides file, applied after everything else.
pub const DEFAULT_OVERRIDES_FILE: &str = "/var/preferences/sharelog/overrides.conf";

const CONFIG_SUFFIX: &str = ".conf";

/// Configuration file locations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigPaths {
    /// Directory scanned for `*.conf` files.
    pub config_dir: PathBuf,
    /// File name of the default file inside `config_dir`.
    pub default_file: String,
    /// Overrides file applied last.
    pub overrides_file: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            default_file: DEFAULT_CONFIG_FILE.to_owned(),
            overrides_file: PathBuf::from(DEFAULT_OVERRIDES_FILE),
        }
    }
}

impl ConfigPaths {
    /// Full path of the default file.
    pub fn default_path(&self) -> PathBuf {
        self.config_dir.join(&self.default_file)
    }

    /// Lists the per-context files of the configuration directory in name
    /// order: visible `*.conf` files other than the default file.
    pub fn context_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.config_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !is_context_file(name, &self.default_file) {
                continue;
            }
            if entry.file_type().is_ok_and(|kind| !kind.is_dir()) {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

fn is_context_file(name: &str, default_file: &str) -> bool {
    !name.starts_with('.') && name.ends_with(CONFIG_SUFFIX) && name != default_file
}

/// Reports whether `path` names a regular file.
pub(crate) fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}
