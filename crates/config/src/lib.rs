#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/config/src/lib.rs
//!
//! # Overview
//!
//! `config` turns JSON configuration files into registry state: context
//! levels, per-context flags, the per-context configuration switch and
//! level overrides.
//!
//! # Design
//!
//! - [`ConfigDocument`] is a typed view over one parsed file. It only
//!   classifies entries; it never touches the registry.
//! - [`ConfigApplier`] applies documents to a [`registry::Registry`] and
//!   reports every rejected file or entry as a diagnostic line through
//!   [`logging_sink::Diagnostics`].
//! - [`ConfigPaths`] names the configuration directory, its default file
//!   and the overrides file. [`ConfigApplier::discover_and_apply`] fixes the
//!   order in which they are consulted.
//!
//! # Invariants
//!
//! - A bad entry never stops the rest of its file, and a bad file never
//!   stops the remaining files.
//! - Overrides are applied after every context entry of every file, and the
//!   overrides file is applied last.
//!
//! # Examples
//!
//! ```
//! use config::{ConfigApplier, ConfigPaths};
//! use logging_sink::{Diagnostics, MemorySink};
//! use registry::{Level, Registry, RegistryOptions, ValidationMode};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join("default.conf"),
//!     r#"{"contexts":[{"name":"APP","level":"err"}]}"#,
//! )
//! .unwrap();
//!
//! let registry = Registry::local(RegistryOptions::default());
//! registry.set_dev_mode(false);
//! let sink = MemorySink::new();
//! let applier = ConfigApplier::new(&registry, Diagnostics::new(&sink, "doc"));
//! let paths = ConfigPaths {
//!     config_dir: dir.path().to_path_buf(),
//!     overrides_file: dir.path().join("overrides.json"),
//!     ..ConfigPaths::default()
//! };
//!
//! assert!(applier.discover_and_apply(&paths, ValidationMode::Strict));
//! let app = registry.find("APP").unwrap();
//! assert_eq!(registry.level(app).unwrap(), Level::Error);
//! ```

mod apply;
mod discover;
mod document;
mod error;

pub use apply::ConfigApplier;
pub use discover::{ConfigPaths, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, DEFAULT_OVERRIDES_FILE};
pub use document::{ConfigDocument, ContextEntry, FlagValue, OverrideEntry};
pub use error::{ConfigError, ConfigResult, EntryError};
