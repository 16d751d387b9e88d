#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/registry/src/lib.rs
//!
//! # Overview
//!
//! `registry` holds the machine-wide table of logging contexts. Every
//! process that attaches maps the same fixed-size region, so a level set by
//! one process is immediately visible to all others.
//!
//! # Design
//!
//! - [`Registry::attach`] maps the region backing file and initialises it if
//!   this is the first attach since boot. Initialisation writes the
//!   compiled-in defaults (global context at `info`, one pre-registered
//!   default-library context) and publishes a signature last.
//! - Structural changes run under a cross-process advisory file lock.
//!   Emission-path reads (level and flags) never take the lock.
//! - Context slots are append-only. A [`ContextHandle`] is a slot index and
//!   stays valid for the life of the region.
//! - When the region cannot be used the registry quietly becomes
//!   process-local; logging keeps working without sharing.
//!
//! # Errors
//!
//! Operations return [`LogResult`] with the flat [`LogError`] taxonomy. Each
//! error carries a stable numeric code and a short debug name.
//!
//! # Examples
//!
//! ```
//! use registry::{Level, Registry, RegistryOptions};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let attached = Registry::attach(RegistryOptions::in_dir(dir.path()));
//! assert!(attached.created);
//!
//! let registry = attached.registry;
//! registry.set_dev_mode(false);
//! let app = registry.get_or_create(Some("APP")).unwrap();
//! registry.set_level(app, Level::Warning).unwrap();
//! let child = registry.get_or_create(Some("APP.UI")).unwrap();
//! assert_eq!(registry.level(child).unwrap(), Level::Warning);
//! ```

mod audit;
mod context;
mod error;
mod level;
mod lock;
mod options;
mod region;
mod registry;
mod resolver;
mod store;

pub use context::{
    ContextFlags, ContextHandle, ContextInfo, DEFAULT_LIB_CONTEXT_NAME, GLOBAL_CONTEXT_NAME,
    LEGACY_CONTEXT_NAME, MAX_CONTEXT_NAME_LEN, validate_name,
};
pub use error::{LogError, LogResult, debug_string, result_code};
pub use level::Level;
pub use options::{
    DEFAULT_LEVEL_AUDIT_PATH, DEFAULT_LOCK_PATH, DEFAULT_REGION_PATH, RegistryOptions,
    ValidationMode,
};
pub use region::{ConsoleRanges, DEFAULT_GLOBAL_LEVEL, DEFAULT_LIB_LEVEL, MAX_CONTEXTS, REGION_SIGNATURE};
pub use registry::{Attached, Registry};
pub use store::StoreError;
