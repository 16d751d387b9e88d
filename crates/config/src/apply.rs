//! crates/config/src/apply.rs
//!
//! Applies configuration documents to a [`Registry`].
//!
//! Every problem with a file or an entry becomes one diagnostic line under
//! the library component; processing always continues with the next entry
//! and the next file.

use std::fmt;
use std::path::Path;

use logging_sink::{Diagnostics, LIBRARY_COMPONENT, process};
use registry::{ContextFlags, ContextHandle, Level, LogError, Registry, ValidationMode};

use crate::discover::{ConfigPaths, is_regular_file};
use crate::document::{ConfigDocument, ContextEntry, FlagValue, OverrideEntry};
use crate::error::EntryError;

const NO_PIDTID: &str = "[]";

/// Applies configuration to one registry, reporting through `diagnostics`.
#[derive(Clone, Copy, Debug)]
pub struct ConfigApplier<'a> {
    registry: &'a Registry,
    diagnostics: Diagnostics<'a>,
}

impl<'a> ConfigApplier<'a> {
    /// Binds an applier to `registry`.
    pub fn new(registry: &'a Registry, diagnostics: Diagnostics<'a>) -> Self {
        Self {
            registry,
            diagnostics,
        }
    }

    /// Reads `path`.
    ///
    /// An unreadable or malformed file yields `None` after a `JSON_PARSE_ERR`
    /// diagnostic. A file that names no context and has no overrides is
    /// reported as `CTX_MISSING` but still returned.
    pub fn load(&self, path: &Path) -> Option<ConfigDocument> {
        let document = match ConfigDocument::load(path) {
            Ok(document) => document,
            Err(error) => {
                tracing::debug!(file = %path.display(), %error, "configuration file rejected");
                self.report(format_args!(
                    "JSON_PARSE_ERR {{\"file\":\"{}\"}}",
                    path.display()
                ));
                return None;
            }
        };
        if !document.names_any_context() && !document.has_overrides() {
            self.report(format_args!(
                "CTX_MISSING {{\"file\":\"{}\"}}",
                path.display()
            ));
        }
        Some(document)
    }

    /// Honours `contextLogging` from `document`.
    pub fn apply_context_logging(&self, document: &ConfigDocument) {
        match document.context_logging() {
            FlagValue::Absent => {}
            FlagValue::Set(enabled) => self.registry.set_context_logging(enabled),
            FlagValue::Invalid => self.report(format_args!(
                "INV_CTXFLAG {{\"file\":\"{}\"}}",
                document.source().display()
            )),
        }
    }

    /// Applies the `contexts` array: creates each context and sets its
    /// level. Flags the entry names are set or cleared on top of the
    /// context's current flags; flags it leaves out keep their value.
    pub fn apply_context_entries(&self, document: &ConfigDocument) {
        let file = document.source().display();
        for entry in document.contexts() {
            match entry {
                Ok(entry) => self.apply_context_entry(document.source(), &entry),
                Err(error) => match &error {
                    EntryError::MissingLevel { name, .. }
                    | EntryError::InvalidLevelValue { name, .. } => self.report(format_args!(
                        "{} {{\"context\":\"{name}\",\"file\":\"{file}\"}}",
                        error.msgid()
                    )),
                    _ => self.report(format_args!(
                        "{} {{\"index\":{},\"file\":\"{file}\"}}",
                        error.msgid(),
                        error.index()
                    )),
                },
            }
        }
    }

    fn apply_context_entry(&self, source: &Path, entry: &ContextEntry) {
        let handle = match self.init_context(&entry.name, &entry.level) {
            Ok(handle) => handle,
            Err(reason) => {
                self.report(format_args!(
                    "INIT_CTX_ERR {{\"file\":\"{}\",\"context\":\"{}\",\"err\":\"{reason}\"}}",
                    source.display(),
                    entry.name
                ));
                return;
            }
        };

        let current = self.registry.flags(handle).unwrap_or_default();
        let pidtid = process::pid_tid_tag(
            current.contains(ContextFlags::LOG_PROCESS_IDS),
            current.contains(ContextFlags::LOG_THREAD_IDS),
        );

        let mut flags = current;
        let mut explicit = false;
        for (value, bit, msgid) in [
            (entry.log_process_ids, ContextFlags::LOG_PROCESS_IDS, "INV_PSID"),
            (entry.log_thread_ids, ContextFlags::LOG_THREAD_IDS, "INV_THID"),
            (entry.log_to_console, ContextFlags::LOG_TO_CONSOLE, "INV_LOG_TO_CON"),
        ] {
            match value {
                FlagValue::Absent => {}
                FlagValue::Set(on) => {
                    flags.set(bit, on);
                    explicit = true;
                }
                FlagValue::Invalid => self.diagnostics.error(
                    LIBRARY_COMPONENT,
                    &pidtid,
                    format_args!(
                        "{msgid} {{\"file\":\"{}\",\"context\":\"{}\"}}",
                        source.display(),
                        entry.name
                    ),
                ),
            }
        }
        if !explicit {
            return;
        }
        flags.insert(ContextFlags::OVERRIDDEN);
        if self.registry.replace_flags(handle, flags).is_err() {
            self.diagnostics.error(
                LIBRARY_COMPONENT,
                &pidtid,
                format_args!(
                    "SET_CTX_FLG_ERR {{\"file\":\"{}\",\"context\":\"{}\"}}",
                    source.display(),
                    entry.name
                ),
            );
        }
    }

    fn init_context(&self, name: &str, label: &str) -> Result<ContextHandle, String> {
        let level = Level::from_label(label).ok_or_else(|| "Failed to parse level".to_owned())?;
        let handle = self
            .registry
            .get_or_create(Some(name))
            .map_err(|error| format!("Error getting context: {}", error.debug_name()))?;
        self.registry
            .set_level(handle, level)
            .map_err(|error| format!("Error setting context level: {}", error.debug_name()))?;
        Ok(handle)
    }

    /// Applies the `overrides` array. A named override targets an existing
    /// context only; an unnamed one sets the level of every registered
    /// context, global included.
    pub fn apply_overrides(&self, document: &ConfigDocument) {
        for entry in document.overrides() {
            match entry {
                Ok(entry) => self.apply_override(document.source(), &entry),
                Err(error) => self.report(format_args!(
                    "{} {{\"file\":\"{}\",\"index\":{}}} Invalid override (ignoring)",
                    error.msgid(),
                    document.source().display(),
                    error.index()
                )),
            }
        }
    }

    fn apply_override(&self, source: &Path, entry: &OverrideEntry) {
        let Some(label) = entry.level.as_deref() else {
            return;
        };
        let Some(level) = Level::from_label(label) else {
            self.report(format_args!(
                "PARSE_ERROR {{\"file\":\"{}\",\"index\":{}}} Invalid log level \"{label}\" (ignoring)",
                source.display(),
                entry.index
            ));
            return;
        };

        let (target, outcome) = match entry.name.as_deref() {
            Some(name) => (
                name.to_owned(),
                self.registry
                    .find(name)
                    .and_then(|handle| self.registry.set_level(handle, level)),
            ),
            None => match self.set_all_levels(level) {
                Ok(()) => ("<all>".to_owned(), Ok(())),
                Err((name, error)) => (name, Err(error)),
            },
        };
        if let Err(error) = outcome {
            self.report(format_args!(
                "SET_CTX_LEVEL_FAIL {{\"file\":\"{}\", \"index\":{}}} Failed to set log level for {target}: {}",
                source.display(),
                entry.index,
                error.debug_name()
            ));
        }
    }

    /// Sets `level` on every registered context, stopping at the first
    /// failure and naming the context it happened on.
    fn set_all_levels(&self, level: Level) -> Result<(), (String, LogError)> {
        for index in 0..self.registry.context_count() {
            let handle = self
                .registry
                .context_at(index)
                .map_err(|error| ("<all>".to_owned(), error))?;
            if let Err(error) = self.registry.set_level(handle, level) {
                let name = self.registry.context_name(handle).unwrap_or_default();
                return Err((name, error));
            }
        }
        Ok(())
    }

    /// Discovers and applies every configuration source.
    ///
    /// The default file is read first and may switch `contextLogging` on.
    /// The remaining `*.conf` files of the directory are read only when that
    /// switch is on and validation is strict. Context entries of all those
    /// files are applied before any of their overrides. The overrides file
    /// comes last, even when the directory is missing.
    ///
    /// Returns whether the default file was found.
    pub fn discover_and_apply(&self, paths: &ConfigPaths, mode: ValidationMode) -> bool {
        let mut documents = Vec::new();
        let mut found_default = false;

        match paths.context_files() {
            Ok(files) => {
                let default_path = paths.default_path();
                if is_regular_file(&default_path) {
                    found_default = true;
                    if let Some(document) = self.load(&default_path) {
                        self.apply_context_logging(&document);
                        documents.push(document);
                    }
                }
                if mode.is_strict() && self.registry.context_logging() {
                    documents.extend(files.iter().filter_map(|path| self.load(path)));
                } else {
                    tracing::debug!(
                        %mode,
                        skipped = files.len(),
                        "per-context configuration files not consulted"
                    );
                }
            }
            Err(error) => {
                self.report(format_args!("DIR_OPEN_ERR {{\"Error\":\"{error}\"}}"));
            }
        }

        for document in &documents {
            self.apply_context_entries(document);
        }
        for document in &documents {
            self.apply_overrides(document);
        }

        if is_regular_file(&paths.overrides_file) {
            if let Some(document) = self.load(&paths.overrides_file) {
                self.apply_context_entries(&document);
                self.apply_overrides(&document);
            }
        }

        tracing::debug!(
            dir = %paths.config_dir.display(),
            files = documents.len(),
            found_default,
            "configuration applied"
        );
        found_default
    }

    /// Re-runs discovery, then points every context whose flags were never
    /// set explicitly back at the global flags.
    pub fn reload(&self, paths: &ConfigPaths, mode: ValidationMode) -> bool {
        let found_default = self.discover_and_apply(paths, mode);
        self.registry.reset_unoverridden_flags();
        found_default
    }

    fn report(&self, text: fmt::Arguments<'_>) {
        self.diagnostics.error(LIBRARY_COMPONENT, NO_PIDTID, text);
    }
}
