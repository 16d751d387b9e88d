//! crates/registry/src/registry.rs
//!
//! The [`Registry`] type: attachment to the shared region and every
//! operation that reads or mutates context state.

use std::path::Path;

use crate::audit;
use crate::context::{ContextFlags, ContextHandle, ContextInfo};
use crate::error::{LogError, LogResult};
use crate::level::Level;
use crate::lock::{RegistryGuard, RegistryLock};
use crate::options::RegistryOptions;
use crate::region::{ConsoleRanges, RawContext, RegionLayout, RegionState};
use crate::store::{SharedStore, StoreError};

/// Result of [`Registry::attach`].
#[derive(Debug)]
pub struct Attached {
    /// The attached registry.
    pub registry: Registry,
    /// True when this call initialised the shared region. The first
    /// attacher is expected to apply configuration files.
    pub created: bool,
}

/// Registry of named logging contexts, shared between processes through a
/// mapped region or, when that is unavailable, private to this process.
#[derive(Debug)]
pub struct Registry {
    store: SharedStore,
    lock: RegistryLock,
    options: RegistryOptions,
}

impl Registry {
    /// Attaches to the shared region named by `options`, creating and
    /// initialising it on first use.
    ///
    /// Never fails: if the region cannot be opened, mapped or carries a
    /// foreign signature, the registry falls back to process-local defaults
    /// and traces a warning.
    pub fn attach(options: RegistryOptions) -> Attached {
        let lock = RegistryLock::open(&options.lock_path);
        match Self::attach_shared(&options, &lock) {
            Ok((store, created)) => {
                tracing::debug!(
                    region = %options.region_path.display(),
                    created,
                    "attached to shared registry"
                );
                Attached {
                    registry: Self {
                        store,
                        lock,
                        options,
                    },
                    created,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "shared registry unavailable; using process-local defaults");
                Attached {
                    registry: Self::local(options),
                    created: false,
                }
            }
        }
    }

    /// Registry private to this process, initialised with the compiled-in
    /// defaults.
    pub fn local(options: RegistryOptions) -> Self {
        Self {
            store: SharedStore::local(),
            lock: RegistryLock::process_local(),
            options,
        }
    }

    fn attach_shared(
        options: &RegistryOptions,
        lock: &RegistryLock,
    ) -> Result<(SharedStore, bool), StoreError> {
        let store = SharedStore::open_shared(&options.region_path)?;
        let _guard = lock.lock();
        match store.layout().state() {
            RegionState::Uninitialized => {
                store.layout().initialize();
                Ok((store, true))
            }
            RegionState::Valid => Ok((store, false)),
            RegionState::Foreign(signature) => Err(StoreError::ForeignSignature {
                path: options.region_path.clone(),
                signature,
            }),
        }
    }

    /// Reports whether the registry is backed by the shared region.
    pub fn is_shared(&self) -> bool {
        self.store.is_shared()
    }

    /// Backing file of the shared region, `None` when process-local.
    pub fn region_path(&self) -> Option<&Path> {
        self.store.path()
    }

    /// Reports whether mutations exclude other processes.
    pub fn has_cross_process_lock(&self) -> bool {
        self.lock.is_cross_process()
    }

    /// Options the registry was attached with.
    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub(crate) fn layout(&self) -> &RegionLayout {
        self.store.layout()
    }

    pub(crate) fn lock(&self) -> RegistryGuard<'_> {
        self.lock.lock()
    }

    #[cfg(test)]
    pub(crate) fn lock_is_held(&self) -> bool {
        self.lock.is_held()
    }

    /// Maps a handle to its record. No registration check: slots are never
    /// freed, so any in-bounds handle names a stable record.
    pub(crate) fn raw(&self, handle: ContextHandle) -> LogResult<&RawContext> {
        match handle.slot() {
            None => Ok(self.layout().global()),
            Some(slot) => self.layout().slot(slot).ok_or(LogError::InvalidContext),
        }
    }

    /// Number of contexts, global included.
    pub fn context_count(&self) -> usize {
        1 + self.layout().context_count()
    }

    /// Handle of the context at `index`: `0` is global, `1..` follow
    /// creation order.
    pub fn context_at(&self, index: usize) -> LogResult<ContextHandle> {
        if index < self.context_count() {
            Ok(ContextHandle::from_index(index))
        } else {
            Err(LogError::InvalidContextIndex)
        }
    }

    /// Reports whether `handle` names the global context or a slot in use.
    pub fn is_registered(&self, handle: ContextHandle) -> bool {
        handle
            .slot()
            .is_none_or(|slot| slot < self.layout().context_count())
    }

    /// Snapshot of one context.
    pub fn info(&self, handle: ContextHandle) -> LogResult<ContextInfo> {
        let raw = self.raw(handle)?;
        Ok(ContextInfo {
            handle,
            name: raw.name(),
            level: raw.level(),
            flags: raw.flags(),
        })
    }

    /// Snapshots of every context, global first.
    pub fn contexts(&self) -> Vec<ContextInfo> {
        (0..self.context_count())
            .filter_map(|index| self.info(ContextHandle::from_index(index)).ok())
            .collect()
    }

    /// Name of the context.
    pub fn context_name(&self, handle: ContextHandle) -> LogResult<String> {
        self.raw(handle).map(RawContext::name)
    }

    /// Copies the context name into `buffer` as a NUL-terminated byte
    /// string and returns the full name length.
    ///
    /// A buffer of one byte or less is `InvalidParameter`. A buffer that
    /// cannot hold the whole name receives a truncated copy and the call
    /// returns `BufferTooSmall`.
    pub fn context_name_into(&self, handle: ContextHandle, buffer: &mut [u8]) -> LogResult<usize> {
        if let Some(first) = buffer.first_mut() {
            *first = 0;
        }
        let name = self.context_name(handle)?;
        if buffer.len() <= 1 {
            return Err(LogError::InvalidParameter);
        }
        let copied = name.len().min(buffer.len() - 1);
        buffer[..copied].copy_from_slice(&name.as_bytes()[..copied]);
        buffer[copied] = 0;
        if buffer.len() < name.len() + 1 {
            return Err(LogError::BufferTooSmall);
        }
        Ok(name.len())
    }

    /// Enabled level of the context. Lock-free.
    pub fn level(&self, handle: ContextHandle) -> LogResult<Level> {
        self.raw(handle).map(RawContext::level)
    }

    /// Sets the enabled level of the context.
    ///
    /// In developer mode the change is first appended to the audit file;
    /// that write happens before the registry lock is taken.
    pub fn set_level(&self, handle: ContextHandle, level: Level) -> LogResult<()> {
        let raw = self.raw(handle)?;
        if self.dev_mode() {
            if let Err(error) = audit::record_level_change(
                &self.options.level_audit_path,
                &raw.name(),
                raw.level(),
                level,
            ) {
                tracing::debug!(
                    path = %self.options.level_audit_path.display(),
                    %error,
                    "level audit write failed"
                );
            }
        }
        let _guard = self.lock();
        raw.set_level(level);
        Ok(())
    }

    /// Behaviour flags of the context. Lock-free.
    pub fn flags(&self, handle: ContextHandle) -> LogResult<ContextFlags> {
        self.raw(handle).map(RawContext::flags)
    }

    /// Sets or clears `flags` on the context and marks it overridden.
    pub fn set_flags(&self, handle: ContextHandle, flags: ContextFlags, on: bool) -> LogResult<()> {
        let raw = self.raw(handle)?;
        let _guard = self.lock();
        let mut current = raw.flags();
        current.set(flags, on);
        current.insert(ContextFlags::OVERRIDDEN);
        raw.set_flags(current);
        Ok(())
    }

    /// Replaces the context's flags wholesale, `OVERRIDDEN` bit included.
    pub fn replace_flags(&self, handle: ContextHandle, flags: ContextFlags) -> LogResult<()> {
        let raw = self.raw(handle)?;
        let _guard = self.lock();
        raw.set_flags(flags);
        Ok(())
    }

    /// Copies the global flags onto every context whose flags were never
    /// set explicitly.
    pub fn reset_unoverridden_flags(&self) {
        let layout = self.layout();
        let _guard = self.lock();
        let global = layout.global().flags();
        for context in layout.active() {
            if !context.flags().contains(ContextFlags::OVERRIDDEN) {
                context.set_flags(global);
            }
        }
    }

    /// Whether per-context configuration files are honoured.
    pub fn context_logging(&self) -> bool {
        self.layout().context_logging()
    }

    /// Sets the per-context configuration switch.
    pub fn set_context_logging(&self, enabled: bool) {
        let _guard = self.lock();
        self.layout().set_context_logging(enabled);
    }

    /// Whether developer mode (level-change auditing) is on.
    pub fn dev_mode(&self) -> bool {
        self.layout().dev_mode()
    }

    /// Turns developer mode on or off.
    pub fn set_dev_mode(&self, enabled: bool) {
        let _guard = self.lock();
        self.layout().set_dev_mode(enabled);
    }

    /// Console echo ranges.
    pub fn console_ranges(&self) -> ConsoleRanges {
        self.layout().console()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DEFAULT_LIB_CONTEXT_NAME, GLOBAL_CONTEXT_NAME};

    fn local() -> Registry {
        Registry::local(RegistryOptions::default())
    }

    #[test]
    fn local_registry_has_global_and_default_lib() {
        let registry = local();
        assert!(!registry.is_shared());
        assert_eq!(registry.context_count(), 2);
        assert_eq!(
            registry.context_name(ContextHandle::GLOBAL).expect("global"),
            GLOBAL_CONTEXT_NAME
        );
        let lib = registry.context_at(1).expect("index 1");
        assert_eq!(registry.context_name(lib).expect("lib"), DEFAULT_LIB_CONTEXT_NAME);
    }

    #[test]
    fn context_at_rejects_out_of_range() {
        let registry = local();
        assert_eq!(registry.context_at(2), Err(LogError::InvalidContextIndex));
    }

    #[test]
    fn context_name_into_reports_truncation() {
        let registry = local();
        let mut small = [0xffu8; 4];
        assert_eq!(
            registry.context_name_into(ContextHandle::GLOBAL, &mut small),
            Err(LogError::BufferTooSmall)
        );
        assert_eq!(&small, b"<gl\0");

        let mut exact = [0u8; 9];
        assert_eq!(
            registry.context_name_into(ContextHandle::GLOBAL, &mut exact),
            Ok(8)
        );
        assert_eq!(&exact, b"<global>\0");

        let mut tiny = [0u8; 1];
        assert_eq!(
            registry.context_name_into(ContextHandle::GLOBAL, &mut tiny),
            Err(LogError::InvalidParameter)
        );
    }

    #[test]
    fn set_flags_marks_overridden() {
        let registry = local();
        registry
            .set_flags(ContextHandle::GLOBAL, ContextFlags::LOG_TO_CONSOLE, true)
            .expect("set");
        let flags = registry.flags(ContextHandle::GLOBAL).expect("flags");
        assert!(flags.contains(ContextFlags::LOG_TO_CONSOLE | ContextFlags::OVERRIDDEN));

        registry
            .set_flags(ContextHandle::GLOBAL, ContextFlags::LOG_TO_CONSOLE, false)
            .expect("clear");
        let flags = registry.flags(ContextHandle::GLOBAL).expect("flags");
        assert_eq!(flags, ContextFlags::OVERRIDDEN);
    }

    #[test]
    fn out_of_bounds_handle_is_invalid() {
        let registry = local();
        let handle = ContextHandle::from_index(10_000);
        assert_eq!(registry.level(handle), Err(LogError::InvalidContext));
        assert!(!registry.is_registered(handle));
    }

    #[test]
    fn none_level_is_accepted() {
        let registry = local();
        registry.set_dev_mode(false);
        registry
            .set_level(ContextHandle::GLOBAL, Level::None)
            .expect("set none");
        assert_eq!(registry.level(ContextHandle::GLOBAL), Ok(Level::None));
    }
}
