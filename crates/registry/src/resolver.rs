//! crates/registry/src/resolver.rs
//!
//! Name resolution: lookup, creation and dotted-hierarchy inheritance.

use crate::context::{ContextFlags, ContextHandle, ancestors, validate_name};
use crate::error::{LogError, LogResult};
use crate::level::Level;
use crate::registry::Registry;

impl Registry {
    /// Returns the handle for `name`, creating the context if needed.
    ///
    /// `None` names the global context. A new context inherits the level
    /// and flags of its closest registered dotted ancestor (`"A.B"` then
    /// `"A"` for `"A.B.C"`), or of the global context when no ancestor is
    /// registered.
    ///
    /// When every slot is taken the global handle is returned instead of an
    /// error, so the caller's output lands in the global context.
    pub fn get_or_create(&self, name: Option<&str>) -> LogResult<ContextHandle> {
        let Some(name) = name else {
            return Ok(ContextHandle::GLOBAL);
        };
        validate_name(name)?;

        let appended = {
            let _guard = self.lock();
            if let Some(handle) = self.lookup(name) {
                return Ok(handle);
            }
            let (level, flags) = self.inherited_settings(name);
            self.layout()
                .append(name, level, flags)
                .map(|slot| (slot, level))
        };

        // Events go out after the lock is released.
        match appended {
            Some((slot, level)) => {
                tracing::debug!(context = name, %level, "registered context");
                Ok(ContextHandle::from_slot(slot))
            }
            None => {
                tracing::warn!(
                    context = name,
                    "context capacity exhausted; falling back to the global context"
                );
                Ok(ContextHandle::GLOBAL)
            }
        }
    }

    /// Looks up an existing context without creating it.
    pub fn find(&self, name: &str) -> LogResult<ContextHandle> {
        validate_name(name)?;
        let _guard = self.lock();
        self.lookup(name).ok_or(LogError::ContextNotFound)
    }

    /// Linear scan, global first then creation order. Callers hold the lock.
    fn lookup(&self, name: &str) -> Option<ContextHandle> {
        let layout = self.layout();
        if layout.global().name_eq(name) {
            return Some(ContextHandle::GLOBAL);
        }
        layout
            .active()
            .iter()
            .position(|context| context.name_eq(name))
            .map(ContextHandle::from_slot)
    }

    /// Settings of the closest registered ancestor, or of global.
    fn inherited_settings(&self, name: &str) -> (Level, ContextFlags) {
        let layout = self.layout();
        let active = layout.active();
        let source = ancestors(name)
            .find_map(|parent| active.iter().find(|context| context.name_eq(parent)))
            .unwrap_or_else(|| layout.global());
        (source.level(), source.flags())
    }
}
