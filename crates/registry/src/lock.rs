//! crates/registry/src/lock.rs
//!
//! Cross-process exclusion around registry mutations.
//!
//! An advisory `flock` on a shared lock file excludes other processes. An
//! in-process mutex is taken first so that threads of one process queue on
//! the mutex instead of on the file lock. `flock` locks belong to the open
//! file description, so two [`RegistryLock`]s opened on the same path also
//! exclude each other inside one process.
//!
//! Failing to take the file lock is not fatal: the operation continues
//! without cross-process exclusion and a warning is traced. This leaves a
//! known race window with other processes while the lock file is broken.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use fs2::FileExt;

/// Handle on the named lock.
#[derive(Debug)]
pub(crate) struct RegistryLock {
    file: Option<File>,
    local: Mutex<()>,
}

impl RegistryLock {
    /// Opens (creating if needed) the lock file at `path`.
    ///
    /// When the file cannot be opened, the lock degrades to in-process
    /// exclusion only.
    pub(crate) fn open(path: &Path) -> Self {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o666)
            .open(path);
        match file {
            Ok(file) => Self {
                file: Some(file),
                local: Mutex::new(()),
            },
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "registry lock file unavailable; continuing without cross-process exclusion"
                );
                Self::process_local()
            }
        }
    }

    /// Lock that only excludes threads of this process.
    pub(crate) fn process_local() -> Self {
        Self {
            file: None,
            local: Mutex::new(()),
        }
    }

    /// Reports whether the lock excludes other processes.
    pub(crate) fn is_cross_process(&self) -> bool {
        self.file.is_some()
    }

    /// Blocks until the lock is held.
    pub(crate) fn lock(&self) -> RegistryGuard<'_> {
        let local = self.local.lock().unwrap_or_else(PoisonError::into_inner);
        let (file, degraded) = match self.file.as_ref().map(|file| (file, file.lock_exclusive())) {
            Some((file, Ok(()))) => (Some(file), None),
            Some((_, Err(error))) => (None, Some(error)),
            None => (None, None),
        };
        RegistryGuard {
            file,
            degraded,
            local: Some(local),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self) -> bool {
        self.local.try_lock().is_err()
    }
}

/// Held lock. Dropping it releases the file lock, then the mutex, and only
/// then traces any lock failure seen while it was held.
#[must_use = "the registry lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub(crate) struct RegistryGuard<'a> {
    file: Option<&'a File>,
    degraded: Option<io::Error>,
    local: Option<MutexGuard<'a, ()>>,
}

impl Drop for RegistryGuard<'_> {
    fn drop(&mut self) {
        let unlock_error = self
            .file
            .take()
            .and_then(|file| FileExt::unlock(file).err());
        drop(self.local.take());

        if let Some(error) = self.degraded.take() {
            tracing::warn!(%error, "registry lock failed; proceeded without exclusion");
        }
        if let Some(error) = unlock_error {
            tracing::warn!(%error, "registry unlock failed");
        }
    }
}
