//! crates/logging-sink/src/signals.rs
//!
//! Scoped guards that keep a sink write observably side-effect free: the
//! signal mask is fully blocked while a line reaches syslog(3), and the
//! calling thread's `errno` is restored once the write completes.

use nix::errno::Errno;
use nix::sys::signal::{SigSet, SigmaskHow, pthread_sigmask};

/// Blocks every signal on the current thread until dropped.
///
/// A signal handler that interrupts a system-log write and logs again would
/// otherwise re-enter syslog(3) with its internal lock held. Dropping the
/// guard reinstates the mask that was active before [`block_all`](Self::block_all).
#[must_use = "dropping the guard immediately restores the previous signal mask"]
#[derive(Debug)]
pub struct SignalMaskGuard {
    previous: Option<SigSet>,
}

impl SignalMaskGuard {
    /// Blocks all signals and remembers the previous mask.
    ///
    /// Failure to change the mask is not fatal; the guard then restores
    /// nothing and the write proceeds with signals deliverable.
    pub fn block_all() -> Self {
        let mut previous = SigSet::empty();
        match pthread_sigmask(
            SigmaskHow::SIG_SETMASK,
            Some(&SigSet::all()),
            Some(&mut previous),
        ) {
            Ok(()) => Self {
                previous: Some(previous),
            },
            Err(error) => {
                tracing::debug!(%error, "unable to block signals around system-log write");
                Self { previous: None }
            }
        }
    }

    /// Reports whether the guard actually replaced the signal mask.
    pub const fn is_active(&self) -> bool {
        self.previous.is_some()
    }
}

impl Drop for SignalMaskGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let _ = pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&previous), None);
        }
    }
}

/// Restores the thread's `errno` when dropped.
#[must_use = "dropping the guard immediately restores errno"]
#[derive(Debug)]
pub struct ErrnoGuard {
    saved: i32,
}

impl ErrnoGuard {
    /// Captures the current `errno`.
    pub fn save() -> Self {
        Self {
            saved: Errno::last_raw(),
        }
    }

    /// Returns the captured value.
    pub const fn saved(&self) -> i32 {
        self.saved
    }
}

impl Drop for ErrnoGuard {
    fn drop(&mut self) {
        Errno::set_raw(self.saved);
    }
}
