//! crates/registry/src/region.rs
//!
//! In-memory layout of the shared region.
//!
//! Every field is an atomic so that the same `repr(C)` structure can be
//! viewed through a shared mapping by several processes at once. Hot-path
//! readers (level gate, flag checks) use relaxed loads without the lock;
//! structural writers hold the [`RegistryLock`](crate::lock::RegistryLock).
//!
//! The signature is written last with release ordering. A reader that sees
//! [`REGION_SIGNATURE`] with acquire ordering sees a fully initialised
//! region.

use std::sync::atomic::{AtomicI32, AtomicU8, AtomicU32, Ordering};

use crate::context::{ContextFlags, DEFAULT_LIB_CONTEXT_NAME, GLOBAL_CONTEXT_NAME};
use crate::level::Level;

/// Magic value marking an initialised region ("SHLG").
pub const REGION_SIGNATURE: u32 = 0x5348_4C47;

/// Number of user context slots in the region.
pub const MAX_CONTEXTS: usize = 256;

/// Bytes reserved per context name, terminating NUL included.
const NAME_CAPACITY: usize = 32;

/// Level a freshly initialised global context starts with.
pub const DEFAULT_GLOBAL_LEVEL: Level = Level::Info;

/// Level the pre-registered default-library context starts with.
pub const DEFAULT_LIB_LEVEL: Level = Level::Info;

/// Level ranges that decide console echo.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConsoleRanges {
    /// Lowest numeric level echoed to stderr.
    pub stderr_min: Level,
    /// Highest numeric level echoed to stderr.
    pub stderr_max: Level,
    /// Lowest numeric level echoed to stdout.
    pub stdout_min: Level,
    /// Highest numeric level echoed to stdout.
    pub stdout_max: Level,
}

impl ConsoleRanges {
    /// `emerg..=err` on stderr, `warning..=debug` on stdout.
    pub const DEFAULT: Self = Self {
        stderr_min: Level::Emergency,
        stderr_max: Level::Error,
        stdout_min: Level::Warning,
        stdout_max: Level::Debug,
    };

    /// Reports whether `level` is echoed to stderr.
    pub fn stderr_contains(&self, level: Level) -> bool {
        (self.stderr_min..=self.stderr_max).contains(&level)
    }

    /// Reports whether `level` is echoed to stdout.
    pub fn stdout_contains(&self, level: Level) -> bool {
        (self.stdout_min..=self.stdout_max).contains(&level)
    }
}

impl Default for ConsoleRanges {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What the signature says about a region.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RegionState {
    /// Signature is zero; nobody initialised the region yet.
    Uninitialized,
    /// Signature matches.
    Valid,
    /// Signature is something else.
    Foreign(u32),
}

/// One context record.
#[repr(C)]
pub(crate) struct RawContext {
    level: AtomicI32,
    flags: AtomicU32,
    name: [AtomicU8; NAME_CAPACITY],
}

impl RawContext {
    const fn new() -> Self {
        Self {
            level: AtomicI32::new(0),
            flags: AtomicU32::new(0),
            name: [const { AtomicU8::new(0) }; NAME_CAPACITY],
        }
    }

    /// Enabled level. Out-of-range raw values read as `Debug`.
    pub(crate) fn level(&self) -> Level {
        Level::from_i32(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Debug)
    }

    pub(crate) fn set_level(&self, level: Level) {
        self.level.store(level.as_i32(), Ordering::Relaxed);
    }

    pub(crate) fn flags(&self) -> ContextFlags {
        ContextFlags::from_bits_retain(self.flags.load(Ordering::Relaxed))
    }

    pub(crate) fn set_flags(&self, flags: ContextFlags) {
        self.flags.store(flags.bits(), Ordering::Relaxed);
    }

    pub(crate) fn name(&self) -> String {
        let bytes: Vec<u8> = self
            .name
            .iter()
            .map(|byte| byte.load(Ordering::Relaxed))
            .take_while(|&byte| byte != 0)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub(crate) fn name_eq(&self, candidate: &str) -> bool {
        let candidate = candidate.as_bytes();
        if candidate.len() >= NAME_CAPACITY {
            return false;
        }
        candidate
            .iter()
            .chain(std::iter::once(&0))
            .zip(&self.name)
            .all(|(expected, stored)| stored.load(Ordering::Relaxed) == *expected)
    }

    /// Stores `name`, truncated to the slot capacity and NUL terminated.
    fn store_name(&self, name: &str) {
        let bytes = name.as_bytes();
        let len = bytes.len().min(NAME_CAPACITY - 1);
        for (index, slot) in self.name.iter().enumerate() {
            let byte = if index < len { bytes[index] } else { 0 };
            slot.store(byte, Ordering::Relaxed);
        }
    }

    fn fill(&self, name: &str, level: Level, flags: ContextFlags) {
        self.store_name(name);
        self.set_level(level);
        self.set_flags(flags);
    }
}

/// The region root.
#[repr(C)]
pub(crate) struct RegionLayout {
    signature: AtomicU32,
    reserved: AtomicU32,
    max_contexts: AtomicU32,
    context_count: AtomicU32,
    context_logging: AtomicU32,
    dev_mode: AtomicU32,
    console: [AtomicI32; 4],
    global: RawContext,
    contexts: [RawContext; MAX_CONTEXTS],
}

impl RegionLayout {
    /// All-zero layout, equivalent to a freshly created backing file.
    pub(crate) const fn zeroed() -> Self {
        Self {
            signature: AtomicU32::new(0),
            reserved: AtomicU32::new(0),
            max_contexts: AtomicU32::new(0),
            context_count: AtomicU32::new(0),
            context_logging: AtomicU32::new(0),
            dev_mode: AtomicU32::new(0),
            console: [const { AtomicI32::new(0) }; 4],
            global: RawContext::new(),
            contexts: [const { RawContext::new() }; MAX_CONTEXTS],
        }
    }

    pub(crate) fn state(&self) -> RegionState {
        match self.signature.load(Ordering::Acquire) {
            0 => RegionState::Uninitialized,
            REGION_SIGNATURE => RegionState::Valid,
            other => RegionState::Foreign(other),
        }
    }

    /// Writes the compiled-in defaults and publishes the signature.
    ///
    /// Callers hold the registry lock.
    pub(crate) fn initialize(&self) {
        self.reserved.store(0, Ordering::Relaxed);
        self.max_contexts.store(MAX_CONTEXTS as u32, Ordering::Relaxed);
        self.context_logging.store(0, Ordering::Relaxed);
        self.dev_mode.store(1, Ordering::Relaxed);
        self.store_console(ConsoleRanges::DEFAULT);
        self.global
            .fill(GLOBAL_CONTEXT_NAME, DEFAULT_GLOBAL_LEVEL, ContextFlags::empty());
        self.contexts[0].fill(
            DEFAULT_LIB_CONTEXT_NAME,
            DEFAULT_LIB_LEVEL,
            ContextFlags::empty(),
        );
        self.context_count.store(1, Ordering::Release);
        self.signature.store(REGION_SIGNATURE, Ordering::Release);
    }

    pub(crate) fn global(&self) -> &RawContext {
        &self.global
    }

    /// Number of user contexts in use.
    pub(crate) fn context_count(&self) -> usize {
        (self.context_count.load(Ordering::Acquire) as usize).min(MAX_CONTEXTS)
    }

    pub(crate) fn capacity(&self) -> usize {
        (self.max_contexts.load(Ordering::Relaxed) as usize).min(MAX_CONTEXTS)
    }

    /// User slot `index`, whether or not it is in use.
    pub(crate) fn slot(&self, index: usize) -> Option<&RawContext> {
        self.contexts.get(index)
    }

    /// User slots in use, in creation order.
    pub(crate) fn active(&self) -> &[RawContext] {
        &self.contexts[..self.context_count()]
    }

    /// Appends a context. Returns its slot, or `None` when full.
    ///
    /// Callers hold the registry lock.
    pub(crate) fn append(&self, name: &str, level: Level, flags: ContextFlags) -> Option<usize> {
        let index = self.context_count();
        if index >= self.capacity() {
            return None;
        }
        self.contexts[index].fill(name, level, flags);
        self.context_count.store(index as u32 + 1, Ordering::Release);
        Some(index)
    }

    pub(crate) fn context_logging(&self) -> bool {
        self.context_logging.load(Ordering::Relaxed) != 0
    }

    pub(crate) fn set_context_logging(&self, enabled: bool) {
        self.context_logging
            .store(u32::from(enabled), Ordering::Relaxed);
    }

    pub(crate) fn dev_mode(&self) -> bool {
        self.dev_mode.load(Ordering::Relaxed) != 0
    }

    pub(crate) fn set_dev_mode(&self, enabled: bool) {
        self.dev_mode.store(u32::from(enabled), Ordering::Relaxed);
    }

    pub(crate) fn console(&self) -> ConsoleRanges {
        let read = |index: usize, fallback: Level| {
            Level::from_i32(self.console[index].load(Ordering::Relaxed)).unwrap_or(fallback)
        };
        ConsoleRanges {
            stderr_min: read(0, ConsoleRanges::DEFAULT.stderr_min),
            stderr_max: read(1, ConsoleRanges::DEFAULT.stderr_max),
            stdout_min: read(2, ConsoleRanges::DEFAULT.stdout_min),
            stdout_max: read(3, ConsoleRanges::DEFAULT.stdout_max),
        }
    }

    fn store_console(&self, ranges: ConsoleRanges) {
        let values = [
            ranges.stderr_min,
            ranges.stderr_max,
            ranges.stdout_min,
            ranges.stdout_max,
        ];
        for (slot, level) in self.console.iter().zip(values) {
            slot.store(level.as_i32(), Ordering::Relaxed);
        }
    }
}
