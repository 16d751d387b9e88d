//! crates/registry/src/store.rs
//!
//! Backing storage for the region: a shared file mapping, or a private
//! heap copy when the mapping cannot be used.
#![allow(unsafe_code)]

use std::fs::{File, OpenOptions};
use std::io;
use std::mem::{align_of, size_of};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use memmap2::{MmapOptions, MmapRaw};
use thiserror::Error;

use crate::region::RegionLayout;

/// Reasons the shared store could not be used.
///
/// These never reach callers of the public API: the registry logs them and
/// falls back to a process-local region.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be opened or created.
    #[error("failed to open shared region {path}: {source}")]
    Open {
        /// Backing file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The backing file could not be grown to the region size.
    #[error("failed to size shared region {path}: {source}")]
    Size {
        /// Backing file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Mapping the file failed.
    #[error("failed to map shared region {path}: {source}")]
    Map {
        /// Backing file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The mapping is too small or misaligned for the layout.
    #[error("shared region {path} has an unusable mapping")]
    Layout {
        /// Backing file path.
        path: PathBuf,
    },
    /// The region carries a signature this library does not know.
    #[error("shared region {path} has foreign signature {signature:#010x}")]
    ForeignSignature {
        /// Backing file path.
        path: PathBuf,
        /// Signature found in the region.
        signature: u32,
    },
}

enum Backing {
    Mapped {
        map: MmapRaw,
        path: PathBuf,
        _file: File,
    },
    Local(Box<RegionLayout>),
}

/// Owner of the region memory.
pub(crate) struct SharedStore {
    backing: Backing,
}

impl std::fmt::Debug for SharedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.backing {
            Backing::Mapped { path, .. } => f.debug_tuple("SharedStore::Mapped").field(path).finish(),
            Backing::Local(_) => f.write_str("SharedStore::Local"),
        }
    }
}

impl SharedStore {
    /// Opens (creating if needed) and maps the backing file.
    ///
    /// A new or short file is extended with zeros, which reads as an
    /// uninitialised region.
    pub(crate) fn open_shared(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o666)
            .open(path)
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let size = size_of::<RegionLayout>() as u64;
        let current = file
            .metadata()
            .map_err(|source| StoreError::Size {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if current < size {
            file.set_len(size).map_err(|source| StoreError::Size {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let map = MmapOptions::new()
            .len(size_of::<RegionLayout>())
            .map_raw(&file)
            .map_err(|source| StoreError::Map {
                path: path.to_path_buf(),
                source,
            })?;

        if map.len() < size_of::<RegionLayout>()
            || map.as_ptr().align_offset(align_of::<RegionLayout>()) != 0
        {
            return Err(StoreError::Layout {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            backing: Backing::Mapped {
                map,
                path: path.to_path_buf(),
                _file: file,
            },
        })
    }

    /// Private region initialised with the compiled-in defaults.
    pub(crate) fn local() -> Self {
        let layout = Box::new(RegionLayout::zeroed());
        layout.initialize();
        Self {
            backing: Backing::Local(layout),
        }
    }

    pub(crate) fn is_shared(&self) -> bool {
        matches!(self.backing, Backing::Mapped { .. })
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Mapped { path, .. } => Some(path),
            Backing::Local(_) => None,
        }
    }

    pub(crate) fn layout(&self) -> &RegionLayout {
        match &self.backing {
            // SAFETY: the mapping is at least `size_of::<RegionLayout>()`
            // bytes and suitably aligned (checked in `open_shared`), it lives
            // as long as `self`, and every field of `RegionLayout` is an
            // atomic for which any bit pattern is valid. Concurrent writers
            // in other processes only ever go through those atomics.
            Backing::Mapped { map, .. } => unsafe { &*map.as_mut_ptr().cast::<RegionLayout>() },
            Backing::Local(layout) => &**layout,
        }
    }
}
