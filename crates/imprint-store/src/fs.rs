//! Filesystem-backed file store.

use std::io;
use std::path::{Path, PathBuf};

use imprint_core::{FileRead, FileStore, Scope, StoreError};
use tracing::debug;

use crate::layout::MemoryLayout;

/// Reads memory files from the local filesystem.
///
/// Reads are not cached; every call sees the current disk state.
#[derive(Clone, Debug)]
pub struct FsFileStore {
    layout: MemoryLayout,
}

impl FsFileStore {
    /// Create a store that discovers roots using `layout`.
    #[must_use]
    pub fn new(layout: MemoryLayout) -> Self {
        Self { layout }
    }

    /// The layout used for root discovery.
    #[must_use]
    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }
}

impl FileStore for FsFileStore {
    fn exists(&self, _scope: Scope, path: &Path) -> Result<bool, StoreError> {
        Ok(path.is_file())
    }

    fn read(&self, path: &Path) -> Result<FileRead, StoreError> {
        if path.is_dir() {
            return Ok(FileRead::ReadError("is a directory".into()));
        }
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(FileRead::Found(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileRead::NotFound),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(FileRead::ReadError("file is not valid UTF-8".into()))
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "memory file unreadable");
                Ok(FileRead::ReadError(e.to_string()))
            }
        }
    }

    fn list_roots(&self, scope: Scope) -> Result<Vec<PathBuf>, StoreError> {
        let roots = self.layout.roots(scope);
        debug!(%scope, count = roots.len(), "listed memory roots");
        Ok(roots)
    }
}
