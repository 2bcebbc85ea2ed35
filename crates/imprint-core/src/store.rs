//! The file store capability consumed by the resolver.
//!
//! The resolver never touches the filesystem directly. Everything it reads
//! goes through [`FileStore`], so the same algorithm runs against the real
//! filesystem and against an in-memory fake.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::scope::Scope;

/// Outcome of reading one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileRead {
    /// File exists and was decoded as text.
    Found(String),
    /// Nothing exists at the path.
    NotFound,
    /// File exists but could not be read (permissions, encoding, ...).
    ReadError(String),
}

/// Store-level failure. Unlike a missing or unreadable file, this means no
/// meaningful result can be produced at all.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store itself is unreachable.
    #[error("file store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to memory files.
///
/// Implementations must be safe to share between threads; independent
/// resolutions may run concurrently against one store.
pub trait FileStore: Send + Sync {
    /// Whether a file exists at `path` for the given scope.
    fn exists(&self, scope: Scope, path: &Path) -> Result<bool, StoreError>;

    /// Read the text of the file at `path`.
    fn read(&self, path: &Path) -> Result<FileRead, StoreError>;

    /// Root memory documents for a scope, in listing order.
    fn list_roots(&self, scope: Scope) -> Result<Vec<PathBuf>, StoreError>;
}

impl<T: FileStore + ?Sized> FileStore for &T {
    fn exists(&self, scope: Scope, path: &Path) -> Result<bool, StoreError> {
        (**self).exists(scope, path)
    }

    fn read(&self, path: &Path) -> Result<FileRead, StoreError> {
        (**self).read(path)
    }

    fn list_roots(&self, scope: Scope) -> Result<Vec<PathBuf>, StoreError> {
        (**self).list_roots(scope)
    }
}

impl<T: FileStore + ?Sized> FileStore for Arc<T> {
    fn exists(&self, scope: Scope, path: &Path) -> Result<bool, StoreError> {
        (**self).exists(scope, path)
    }

    fn read(&self, path: &Path) -> Result<FileRead, StoreError> {
        (**self).read(path)
    }

    fn list_roots(&self, scope: Scope) -> Result<Vec<PathBuf>, StoreError> {
        (**self).list_roots(scope)
    }
}
