//! In-memory file store.
//!
//! Same contract as the filesystem store, backed by a map. Paths are used as
//! given, so callers should insert canonical absolute paths. Supports builder
//! setup (`with_file`, `with_root`) and mutation through `&self` so a shared
//! store can simulate files changing or the store going offline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use imprint_core::{FileRead, FileStore, Scope, StoreError};
use parking_lot::RwLock;

#[derive(Clone, Debug)]
enum Entry {
    Text(String),
    Unreadable(String),
}

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<PathBuf, Entry>,
    roots: HashMap<Scope, Vec<PathBuf>>,
    outage: Option<String>,
}

/// Map-backed [`FileStore`].
#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    inner: RwLock<Inner>,
}

impl InMemoryFileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a readable file.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert_file(path, text);
        self
    }

    /// Builder: add a file that exists but fails to read.
    #[must_use]
    pub fn with_unreadable(self, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        let _ = self
            .inner
            .write()
            .files
            .insert(path.into(), Entry::Unreadable(message.into()));
        self
    }

    /// Builder: add a readable file and list it as a root of `scope`.
    #[must_use]
    pub fn with_root(
        self,
        scope: Scope,
        path: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> Self {
        let path = path.into();
        self.insert_file(path.clone(), text);
        self.inner.write().roots.entry(scope).or_default().push(path);
        self
    }

    /// Add or replace a readable file.
    pub fn insert_file(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let _ = self
            .inner
            .write()
            .files
            .insert(path.into(), Entry::Text(text.into()));
    }

    /// Remove a file. Root listings are left untouched.
    pub fn remove_file(&self, path: &Path) -> bool {
        self.inner.write().files.remove(path).is_some()
    }

    /// Make every call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, reason: impl Into<String>) {
        self.inner.write().outage = Some(reason.into());
    }

    /// Clear a previous [`set_unavailable`](Self::set_unavailable).
    pub fn set_available(&self) {
        self.inner.write().outage = None;
    }

    /// Number of files held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().files.len()
    }

    /// Whether the store holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().files.is_empty()
    }
}

fn check_available(inner: &Inner) -> Result<(), StoreError> {
    match &inner.outage {
        Some(reason) => Err(StoreError::Unavailable(reason.clone())),
        None => Ok(()),
    }
}

impl FileStore for InMemoryFileStore {
    fn exists(&self, _scope: Scope, path: &Path) -> Result<bool, StoreError> {
        let inner = self.inner.read();
        check_available(&inner)?;
        Ok(inner.files.contains_key(path))
    }

    fn read(&self, path: &Path) -> Result<FileRead, StoreError> {
        let inner = self.inner.read();
        check_available(&inner)?;
        Ok(match inner.files.get(path) {
            Some(Entry::Text(text)) => FileRead::Found(text.clone()),
            Some(Entry::Unreadable(message)) => FileRead::ReadError(message.clone()),
            None => FileRead::NotFound,
        })
    }

    fn list_roots(&self, scope: Scope) -> Result<Vec<PathBuf>, StoreError> {
        let inner = self.inner.read();
        check_available(&inner)?;
        Ok(inner.roots.get(&scope).cloned().unwrap_or_default())
    }
}
