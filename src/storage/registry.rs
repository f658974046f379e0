//! Entity registry
//!
//! Maps normalized logical paths to the single live handle for that path.
//! Entries are weak so handles are reclaimed once unreachable; identity holds
//! for every handle a caller still owns. `Storage` is the sole mutator and
//! nothing is ever evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::entity::{Directory, File};

/// A registered handle.
#[derive(Debug)]
pub(crate) enum CachedEntity {
    File(Weak<File>),
    Directory(Weak<Directory>),
}

impl CachedEntity {
    fn is_live(&self) -> bool {
        match self {
            CachedEntity::File(weak) => weak.strong_count() > 0,
            CachedEntity::Directory(weak) => weak.strong_count() > 0,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct EntityRegistry {
    entries: Mutex<HashMap<String, CachedEntity>>,
}

impl EntityRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedEntity>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lookup-or-insert a file handle for a normalized path.
    ///
    /// A registered entry of the other kind is replaced; a path denotes at
    /// most one kind at a time.
    pub(crate) fn file_or_insert<F>(&self, path: &str, create: F) -> Arc<File>
    where
        F: FnOnce() -> Arc<File>,
    {
        let mut entries = self.lock();
        if let Some(CachedEntity::File(weak)) = entries.get(path) {
            if let Some(existing) = weak.upgrade() {
                return existing;
            }
        }

        let file = create();
        entries.insert(path.to_string(), CachedEntity::File(Arc::downgrade(&file)));
        file
    }

    /// Lookup-or-insert a directory handle for a normalized path.
    pub(crate) fn directory_or_insert<F>(&self, path: &str, create: F) -> Arc<Directory>
    where
        F: FnOnce() -> Arc<Directory>,
    {
        let mut entries = self.lock();
        if let Some(CachedEntity::Directory(weak)) = entries.get(path) {
            if let Some(existing) = weak.upgrade() {
                return existing;
            }
        }

        let directory = create();
        entries.insert(
            path.to_string(),
            CachedEntity::Directory(Arc::downgrade(&directory)),
        );
        directory
    }

    /// The live handle registered at `path`, if any.
    pub(crate) fn get_live(&self, path: &str) -> Option<CachedHandle> {
        match self.lock().get(path)? {
            CachedEntity::File(weak) => weak.upgrade().map(CachedHandle::File),
            CachedEntity::Directory(weak) => weak.upgrade().map(CachedHandle::Directory),
        }
    }

    /// Move a registry entry to a new key after a path rewrite.
    ///
    /// Dead entries are dropped instead of carried under the new key.
    pub(crate) fn rekey(&self, old_path: &str, new_path: &str) {
        let mut entries = self.lock();
        if let Some(entry) = entries.remove(old_path) {
            if entry.is_live() {
                entries.insert(new_path.to_string(), entry);
            }
        }
    }
}

/// A live handle pulled out of the registry.
pub(crate) enum CachedHandle {
    File(Arc<File>),
    Directory(Arc<Directory>),
}
