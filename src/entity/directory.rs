//! Directory entity

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use super::{AsDirectoryPath, DirectoryElement};
use crate::error::StorageError;
use crate::paths::{base_name, join_path};
use crate::storage::Storage;

/// Handle to a directory at a logical path.
///
/// Renaming or moving a directory repoints every previously issued handle
/// for its descendants, without touching the backend again.
pub struct Directory {
    storage: Storage,
    path: RwLock<String>,
}

impl Directory {
    pub(crate) fn new(storage: Storage, path: String) -> Self {
        Self {
            storage,
            path: RwLock::new(path),
        }
    }

    /// Current logical path.
    pub fn path(&self) -> String {
        self.path
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_path(&self, path: &str) {
        *self.path.write().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }

    /// Last segment of the path.
    pub fn name(&self) -> String {
        base_name(&self.path()).to_string()
    }

    /// Absolute path under the storage's base path.
    pub fn full_path(&self) -> PathBuf {
        self.storage.resolve_path(&self.path())
    }

    pub fn is_file(&self) -> bool {
        false
    }

    pub fn is_directory(&self) -> bool {
        true
    }

    /// Handle to the parent directory.
    pub fn directory(&self) -> Arc<Directory> {
        let parent = self.storage.dirname(&self.path());
        self.storage.get_directory(&parent)
    }

    /// Entity handles for this directory's entries, in backend order.
    pub async fn files(&self) -> Result<Vec<DirectoryElement>, StorageError> {
        self.storage.get_files(&self.path()).await
    }

    /// Rename (or move) this directory to a new logical path, cascading the
    /// new prefix to cached descendant handles.
    pub async fn rename(&self, new_path: &str) -> Result<(), StorageError> {
        let renamed = self.storage.rename(&self.path(), new_path).await?;
        self.set_path(&renamed);
        Ok(())
    }

    /// Move this directory into another directory, keeping its name.
    pub async fn move_to(&self, target: impl AsDirectoryPath) -> Result<(), StorageError> {
        let new_path = join_path(&[target.directory_path().as_str(), self.name().as_str()]);
        self.rename(&new_path).await
    }

    /// Delete the directory and its contents from the backend.
    pub async fn delete(&self) -> Result<(), StorageError> {
        self.storage.delete_directory(&self.path()).await
    }
}
