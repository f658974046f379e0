//! File entity

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use super::{AsDirectoryPath, Directory};
use crate::error::StorageError;
use crate::paths::{base_name, join_path};
use crate::storage::Storage;

/// Handle to a file at a logical path.
///
/// Obtained from [`Storage::get_file`] and friends; two handles for the same
/// logical path are the same object, so a rename performed through any of
/// them (or through an ancestor directory) is visible to all.
pub struct File {
    storage: Storage,
    path: RwLock<String>,
}

impl File {
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
        true
    }

    pub fn is_directory(&self) -> bool {
        false
    }

    /// Read the file contents.
    pub async fn get(&self) -> Result<String, StorageError> {
        self.storage.read(&self.path()).await
    }

    /// Create-or-overwrite the contents.
    pub async fn put(&self, contents: &str) -> Result<(), StorageError> {
        self.storage.put(&self.path(), contents).await?;
        Ok(())
    }

    /// Prepend to the contents.
    pub async fn prepend(&self, contents: &str) -> Result<(), StorageError> {
        self.storage.prepend(&self.path(), contents).await
    }

    /// Append to the contents.
    pub async fn append(&self, contents: &str) -> Result<(), StorageError> {
        self.storage.append(&self.path(), contents).await
    }

    /// Handle to the parent directory.
    pub fn directory(&self) -> Arc<Directory> {
        let parent = self.storage.dirname(&self.path());
        self.storage.get_directory(&parent)
    }

    /// Rename (or move) this file to a new logical path.
    pub async fn rename(&self, new_path: &str) -> Result<(), StorageError> {
        let renamed = self.storage.rename(&self.path(), new_path).await?;
        self.set_path(&renamed);
        Ok(())
    }

    /// Move this file into a directory, keeping its name.
    pub async fn move_to(&self, target: impl AsDirectoryPath) -> Result<(), StorageError> {
        let new_path = join_path(&[target.directory_path().as_str(), self.name().as_str()]);
        self.rename(&new_path).await
    }

    /// Delete the file from the backend.
    pub async fn delete(&self) -> Result<(), StorageError> {
        self.storage.delete(&self.path()).await
    }
}
