//! Storage façade
//!
//! Resolves logical paths against a fixed base path, delegates physical I/O
//! to the configured adapter, and owns the entity registry that keeps one
//! live handle per logical path and cascades directory renames to previously
//! issued descendant handles.

mod registry;

use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapter::{Adapter, BoxedReader, BoxedWriter, DirEntry, FileStats, FileType};
use crate::config::StorageOptions;
use crate::entity::{Directory, DirectoryElement, File};
use crate::error::StorageError;
use crate::mime::MimeType;
use crate::paths::join_path;
use registry::{CachedHandle, EntityRegistry};

struct StorageInner {
    adapter: Arc<dyn Adapter>,
    base_path: PathBuf,
    registry: EntityRegistry,
}

/// Backend-agnostic storage rooted at a fixed base path.
///
/// Cheap to clone; clones share the adapter and the entity registry. One
/// `Storage` per backend root, created once and kept for the session.
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

impl Storage {
    /// Create a storage over an adapter.
    pub fn new<A: Adapter + 'static>(adapter: A, options: StorageOptions) -> Self {
        Self::with_adapter(Arc::new(adapter), options)
    }

    /// Create a storage over a shared adapter handle.
    pub fn with_adapter(adapter: Arc<dyn Adapter>, options: StorageOptions) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                adapter,
                base_path: options.base_path,
                registry: EntityRegistry::new(),
            }),
        }
    }

    /// The base path all logical paths are resolved against.
    pub fn base_path(&self) -> &Path {
        &self.inner.base_path
    }

    /// Resolve a logical path to the absolute path handed to the adapter.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let logical = join_path(&[path]);
        if logical.is_empty() {
            self.inner.base_path.clone()
        } else {
            self.inner.base_path.join(logical)
        }
    }

    /// Check whether a logical path exists.
    pub async fn has(&self, path: &str) -> bool {
        self.inner.adapter.has(&self.resolve_path(path)).await
    }

    /// Read the whole contents of a file.
    pub async fn read(&self, path: &str) -> Result<String, StorageError> {
        self.inner.adapter.read(&self.resolve_path(path)).await
    }

    /// Read a byte-offset chunk; with `length` omitted, reads `start` bytes
    /// from offset 0.
    pub async fn read_chunk(
        &self,
        path: &str,
        start: u64,
        length: Option<u64>,
    ) -> Result<String, StorageError> {
        self.inner
            .adapter
            .read_chunk(&self.resolve_path(path), start, length)
            .await
    }

    /// Open a read stream.
    pub async fn read_stream(&self, path: &str) -> Result<BoxedReader, StorageError> {
        self.inner
            .adapter
            .read_stream(&self.resolve_path(path))
            .await
    }

    /// List directory entries in the adapter's order.
    pub async fn read_directory(&self, path: &str) -> Result<Vec<DirEntry>, StorageError> {
        self.inner
            .adapter
            .read_directory(&self.resolve_path(path))
            .await
    }

    /// Stat a file or directory.
    pub async fn stats_file(&self, path: &str) -> Result<FileStats, StorageError> {
        self.inner.adapter.stats(&self.resolve_path(path)).await
    }

    /// Size in bytes.
    pub async fn get_size(&self, path: &str) -> Result<u64, StorageError> {
        self.inner.adapter.get_size(&self.resolve_path(path)).await
    }

    /// MIME string sniffed from the file contents.
    pub async fn get_mime_type(&self, path: &str) -> Result<String, StorageError> {
        self.inner
            .adapter
            .get_mime_type(&self.resolve_path(path))
            .await
    }

    /// Sniffed file type (extension plus MIME string).
    pub async fn get_file_type(&self, path: &str) -> Result<FileType, StorageError> {
        self.inner
            .adapter
            .get_file_type(&self.resolve_path(path))
            .await
    }

    /// Write a new file and return its handle.
    pub async fn write(&self, path: &str, contents: &str) -> Result<Arc<File>, StorageError> {
        self.inner
            .adapter
            .write(&self.resolve_path(path), contents)
            .await?;
        info!("Wrote new file {}", path);
        Ok(self.get_file(path))
    }

    /// Open a write stream (overwrite semantics).
    pub async fn write_stream(&self, path: &str) -> Result<BoxedWriter, StorageError> {
        self.inner
            .adapter
            .write_stream(&self.resolve_path(path))
            .await
    }

    /// Overwrite an existing file.
    pub async fn update(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        self.inner
            .adapter
            .update(&self.resolve_path(path), contents)
            .await?;
        debug!("Updated file {}", path);
        Ok(())
    }

    /// Create-or-overwrite a file and return its handle.
    pub async fn put(&self, path: &str, contents: &str) -> Result<Arc<File>, StorageError> {
        self.inner
            .adapter
            .put(&self.resolve_path(path), contents)
            .await?;
        debug!("Put file {}", path);
        Ok(self.get_file(path))
    }

    /// Prepend to an existing file.
    pub async fn prepend(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        self.inner
            .adapter
            .prepend(&self.resolve_path(path), contents)
            .await
    }

    /// Append to an existing file.
    pub async fn append(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        self.inner
            .adapter
            .append(&self.resolve_path(path), contents)
            .await
    }

    /// Rename a file or directory and return the normalized new path.
    ///
    /// When the source denotes a directory, every previously issued handle
    /// under it is repointed at the new prefix. Descendants are enumerated
    /// before the physical rename (the listing needs the old path) and
    /// rewritten only after it succeeds, so a failed rename leaves all
    /// handles untouched.
    pub async fn rename(&self, path: &str, new_path: &str) -> Result<String, StorageError> {
        let from = join_path(&[path]);
        let to = join_path(&[new_path]);
        let from_abs = self.resolve_path(&from);
        let to_abs = self.resolve_path(&to);

        let descendants = if self.is_directory_path(&from_abs).await? {
            self.collect_descendants(&from).await?
        } else {
            Vec::new()
        };

        if let Err(e) = self.inner.adapter.rename(&from_abs, &to_abs).await {
            error!("Failed to rename {} to {}: {}", from, to, e);
            return Err(e);
        }

        // Physical rename confirmed; repoint the entity and its subtree.
        self.repath(&from, &to);
        for element in &descendants {
            let old_child = element.path();
            let suffix = old_child
                .strip_prefix(from.as_str())
                .unwrap_or("")
                .trim_start_matches('/');
            let new_child = join_path(&[to.as_str(), suffix]);
            element.set_path(&new_child);
            self.inner.registry.rekey(&old_child, &new_child);
        }

        info!("Renamed {} to {}", from, to);
        Ok(to)
    }

    /// Copy a file.
    pub async fn copy(&self, path: &str, to_path: &str) -> Result<(), StorageError> {
        self.inner
            .adapter
            .copy(&self.resolve_path(path), &self.resolve_path(to_path))
            .await?;
        debug!("Copied {} to {}", path, to_path);
        Ok(())
    }

    /// Delete a file. The registry entry is left in place; the handle simply
    /// refers to a path that no longer exists on the backend.
    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.inner.adapter.delete(&self.resolve_path(path)).await?;
        info!("Deleted file {}", path);
        Ok(())
    }

    /// Delete a directory recursively.
    pub async fn delete_directory(&self, path: &str) -> Result<(), StorageError> {
        self.inner
            .adapter
            .delete_directory(&self.resolve_path(path))
            .await?;
        info!("Deleted directory {}", path);
        Ok(())
    }

    /// Create a directory (with missing ancestors) and return its handle.
    pub async fn create_directory(&self, path: &str) -> Result<Arc<Directory>, StorageError> {
        self.inner
            .adapter
            .create_directory(&self.resolve_path(path))
            .await?;
        info!("Created directory {}", path);
        Ok(self.get_directory(path))
    }

    /// File handle for a logical path.
    ///
    /// Idempotent: repeated calls with an equivalent path return the same
    /// `Arc`. The handle is created lazily; no I/O happens here.
    pub fn get_file(&self, path: &str) -> Arc<File> {
        let logical = join_path(&[path]);
        self.inner
            .registry
            .file_or_insert(&logical, || Arc::new(File::new(self.clone(), logical.clone())))
    }

    /// Directory handle for a logical path; same identity rules as
    /// [`Storage::get_file`].
    pub fn get_directory(&self, path: &str) -> Arc<Directory> {
        let logical = join_path(&[path]);
        self.inner.registry.directory_or_insert(&logical, || {
            Arc::new(Directory::new(self.clone(), logical.clone()))
        })
    }

    /// List a directory as entity handles, keyed by
    /// `join_path(directory_path, entry.name)`, in the adapter's order.
    pub async fn get_files(
        &self,
        directory_path: &str,
    ) -> Result<Vec<DirectoryElement>, StorageError> {
        let dir = join_path(&[directory_path]);
        let entries = self
            .inner
            .adapter
            .read_directory(&self.resolve_path(&dir))
            .await?;

        let mut elements = Vec::with_capacity(entries.len());
        for entry in entries {
            let child = join_path(&[dir.as_str(), entry.name.as_str()]);
            let element = match entry.kind {
                crate::adapter::EntryKind::Directory => {
                    DirectoryElement::Directory(self.get_directory(&child))
                }
                crate::adapter::EntryKind::File => DirectoryElement::File(self.get_file(&child)),
            };
            elements.push(element);
        }

        Ok(elements)
    }

    /// MIME string parsed into a [`MimeType`] value.
    pub async fn get_mime_type_instance(&self, path: &str) -> Result<MimeType, StorageError> {
        MimeType::parse(&self.get_mime_type(path).await?)
    }

    /// Parent directory path, using the adapter's path semantics.
    pub fn dirname(&self, path: &str) -> String {
        self.inner
            .adapter
            .dirname(Path::new(path))
            .to_string_lossy()
            .into_owned()
    }

    async fn is_directory_path(&self, absolute: &Path) -> Result<bool, StorageError> {
        if !self.inner.adapter.has(absolute).await {
            return Ok(false);
        }
        Ok(self.inner.adapter.stats(absolute).await?.is_directory())
    }

    /// All handles under a directory, recursively, in listing order.
    async fn collect_descendants(
        &self,
        directory_path: &str,
    ) -> Result<Vec<DirectoryElement>, StorageError> {
        let mut collected = Vec::new();
        let mut pending = vec![directory_path.to_string()];

        while let Some(dir) = pending.pop() {
            for element in self.get_files(&dir).await? {
                if let DirectoryElement::Directory(directory) = &element {
                    pending.push(directory.path());
                }
                collected.push(element);
            }
        }

        Ok(collected)
    }

    /// Repoint the handle registered at `old` (if live) and move its key.
    fn repath(&self, old: &str, new: &str) {
        if let Some(handle) = self.inner.registry.get_live(old) {
            match handle {
                CachedHandle::File(file) => file.set_path(new),
                CachedHandle::Directory(directory) => directory.set_path(new),
            }
        }
        self.inner.registry.rekey(old, new);
    }
}
