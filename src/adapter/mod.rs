//! Adapter contract
//!
//! The polymorphic capability boundary between `Storage` and a physical
//! backend. Adapters are addressed by absolute, already-resolved paths and
//! know nothing about the entity registry.

pub mod local;
pub mod memory;

pub use local::LocalAdapter;
pub use memory::MemoryAdapter;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::StorageError;

/// Boxed byte stream for reads.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed byte stream for writes.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A directory entry returned by `read_directory`.
///
/// Ordering of entries is whatever the backend yields.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Name of the entry (not a full path).
    pub name: String,
    /// File-vs-directory kind as reported by the backend.
    pub kind: EntryKind,
}

/// Stat result for a file or directory.
#[derive(Debug, Clone)]
pub struct FileStats {
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub created: Option<SystemTime>,
}

impl FileStats {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Sniffed file type: extension plus MIME string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileType {
    pub extension: String,
    pub mime_type: String,
}

impl FileType {
    /// Default when no content signature matches.
    pub fn fallback() -> Self {
        Self {
            extension: "txt".to_string(),
            mime_type: "text/plain".to_string(),
        }
    }
}

/// Physical I/O capability set consumed by `Storage`.
///
/// One conforming implementation per backend. Existence guards are the
/// adapter's responsibility: file-targeted operations fail with
/// `FileNotExists`/`FileAlreadyExists`, directory-targeted ones with the
/// directory counterparts.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Check whether a path exists.
    async fn has(&self, path: &Path) -> bool;

    /// Read the entire contents of a file.
    async fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Read `length` bytes starting at `start`.
    ///
    /// With `length` omitted, reads `start` bytes from offset 0.
    async fn read_chunk(
        &self,
        path: &Path,
        start: u64,
        length: Option<u64>,
    ) -> Result<String, StorageError>;

    /// Open a read stream; absence surfaces as an I/O error from the open.
    async fn read_stream(&self, path: &Path) -> Result<BoxedReader, StorageError>;

    /// List directory entries in backend order.
    async fn read_directory(&self, path: &Path) -> Result<Vec<DirEntry>, StorageError>;

    /// Stat a file or directory.
    async fn stats(&self, path: &Path) -> Result<FileStats, StorageError>;

    /// Size in bytes, derived from `stats`.
    async fn get_size(&self, path: &Path) -> Result<u64, StorageError> {
        Ok(self.stats(path).await?.size)
    }

    /// Sniff the file type from a content prefix, falling back to
    /// `txt`/`text/plain` when no signature matches.
    async fn get_file_type(&self, path: &Path) -> Result<FileType, StorageError>;

    /// MIME string, derived from `get_file_type`.
    async fn get_mime_type(&self, path: &Path) -> Result<String, StorageError> {
        Ok(self.get_file_type(path).await?.mime_type)
    }

    /// Write a new file.
    async fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    /// Open a write stream with overwrite semantics (no existence check).
    async fn write_stream(&self, path: &Path) -> Result<BoxedWriter, StorageError>;

    /// Overwrite an existing file.
    async fn update(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    /// Create-or-overwrite a file.
    async fn put(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    /// Prepend to an existing file (reads then rewrites, not atomic).
    async fn prepend(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    /// Append to an existing file.
    async fn append(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    /// Rename a file or directory.
    async fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError>;

    /// Copy a file.
    async fn copy(&self, from: &Path, to: &Path) -> Result<(), StorageError>;

    /// Delete a file.
    async fn delete(&self, path: &Path) -> Result<(), StorageError>;

    /// Create a directory, recursively creating missing ancestors.
    async fn create_directory(&self, path: &Path) -> Result<(), StorageError>;

    /// Delete a directory recursively.
    async fn delete_directory(&self, path: &Path) -> Result<(), StorageError>;

    /// Parent directory of a path; pure path arithmetic, exposed here so a
    /// backend with different path semantics can override it.
    fn dirname(&self, path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
