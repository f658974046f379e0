//! In-memory backend
//!
//! A process-local adapter backed by a hash map. Ephemeral by nature; used
//! as the substitutable fake in tests and anywhere a real disk is unwanted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};
use std::time::SystemTime;
use tokio::io::AsyncWrite;

use super::{Adapter, BoxedReader, BoxedWriter, DirEntry, EntryKind, FileStats, FileType};
use crate::error::StorageError;

/// A stored node.
#[derive(Debug, Clone)]
enum Node {
    File {
        data: Vec<u8>,
        modified: SystemTime,
        created: SystemTime,
    },
    Directory {
        modified: SystemTime,
        created: SystemTime,
    },
}

impl Node {
    fn file(data: Vec<u8>) -> Self {
        let now = SystemTime::now();
        Node::File {
            data,
            modified: now,
            created: now,
        }
    }

    fn directory() -> Self {
        let now = SystemTime::now();
        Node::Directory {
            modified: now,
            created: now,
        }
    }
}

type NodeMap = HashMap<PathBuf, Node>;

/// In-memory adapter.
///
/// Thread-safe via an internal `RwLock`; all data is lost on drop. Cloning
/// yields a handle to the same store.
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    nodes: Arc<RwLock<NodeMap>>,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    /// Create a new empty store. The root directory always exists.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(PathBuf::new(), Node::directory());
        Self {
            nodes: Arc::new(RwLock::new(nodes)),
        }
    }

    /// Normalize a path into the store's key space: strip the root and `.`
    /// components, resolve `..`.
    fn normalize(path: &Path) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.components() {
            match component {
                std::path::Component::Normal(s) => result.push(s),
                std::path::Component::ParentDir => {
                    result.pop();
                }
                _ => {}
            }
        }
        result
    }

    fn read_nodes(&self) -> RwLockReadGuard<'_, NodeMap> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_nodes(&self) -> RwLockWriteGuard<'_, NodeMap> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert directory nodes for every missing ancestor of `key`.
    fn ensure_parents(nodes: &mut NodeMap, key: &Path) {
        let mut current = PathBuf::new();
        for component in key.parent().into_iter().flat_map(|p| p.components()) {
            if let std::path::Component::Normal(s) = component {
                current.push(s);
                nodes.entry(current.clone()).or_insert_with(Node::directory);
            }
        }
    }

    fn file_data(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        let key = Self::normalize(path);
        match self.read_nodes().get(&key) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory { .. }) => Err(StorageError::IoError(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("is a directory: {}", path.display()),
            ))),
            None => Err(StorageError::FileNotExists(path.display().to_string())),
        }
    }

    fn store_file(&self, path: &Path, data: Vec<u8>) {
        let key = Self::normalize(path);
        let mut nodes = self.write_nodes();
        Self::ensure_parents(&mut nodes, &key);
        nodes.insert(key, Node::file(data));
    }

    fn contains(&self, path: &Path) -> bool {
        self.read_nodes().contains_key(&Self::normalize(path))
    }
}

/// Write stream that commits its buffer into the store on shutdown (or on
/// drop, for callers that never shut the stream down).
struct MemoryWriter {
    adapter: MemoryAdapter,
    path: PathBuf,
    buffer: Vec<u8>,
    committed: bool,
}

impl MemoryWriter {
    fn commit(&mut self) {
        if !self.committed {
            self.adapter
                .store_file(&self.path, std::mem::take(&mut self.buffer));
            self.committed = true;
        }
    }
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, io::Error>> {
        self.buffer.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<(), io::Error>> {
        self.commit();
        Poll::Ready(Ok(()))
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.commit();
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn has(&self, path: &Path) -> bool {
        self.contains(path)
    }

    async fn read(&self, path: &Path) -> Result<String, StorageError> {
        let data = self.file_data(path)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    async fn read_chunk(
        &self,
        path: &Path,
        start: u64,
        length: Option<u64>,
    ) -> Result<String, StorageError> {
        let (start, length) = match length {
            Some(length) => (start as usize, length as usize),
            None => (0, start as usize),
        };

        let data = self.file_data(path)?;
        let start = start.min(data.len());
        let end = start.saturating_add(length).min(data.len());
        Ok(String::from_utf8_lossy(&data[start..end]).into_owned())
    }

    async fn read_stream(&self, path: &Path) -> Result<BoxedReader, StorageError> {
        let data = self.file_data(path)?;
        Ok(Box::new(io::Cursor::new(data)))
    }

    async fn read_directory(&self, path: &Path) -> Result<Vec<DirEntry>, StorageError> {
        let key = Self::normalize(path);
        let nodes = self.read_nodes();

        match nodes.get(&key) {
            Some(Node::Directory { .. }) => {}
            _ => return Err(StorageError::DirectoryNotExists(path.display().to_string())),
        }

        let mut entries = Vec::new();
        for (node_key, node) in nodes.iter() {
            if node_key.parent() == Some(key.as_path()) && !node_key.as_os_str().is_empty() {
                let kind = match node {
                    Node::File { .. } => EntryKind::File,
                    Node::Directory { .. } => EntryKind::Directory,
                };
                entries.push(DirEntry {
                    name: node_key
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    kind,
                });
            }
        }

        Ok(entries)
    }

    async fn stats(&self, path: &Path) -> Result<FileStats, StorageError> {
        let key = Self::normalize(path);
        match self.read_nodes().get(&key) {
            Some(Node::File {
                data,
                modified,
                created,
            }) => Ok(FileStats {
                kind: EntryKind::File,
                size: data.len() as u64,
                modified: Some(*modified),
                created: Some(*created),
            }),
            Some(Node::Directory { modified, created }) => Ok(FileStats {
                kind: EntryKind::Directory,
                size: 0,
                modified: Some(*modified),
                created: Some(*created),
            }),
            None => Err(StorageError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", path.display()),
            ))),
        }
    }

    async fn get_file_type(&self, path: &Path) -> Result<FileType, StorageError> {
        let data = self.file_data(path)?;
        Ok(match infer::get(&data) {
            Some(kind) => FileType {
                extension: kind.extension().to_string(),
                mime_type: kind.mime_type().to_string(),
            },
            None => FileType::fallback(),
        })
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if self.contains(path) {
            return Err(StorageError::FileAlreadyExists(path.display().to_string()));
        }
        self.store_file(path, contents.as_bytes().to_vec());
        Ok(())
    }

    async fn write_stream(&self, path: &Path) -> Result<BoxedWriter, StorageError> {
        Ok(Box::new(MemoryWriter {
            adapter: self.clone(),
            path: path.to_path_buf(),
            buffer: Vec::new(),
            committed: false,
        }))
    }

    async fn update(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if !self.contains(path) {
            return Err(StorageError::FileNotExists(path.display().to_string()));
        }
        self.store_file(path, contents.as_bytes().to_vec());
        Ok(())
    }

    async fn put(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        self.store_file(path, contents.as_bytes().to_vec());
        Ok(())
    }

    async fn prepend(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        let existing = self.file_data(path)?;
        let mut data = contents.as_bytes().to_vec();
        data.extend_from_slice(&existing);
        self.store_file(path, data);
        Ok(())
    }

    async fn append(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        let mut data = self.file_data(path)?;
        data.extend_from_slice(contents.as_bytes());
        self.store_file(path, data);
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        let from_key = Self::normalize(from);
        let to_key = Self::normalize(to);
        let mut nodes = self.write_nodes();

        if !nodes.contains_key(&from_key) {
            return Err(StorageError::FileNotExists(from.display().to_string()));
        }

        // Move the node itself and, for directories, the whole subtree.
        let moved: Vec<(PathBuf, PathBuf)> = nodes
            .keys()
            .filter(|key| *key == &from_key || key.starts_with(&from_key))
            .map(|key| {
                let suffix = key.strip_prefix(&from_key).unwrap_or_else(|_| Path::new(""));
                (key.clone(), to_key.join(suffix))
            })
            .collect();

        Self::ensure_parents(&mut nodes, &to_key);
        for (old_key, new_key) in moved {
            if let Some(node) = nodes.remove(&old_key) {
                nodes.insert(new_key, node);
            }
        }

        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        let from_key = Self::normalize(from);
        let to_key = Self::normalize(to);
        let mut nodes = self.write_nodes();

        let node = nodes
            .get(&from_key)
            .cloned()
            .ok_or_else(|| StorageError::FileNotExists(from.display().to_string()))?;

        Self::ensure_parents(&mut nodes, &to_key);
        nodes.insert(to_key, node);
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<(), StorageError> {
        let key = Self::normalize(path);
        let mut nodes = self.write_nodes();
        if nodes.remove(&key).is_none() {
            return Err(StorageError::FileNotExists(path.display().to_string()));
        }
        Ok(())
    }

    async fn create_directory(&self, path: &Path) -> Result<(), StorageError> {
        let key = Self::normalize(path);
        let mut nodes = self.write_nodes();
        if nodes.contains_key(&key) {
            return Err(StorageError::DirectoryAlreadyExists(
                path.display().to_string(),
            ));
        }
        Self::ensure_parents(&mut nodes, &key);
        nodes.insert(key, Node::directory());
        Ok(())
    }

    async fn delete_directory(&self, path: &Path) -> Result<(), StorageError> {
        let key = Self::normalize(path);
        let mut nodes = self.write_nodes();
        if !nodes.contains_key(&key) {
            return Err(StorageError::DirectoryNotExists(path.display().to_string()));
        }
        nodes.retain(|node_key, _| node_key != &key && !node_key.starts_with(&key));
        Ok(())
    }
}
