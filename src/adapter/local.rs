//! Local disk backend
//!
//! Performs physical I/O through tokio's `fs` against the local filesystem.

use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use super::{Adapter, BoxedReader, BoxedWriter, DirEntry, EntryKind, FileStats, FileType};
use crate::error::StorageError;

/// Number of bytes read for content-signature sniffing.
const SNIFF_PREFIX_LEN: u64 = 8192;

/// Local filesystem adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAdapter;

impl LocalAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

#[async_trait]
impl Adapter for LocalAdapter {
    async fn has(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read(&self, path: &Path) -> Result<String, StorageError> {
        if !self.has(path).await {
            return Err(StorageError::FileNotExists(path_str(path)));
        }
        Ok(fs::read_to_string(path).await?)
    }

    async fn read_chunk(
        &self,
        path: &Path,
        start: u64,
        length: Option<u64>,
    ) -> Result<String, StorageError> {
        let (start, length) = match length {
            Some(length) => (start, length),
            None => (0, start),
        };

        if !self.has(path).await {
            return Err(StorageError::FileNotExists(path_str(path)));
        }

        let mut file = fs::File::open(path).await?;
        file.seek(SeekFrom::Start(start)).await?;

        let mut buffer = Vec::with_capacity(length as usize);
        file.take(length).read_to_end(&mut buffer).await?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    async fn read_stream(&self, path: &Path) -> Result<BoxedReader, StorageError> {
        let file = fs::File::open(path).await?;
        Ok(Box::new(file))
    }

    async fn read_directory(&self, path: &Path) -> Result<Vec<DirEntry>, StorageError> {
        if !self.has(path).await {
            return Err(StorageError::DirectoryNotExists(path_str(path)));
        }

        let mut entries = Vec::new();
        let mut dir = fs::read_dir(path).await?;

        while let Some(entry) = dir.next_entry().await? {
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        Ok(entries)
    }

    async fn stats(&self, path: &Path) -> Result<FileStats, StorageError> {
        let metadata = fs::metadata(path).await?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Ok(FileStats {
            kind,
            size: metadata.len(),
            modified: metadata.modified().ok(),
            created: metadata.created().ok(),
        })
    }

    async fn get_file_type(&self, path: &Path) -> Result<FileType, StorageError> {
        if !self.has(path).await {
            return Err(StorageError::FileNotExists(path_str(path)));
        }

        let file = fs::File::open(path).await?;
        let mut prefix = Vec::with_capacity(SNIFF_PREFIX_LEN as usize);
        file.take(SNIFF_PREFIX_LEN).read_to_end(&mut prefix).await?;

        Ok(match infer::get(&prefix) {
            Some(kind) => FileType {
                extension: kind.extension().to_string(),
                mime_type: kind.mime_type().to_string(),
            },
            None => FileType::fallback(),
        })
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if self.has(path).await {
            return Err(StorageError::FileAlreadyExists(path_str(path)));
        }
        Ok(fs::write(path, contents).await?)
    }

    async fn write_stream(&self, path: &Path) -> Result<BoxedWriter, StorageError> {
        let file = fs::File::create(path).await?;
        Ok(Box::new(file))
    }

    async fn update(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if !self.has(path).await {
            return Err(StorageError::FileNotExists(path_str(path)));
        }
        Ok(fs::write(path, contents).await?)
    }

    async fn put(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        Ok(fs::write(path, contents).await?)
    }

    async fn prepend(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if !self.has(path).await {
            return Err(StorageError::FileNotExists(path_str(path)));
        }
        let existing = fs::read_to_string(path).await?;
        Ok(fs::write(path, format!("{}{}", contents, existing)).await?)
    }

    async fn append(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        if !self.has(path).await {
            return Err(StorageError::FileNotExists(path_str(path)));
        }
        let mut file = fs::OpenOptions::new().append(true).open(path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        if !self.has(from).await {
            return Err(StorageError::FileNotExists(path_str(from)));
        }
        Ok(fs::rename(from, to).await?)
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        if !self.has(from).await {
            return Err(StorageError::FileNotExists(path_str(from)));
        }
        fs::copy(from, to).await?;
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<(), StorageError> {
        if !self.has(path).await {
            return Err(StorageError::FileNotExists(path_str(path)));
        }
        Ok(fs::remove_file(path).await?)
    }

    async fn create_directory(&self, path: &Path) -> Result<(), StorageError> {
        if self.has(path).await {
            return Err(StorageError::DirectoryAlreadyExists(path_str(path)));
        }
        Ok(fs::create_dir_all(path).await?)
    }

    async fn delete_directory(&self, path: &Path) -> Result<(), StorageError> {
        if !self.has(path).await {
            return Err(StorageError::DirectoryNotExists(path_str(path)));
        }
        Ok(fs::remove_dir_all(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (LocalAdapter, TempDir) {
        (LocalAdapter::new(), TempDir::new().unwrap())
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (adapter, dir) = setup();
        let path = dir.path().join("test.txt");

        adapter.write(&path, "hello").await.unwrap();
        assert_eq!(adapter.read(&path).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_write_existing_fails() {
        let (adapter, dir) = setup();
        let path = dir.path().join("test.txt");

        adapter.write(&path, "first").await.unwrap();
        let result = adapter.write(&path, "second").await;
        assert!(matches!(result, Err(StorageError::FileAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_read_missing_fails() {
        let (adapter, dir) = setup();
        let path = dir.path().join("missing.txt");

        let result = adapter.read(&path).await;
        assert!(matches!(result, Err(StorageError::FileNotExists(_))));
    }

    #[tokio::test]
    async fn test_read_chunk() {
        let (adapter, dir) = setup();
        let path = dir.path().join("chunk.txt");

        adapter.write(&path, "0123456789").await.unwrap();
        assert_eq!(adapter.read_chunk(&path, 2, Some(4)).await.unwrap(), "2345");
        // Omitted length reads that many bytes from the start.
        assert_eq!(adapter.read_chunk(&path, 3, None).await.unwrap(), "012");
    }

    #[tokio::test]
    async fn test_prepend_and_append() {
        let (adapter, dir) = setup();
        let path = dir.path().join("log.txt");

        adapter.write(&path, "middle").await.unwrap();
        adapter.prepend(&path, "start-").await.unwrap();
        adapter.append(&path, "-end").await.unwrap();
        assert_eq!(adapter.read(&path).await.unwrap(), "start-middle-end");
    }

    #[tokio::test]
    async fn test_update_requires_existing() {
        let (adapter, dir) = setup();
        let path = dir.path().join("u.txt");

        let result = adapter.update(&path, "contents").await;
        assert!(matches!(result, Err(StorageError::FileNotExists(_))));

        adapter.put(&path, "v1").await.unwrap();
        adapter.update(&path, "v2").await.unwrap();
        assert_eq!(adapter.read(&path).await.unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_rename_and_copy() {
        let (adapter, dir) = setup();
        let from = dir.path().join("a.txt");
        let to = dir.path().join("b.txt");
        let copied = dir.path().join("c.txt");

        adapter.write(&from, "data").await.unwrap();
        adapter.rename(&from, &to).await.unwrap();
        assert!(!adapter.has(&from).await);
        assert_eq!(adapter.read(&to).await.unwrap(), "data");

        adapter.copy(&to, &copied).await.unwrap();
        assert_eq!(adapter.read(&copied).await.unwrap(), "data");
        assert!(adapter.has(&to).await);
    }

    #[tokio::test]
    async fn test_directory_lifecycle() {
        let (adapter, dir) = setup();
        let nested = dir.path().join("a/b/c");

        adapter.create_directory(&nested).await.unwrap();
        assert!(adapter.has(&nested).await);

        let result = adapter.create_directory(&nested).await;
        assert!(matches!(
            result,
            Err(StorageError::DirectoryAlreadyExists(_))
        ));

        adapter.delete_directory(&dir.path().join("a")).await.unwrap();
        assert!(!adapter.has(&nested).await);
    }

    #[tokio::test]
    async fn test_read_directory_kinds() {
        let (adapter, dir) = setup();

        adapter.write(&dir.path().join("f1.txt"), "1").await.unwrap();
        adapter.write(&dir.path().join("f2.txt"), "2").await.unwrap();
        adapter.create_directory(&dir.path().join("sub")).await.unwrap();

        let entries = adapter.read_directory(dir.path()).await.unwrap();
        assert_eq!(entries.len(), 3);
        let files = entries.iter().filter(|e| e.kind == EntryKind::File).count();
        let dirs = entries
            .iter()
            .filter(|e| e.kind == EntryKind::Directory)
            .count();
        assert_eq!(files, 2);
        assert_eq!(dirs, 1);
    }

    #[tokio::test]
    async fn test_stats_and_size() {
        let (adapter, dir) = setup();
        let path = dir.path().join("sized.txt");

        adapter.write(&path, "1234567").await.unwrap();
        let stats = adapter.stats(&path).await.unwrap();
        assert!(stats.is_file());
        assert_eq!(stats.size, 7);
        assert_eq!(adapter.get_size(&path).await.unwrap(), 7);

        let dir_stats = adapter.stats(dir.path()).await.unwrap();
        assert!(dir_stats.is_directory());
    }

    #[tokio::test]
    async fn test_file_type_fallback() {
        let (adapter, dir) = setup();
        let path = dir.path().join("plain.txt");

        adapter.write(&path, "just some text").await.unwrap();
        let file_type = adapter.get_file_type(&path).await.unwrap();
        assert_eq!(file_type, FileType::fallback());
        assert_eq!(adapter.get_mime_type(&path).await.unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn test_file_type_sniffs_signature() {
        let (adapter, dir) = setup();
        let path = dir.path().join("image.png");

        // Minimal PNG signature.
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        tokio::fs::write(&path, png).await.unwrap();

        let file_type = adapter.get_file_type(&path).await.unwrap();
        assert_eq!(file_type.mime_type, "image/png");
        assert_eq!(file_type.extension, "png");
    }

    #[tokio::test]
    async fn test_streams() {
        let (adapter, dir) = setup();
        let path = dir.path().join("stream.txt");

        let mut writer = adapter.write_stream(&path).await.unwrap();
        writer.write_all(b"streamed").await.unwrap();
        writer.shutdown().await.unwrap();

        let mut reader = adapter.read_stream(&path).await.unwrap();
        let mut contents = String::new();
        reader.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "streamed");
    }

    #[tokio::test]
    async fn test_dirname() {
        let adapter = LocalAdapter::new();
        assert_eq!(
            adapter.dirname(Path::new("dir/sub/file.txt")),
            Path::new("dir/sub")
        );
        assert_eq!(adapter.dirname(Path::new("file.txt")), Path::new("."));
    }
}
