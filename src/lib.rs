//! rax-storage
//!
//! A backend-agnostic filesystem abstraction. Callers work with [`Storage`],
//! [`File`], and [`Directory`] handles instead of raw paths; a pluggable
//! [`Adapter`] performs the physical I/O. Handles obtained for the same
//! logical path are the same object, and renaming a directory repoints every
//! previously issued handle under it.
//!
//! ```no_run
//! use rax_storage::{LocalAdapter, Storage, StorageOptions};
//!
//! # async fn example() -> Result<(), rax_storage::StorageError> {
//! let storage = Storage::new(LocalAdapter::new(), StorageOptions::new("/srv/files"));
//!
//! let file = storage.write("reports/today.txt", "draft").await?;
//! file.append("\nfinal").await?;
//!
//! let reports = storage.get_directory("reports");
//! reports.rename("archive").await?;
//! assert_eq!(file.path(), "archive/today.txt");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod entity;
pub mod error;
pub mod mime;
pub mod paths;
pub mod storage;

pub use adapter::{Adapter, DirEntry, EntryKind, FileStats, FileType, LocalAdapter, MemoryAdapter};
pub use config::StorageOptions;
pub use entity::{AsDirectoryPath, Directory, DirectoryElement, File};
pub use error::StorageError;
pub use mime::MimeType;
pub use storage::Storage;
