//! Error types
//!
//! Defines the domain-specific error type for storage operations.

use std::fmt;
use std::io;

/// Storage errors
///
/// Each existence-guard variant carries the offending path so callers can
/// tell which entry the operation was aimed at.
#[derive(Debug)]
pub enum StorageError {
    FileNotExists(String),
    FileAlreadyExists(String),
    DirectoryNotExists(String),
    DirectoryAlreadyExists(String),
    MimeTypeParse(String),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::FileNotExists(p) => write!(f, "File does not exist: {}", p),
            StorageError::FileAlreadyExists(p) => write!(f, "File already exists: {}", p),
            StorageError::DirectoryNotExists(p) => write!(f, "Directory does not exist: {}", p),
            StorageError::DirectoryAlreadyExists(p) => {
                write!(f, "Directory already exists: {}", p)
            }
            StorageError::MimeTypeParse(s) => write!(f, "Invalid MIME type string: {}", s),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}
