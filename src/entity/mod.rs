//! Entity model
//!
//! `File` and `Directory` are handles bound to a logical path and the
//! storage that issued them. The path field is the single mutable piece of
//! state; everything else (name, full path) is derived on access.

pub mod directory;
pub mod file;

pub use directory::Directory;
pub use file::File;

use std::sync::Arc;

/// A listed directory entry resolved to its entity handle.
#[derive(Clone)]
pub enum DirectoryElement {
    File(Arc<File>),
    Directory(Arc<Directory>),
}

impl DirectoryElement {
    pub fn is_file(&self) -> bool {
        matches!(self, DirectoryElement::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, DirectoryElement::Directory(_))
    }

    /// Current logical path of the underlying entity.
    pub fn path(&self) -> String {
        match self {
            DirectoryElement::File(file) => file.path(),
            DirectoryElement::Directory(directory) => directory.path(),
        }
    }

    /// Entry name (last path segment).
    pub fn name(&self) -> String {
        match self {
            DirectoryElement::File(file) => file.name(),
            DirectoryElement::Directory(directory) => directory.name(),
        }
    }

    pub(crate) fn set_path(&self, path: &str) {
        match self {
            DirectoryElement::File(file) => file.set_path(path),
            DirectoryElement::Directory(directory) => directory.set_path(path),
        }
    }
}

/// Move target accepted by `File::move_to` and `Directory::move_to`: either
/// a raw directory path or a directory handle.
pub trait AsDirectoryPath {
    fn directory_path(&self) -> String;
}

impl AsDirectoryPath for &str {
    fn directory_path(&self) -> String {
        self.to_string()
    }
}

impl AsDirectoryPath for String {
    fn directory_path(&self) -> String {
        self.clone()
    }
}

impl AsDirectoryPath for &Directory {
    fn directory_path(&self) -> String {
        self.path()
    }
}

impl AsDirectoryPath for &Arc<Directory> {
    fn directory_path(&self) -> String {
        self.path()
    }
}
