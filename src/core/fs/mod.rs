//! # Filesystem Module
//!
//! The narrow filesystem surface the indexer and slicer need: stat, open
//! for random access, and list a directory. Paths are always relative to
//! the root of the filesystem instance.
//!
//! - `LocalFs` - a directory on disk
//! - `MemoryFs` - an in-memory tree for tests and embedding

mod local;
mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;

use serde::{Deserialize, Serialize};
use std::io::{self, Read, Seek};
use std::path::Path;

/// What kind of object a path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    Pipe,
    Socket,
    Device,
    Other,
}

impl FileKind {
    /// Anything that is neither a regular file nor a directory
    pub fn is_special(self) -> bool {
        !matches!(self, FileKind::File | FileKind::Dir)
    }
}

/// Result of a stat call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub kind: FileKind,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileKind,
}

/// A readable, seekable handle
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Read-only filesystem access used by indexing and hashing
pub trait FileSystem: Send + Sync {
    /// Stat a path without following a trailing symlink
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Open a file for random-access reading
    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>>;

    /// List a directory, sorted by name
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
}
