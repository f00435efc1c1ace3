//! In-memory filesystem.
//!
//! Directories are implied by the files placed in them. Special files,
//! unreadable files and unlistable directories can be injected to exercise
//! error paths without touching the disk.

use super::{DirEntry, FileKind, FileStat, FileSystem, ReadSeek};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Node {
    File(Arc<[u8]>),
    Special { kind: FileKind, size: u64 },
    Unreadable { size: u64 },
}

/// A filesystem held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, Node>,
    dirs: BTreeSet<PathBuf>,
    denied: BTreeSet<PathBuf>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file, creating its parent directories
    pub fn with_file(mut self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data: Vec<u8> = data.into();
        self.add_parents(&path);
        self.files.insert(path, Node::File(data.into()));
        self
    }

    /// Add an empty directory
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.dirs.insert(path);
        self
    }

    /// Add a pipe, socket, device or symlink of the given reported size
    pub fn with_special(mut self, path: impl AsRef<Path>, kind: FileKind, size: u64) -> Self {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, Node::Special { kind, size });
        self
    }

    /// Add a file that stats fine but fails to open
    pub fn with_unreadable_file(mut self, path: impl AsRef<Path>, size: u64) -> Self {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, Node::Unreadable { size });
        self
    }

    /// Make listing a directory fail with permission denied
    pub fn deny(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.dirs.insert(path.clone());
        self.denied.insert(path);
        self
    }

    fn add_parents(&mut self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || self.dirs.contains(path)
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl FileSystem for MemoryFs {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        if self.is_dir(path) {
            return Ok(FileStat {
                size: 0,
                kind: FileKind::Dir,
            });
        }
        match self.files.get(path) {
            Some(Node::File(data)) => Ok(FileStat {
                size: data.len() as u64,
                kind: FileKind::File,
            }),
            Some(Node::Special { kind, size }) => Ok(FileStat {
                size: *size,
                kind: *kind,
            }),
            Some(Node::Unreadable { size }) => Ok(FileStat {
                size: *size,
                kind: FileKind::File,
            }),
            None => Err(not_found(path)),
        }
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>> {
        match self.files.get(path) {
            Some(Node::File(data)) => Ok(Box::new(Cursor::new(Arc::clone(data)))),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: permission denied", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: permission denied", path.display()),
            ));
        }

        let dirs = self
            .dirs
            .iter()
            .filter(|d| !d.as_os_str().is_empty() && parent_of(d) == path)
            .map(|d| DirEntry {
                name: name_of(d),
                kind: FileKind::Dir,
            });
        let files = self
            .files
            .iter()
            .filter(|(f, _)| parent_of(f) == path)
            .map(|(f, node)| DirEntry {
                name: name_of(f),
                kind: match node {
                    Node::Special { kind, .. } => *kind,
                    _ => FileKind::File,
                },
            });

        let mut entries: Vec<DirEntry> = dirs.chain(files).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
