//! Filesystem rooted at a directory on disk.

use super::{DirEntry, FileKind, FileStat, FileSystem, ReadSeek};
use std::fs::{self, File, FileType};
use std::io;
use std::path::{Path, PathBuf};

/// A directory on the local disk
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

fn kind_of(file_type: FileType) -> FileKind {
    if file_type.is_symlink() {
        return FileKind::Symlink;
    }
    if file_type.is_dir() {
        return FileKind::Dir;
    }
    if file_type.is_file() {
        return FileKind::File;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_fifo() {
            return FileKind::Pipe;
        }
        if file_type.is_socket() {
            return FileKind::Socket;
        }
        if file_type.is_block_device() || file_type.is_char_device() {
            return FileKind::Device;
        }
    }

    FileKind::Other
}

impl FileSystem for LocalFs {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        // The root itself may be a link; entries below it are never followed
        let metadata = if path.as_os_str().is_empty() {
            fs::metadata(&self.root)?
        } else {
            fs::symlink_metadata(self.resolve(path))?
        };
        Ok(FileStat {
            size: metadata.len(),
            kind: kind_of(metadata.file_type()),
        })
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>> {
        Ok(Box::new(File::open(self.resolve(path))?))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: kind_of(entry.file_type()?),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
