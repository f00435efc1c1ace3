//! # Scanner Module
//!
//! Walks locations and produces a [`FileDescriptor`] for every candidate
//! file.
//!
//! ## Exclusions
//! - Hidden names (leading dot) unless disabled
//! - Operating system clutter (`$RECYCLE.BIN`, `thumbs.db`, ...) unless disabled
//! - Directory patterns, matched against the path relative to the location
//! - File patterns, matched against the file name
//!
//! ## Example
//! ```rust,ignore
//! use smash::core::scanner::{ExclusionFilter, Indexer, Location};
//!
//! let indexer = Indexer::new(ExclusionFilter::new(), true);
//! let location = Arc::new(Location::local("/data"));
//! indexer.walk(&location, |file| println!("{}", file.full_name().display()))?;
//! ```

mod filter;
mod walker;

pub use filter::{ExclusionFilter, SYSTEM_DIRS, SYSTEM_FILES};
pub use walker::{Indexer, WalkSummary};

use crate::core::fs::{FileSystem, LocalFs};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A root to index: a display name plus the filesystem it is read through
pub struct Location {
    name: String,
    fs: Arc<dyn FileSystem>,
}

impl Location {
    pub fn new(name: impl Into<String>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            name: name.into(),
            fs,
        }
    }

    /// A directory on the local disk
    pub fn local(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::new(path.display().to_string(), Arc::new(LocalFs::new(path)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location").field("name", &self.name).finish()
    }
}

/// A file found by the indexer
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    /// Location the file was found in
    pub location: Arc<Location>,
    /// Path relative to the location root
    pub path: PathBuf,
    /// Base name
    pub name: String,
}

impl FileDescriptor {
    /// Location name joined with the relative path
    pub fn full_name(&self) -> PathBuf {
        Path::new(self.location.name()).join(&self.path)
    }
}
