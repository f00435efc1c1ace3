//! # Comparator Module
//!
//! Groups hashed files by digest.
//!
//! ## How It Works
//! 1. Every worker inserts its file under the digest it computed
//! 2. Groups are created on first insert and locked individually, so
//!    workers only contend when they hash identical content
//! 3. Once hashing is done, single-member groups are pruned as unique
//!
//! The first file inserted into a group is its representative (root);
//! every later file is a duplicate of it.

mod grouper;

pub use grouper::{DigestGrouper, GroupSplit};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One hashed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Base name
    pub name: String,
    /// Location the file was found in
    pub location: String,
    /// Path relative to the location
    pub path: PathBuf,
    /// Location joined with the relative path
    pub full_name: PathBuf,
    /// Hex digest (empty for empty files)
    pub digest: String,
    /// Size in bytes
    pub size: u64,
    /// Whether every byte was hashed
    pub fully_hashed: bool,
    /// Time spent hashing, in microseconds
    pub hash_time_us: u64,
}

/// Files sharing one digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Hex digest shared by every member
    pub digest: String,
    /// Members in insertion order; the first is the representative
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create an empty group for a digest
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            files: Vec::new(),
        }
    }

    /// The file the others duplicate
    pub fn representative(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Everything after the representative
    pub fn duplicates(&self) -> &[FileRecord] {
        self.files.get(1..).unwrap_or(&[])
    }

    /// Get the number of duplicates (excluding the representative)
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes freed by keeping only the representative
    pub fn reclaimable_bytes(&self) -> u64 {
        let size = self.representative().map_or(0, |root| root.size);
        size.saturating_mul(self.duplicate_count() as u64)
    }
}
