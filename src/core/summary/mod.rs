//! # Summary Module
//!
//! Final accounting for a run: totals, reclaimable space and the largest
//! duplicate groups.

mod topk;

pub use topk::{TopItem, TopK};

use crate::core::comparator::DuplicateGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Totals for one run.
///
/// `total_files` always equals `unique_files + duplicate_groups +
/// duplicate_files + empty_files + ignored_files + failed_files`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files taken off the queue by workers
    pub total_files: u64,
    /// Files whose content nobody else shared
    pub unique_files: u64,
    /// Groups with two or more members
    pub duplicate_groups: u64,
    /// Members beyond each group's representative
    pub duplicate_files: u64,
    /// Zero-byte files
    pub empty_files: u64,
    /// Files skipped by size filter or file type
    pub ignored_files: u64,
    /// Files that could not be hashed
    pub failed_files: u64,
    /// Locations that could not be walked
    pub failed_locations: u64,
    /// Bytes freed by keeping one copy per group
    pub reclaimable_bytes: u64,
    /// Largest groups by representative size, largest first
    pub top: Vec<TopItem>,
    /// Wall-clock time for the run
    pub elapsed_ms: u64,
}

/// Per-category counts gathered while hashing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total_files: u64,
    pub unique_files: u64,
    pub empty_files: u64,
    pub ignored_files: u64,
    pub failed_files: u64,
    pub failed_locations: u64,
}

/// Build the summary from the pruned duplicate groups.
///
/// Runs single-threaded after all workers have finished.
pub fn summarize(
    duplicates: &BTreeMap<String, DuplicateGroup>,
    tally: Tally,
    top_count: usize,
    elapsed: Duration,
) -> RunSummary {
    let mut top = TopK::new(top_count);
    let mut duplicate_files = 0u64;
    let mut reclaimable_bytes = 0u64;

    for group in duplicates.values() {
        let Some(root) = group.representative() else {
            continue;
        };
        duplicate_files += group.duplicate_count() as u64;
        reclaimable_bytes = reclaimable_bytes.saturating_add(group.reclaimable_bytes());
        top.push(TopItem {
            size: root.size,
            digest: group.digest.clone(),
        });
    }

    RunSummary {
        total_files: tally.total_files,
        unique_files: tally.unique_files,
        duplicate_groups: duplicates.len() as u64,
        duplicate_files,
        empty_files: tally.empty_files,
        ignored_files: tally.ignored_files,
        failed_files: tally.failed_files,
        failed_locations: tally.failed_locations,
        reclaimable_bytes,
        top: top.into_sorted_desc(),
        elapsed_ms: elapsed.as_millis().min(u64::MAX as u128) as u64,
    }
}
