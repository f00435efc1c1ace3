//! Shared state written by workers during a run.

use crate::core::comparator::{DigestGrouper, FileRecord, GroupSplit};
use crate::core::summary::Tally;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Aggregation state for one run; every method is safe to call concurrently
#[derive(Debug, Default)]
pub(crate) struct Session {
    grouper: DigestGrouper,
    empty: Mutex<Vec<FileRecord>>,
    failures: DashMap<String, String>,
    files_seen: AtomicU64,
    ignored: AtomicU64,
    failed_files: AtomicU64,
    failed_locations: AtomicU64,
}

/// Everything a finished session collected
#[derive(Debug)]
pub(crate) struct SessionOutcome {
    pub groups: GroupSplit,
    pub empty: Vec<FileRecord>,
    pub failures: BTreeMap<String, String>,
    pub tally: Tally,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a file taken off the queue; returns the new total
    pub fn begin_file(&self) -> u64 {
        self.files_seen.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn files_seen(&self) -> u64 {
        self.files_seen.load(Ordering::Relaxed)
    }

    pub fn record_hashed(&self, record: FileRecord) {
        self.grouper.insert(record);
    }

    pub fn record_empty(&self, record: FileRecord) {
        self.empty
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_failure(&self, file: String, message: String) {
        self.failed_files.fetch_add(1, Ordering::Relaxed);
        self.failures.insert(file, message);
    }

    pub fn record_location_failure(&self, location: String, message: String) {
        self.failed_locations.fetch_add(1, Ordering::Relaxed);
        self.failures.insert(location, message);
    }

    /// Consume the session once all workers and the producer have stopped
    pub fn finish(self) -> SessionOutcome {
        let groups = self.grouper.split();

        let mut empty = self.empty.into_inner().unwrap_or_else(PoisonError::into_inner);
        empty.sort_by(|a, b| a.full_name.cmp(&b.full_name));

        let tally = Tally {
            total_files: self.files_seen.into_inner(),
            unique_files: groups.unique.len() as u64,
            empty_files: empty.len() as u64,
            ignored_files: self.ignored.into_inner(),
            failed_files: self.failed_files.into_inner(),
            failed_locations: self.failed_locations.into_inner(),
        };

        SessionOutcome {
            groups,
            empty,
            failures: self.failures.into_iter().collect(),
            tally,
        }
    }
}
