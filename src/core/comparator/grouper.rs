//! Concurrent digest-to-group map.

use super::{DuplicateGroup, FileRecord};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Groups file records by digest from many threads at once.
///
/// The map itself is sharded; each group additionally has its own lock so
/// that appending to one group never blocks inserts of other digests.
#[derive(Debug, Default)]
pub struct DigestGrouper {
    groups: DashMap<String, Arc<Mutex<DuplicateGroup>>>,
}

/// Groups after pruning
#[derive(Debug, Default)]
pub struct GroupSplit {
    /// Groups with at least two members, keyed by digest
    pub duplicates: BTreeMap<String, DuplicateGroup>,
    /// Files whose digest nobody else shared
    pub unique: Vec<FileRecord>,
}

impl DigestGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to the group for its digest, creating the group if needed
    pub fn insert(&self, record: FileRecord) {
        let group = Arc::clone(
            self.groups
                .entry(record.digest.clone())
                .or_insert_with(|| Arc::new(Mutex::new(DuplicateGroup::new(record.digest.clone()))))
                .value(),
        );
        // Shard lock is released here; only the group lock is held while appending
        group
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .files
            .push(record);
    }

    /// Number of distinct digests seen so far
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Drain all groups, separating real duplicates from unique files.
    ///
    /// Must only be called once every inserting thread has finished.
    pub fn split(self) -> GroupSplit {
        let mut split = GroupSplit::default();
        for (digest, shared) in self.groups.into_iter() {
            let group = match Arc::try_unwrap(shared) {
                Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
                Err(shared) => shared.lock().unwrap_or_else(PoisonError::into_inner).clone(),
            };
            if group.files.len() > 1 {
                split.duplicates.insert(digest, group);
            } else {
                split.unique.extend(group.files);
            }
        }
        split
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::thread;

    fn record(name: &str, digest: &str) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            location: "root".to_string(),
            path: PathBuf::from(name),
            full_name: PathBuf::from("root").join(name),
            digest: digest.to_string(),
            size: 100,
            fully_hashed: true,
            hash_time_us: 0,
        }
    }

    #[test]
    fn split_prunes_single_member_groups() {
        let grouper = DigestGrouper::new();
        grouper.insert(record("a", "01"));
        grouper.insert(record("b", "01"));
        grouper.insert(record("c", "02"));
        assert_eq!(grouper.len(), 2);

        let split = grouper.split();
        assert_eq!(split.duplicates.len(), 1);
        assert_eq!(split.duplicates["01"].files.len(), 2);
        assert_eq!(split.unique.len(), 1);
        assert_eq!(split.unique[0].name, "c");
    }

    #[test]
    fn concurrent_inserts_lose_nothing() {
        let grouper = DigestGrouper::new();

        thread::scope(|scope| {
            for worker in 0..8 {
                let grouper = &grouper;
                scope.spawn(move || {
                    for i in 0..500 {
                        let digest = format!("{:02}", i % 10);
                        grouper.insert(record(&format!("w{worker}-{i}"), &digest));
                    }
                });
            }
        });

        let split = grouper.split();
        assert_eq!(split.duplicates.len(), 10);
        let total: usize = split.duplicates.values().map(|g| g.files.len()).sum();
        assert_eq!(total, 8 * 500);
        assert!(split.unique.is_empty());
    }
}
