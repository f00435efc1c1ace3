//! Directory traversal over a [`FileSystem`](crate::core::fs::FileSystem).

use super::{filter::ExclusionFilter, FileDescriptor, Location};
use crate::core::fs::FileKind;
use crate::error::WalkError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Counters from walking one location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Files handed to the callback
    pub files: usize,
    /// Directories listed
    pub directories: usize,
    /// Files and directories skipped by the exclusion filter
    pub excluded: usize,
    /// Directories skipped because they could not be listed
    pub unreadable: usize,
}

/// Walks locations depth-first and reports every file that passes the filter
#[derive(Debug, Clone)]
pub struct Indexer {
    filter: ExclusionFilter,
    recurse: bool,
}

impl Indexer {
    pub fn new(filter: ExclusionFilter, recurse: bool) -> Self {
        Self { filter, recurse }
    }

    pub fn recurse(&self) -> bool {
        self.recurse
    }

    /// Walk one location, calling `emit` for each file.
    ///
    /// Subdirectories that deny access are skipped; any other listing
    /// failure ends the walk of this location with an error.
    pub fn walk<F>(&self, location: &Arc<Location>, mut emit: F) -> Result<WalkSummary, WalkError>
    where
        F: FnMut(FileDescriptor),
    {
        let root_path = PathBuf::from(location.name());
        match location.fs().stat(Path::new("")) {
            Ok(stat) if stat.kind == FileKind::Dir => {}
            Ok(_) => return Err(WalkError::NotADirectory { path: root_path }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(WalkError::LocationNotFound { path: root_path })
            }
            Err(source) => {
                return Err(WalkError::ReadDirectory {
                    path: root_path,
                    source,
                })
            }
        }

        let mut summary = WalkSummary::default();
        let mut pending = vec![PathBuf::new()];

        while let Some(dir) = pending.pop() {
            let entries = match location.fs().read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    if dir.as_os_str().is_empty() {
                        return Err(WalkError::PermissionDenied { path: root_path });
                    }
                    debug!(location = location.name(), dir = %dir.display(), "Skipping unreadable directory");
                    summary.unreadable += 1;
                    continue;
                }
                Err(source) => {
                    return Err(WalkError::ReadDirectory {
                        path: root_path.join(&dir),
                        source,
                    })
                }
            };
            summary.directories += 1;

            let mut subdirs = Vec::new();
            for entry in entries {
                let path = dir.join(&entry.name);
                if entry.kind == FileKind::Dir {
                    if !self.recurse {
                        continue;
                    }
                    if self.filter.excludes_dir(&entry.name, &path) {
                        trace!(dir = %path.display(), "Excluded directory");
                        summary.excluded += 1;
                        continue;
                    }
                    subdirs.push(path);
                } else {
                    if self.filter.excludes_file(&entry.name) {
                        trace!(file = %path.display(), "Excluded file");
                        summary.excluded += 1;
                        continue;
                    }
                    summary.files += 1;
                    emit(FileDescriptor {
                        location: Arc::clone(location),
                        path,
                        name: entry.name,
                    });
                }
            }

            // Reversed so the stack pops subdirectories in name order
            pending.extend(subdirs.into_iter().rev());
        }

        debug!(
            location = location.name(),
            files = summary.files,
            directories = summary.directories,
            excluded = summary.excluded,
            "Indexed location"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::MemoryFs;

    fn location(fs: MemoryFs) -> Arc<Location> {
        Arc::new(Location::new("root", Arc::new(fs)))
    }

    fn collect(indexer: &Indexer, location: &Arc<Location>) -> Vec<String> {
        let mut found = Vec::new();
        indexer
            .walk(location, |file| found.push(file.path.to_string_lossy().into_owned()))
            .unwrap();
        found
    }

    fn tree() -> MemoryFs {
        MemoryFs::new()
            .with_file("a.txt", "a")
            .with_file("sub/b.txt", "b")
            .with_file("sub/deeper/c.txt", "c")
            .with_file(".hidden", "h")
            .with_file(".git/config", "g")
            .with_file("Thumbs.db", "t")
            .with_file("node_modules/pkg/index.js", "js")
    }

    #[test]
    fn recursive_walk_finds_nested_files() {
        let indexer = Indexer::new(ExclusionFilter::new(), true);
        let found = collect(&indexer, &location(tree()));
        assert!(found.contains(&"a.txt".to_string()));
        assert!(found.contains(&"sub/b.txt".to_string()));
        assert!(found.contains(&"sub/deeper/c.txt".to_string()));
        assert!(found.contains(&"node_modules/pkg/index.js".to_string()));
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn non_recursive_walk_stays_at_top_level() {
        let indexer = Indexer::new(ExclusionFilter::new(), false);
        assert_eq!(collect(&indexer, &location(tree())), vec!["a.txt"]);
    }

    #[test]
    fn hidden_and_system_items_can_be_included() {
        let indexer = Indexer::new(ExclusionFilter::new().with_hidden(false).with_system(false), true);
        let found = collect(&indexer, &location(tree()));
        assert!(found.contains(&".hidden".to_string()));
        assert!(found.contains(&".git/config".to_string()));
        assert!(found.contains(&"Thumbs.db".to_string()));
    }

    #[test]
    fn excluded_directories_are_pruned() {
        let filter = ExclusionFilter::new()
            .with_dir_patterns(&["node_modules".to_string(), "deeper".to_string()])
            .unwrap();
        let indexer = Indexer::new(filter, true);
        let found = collect(&indexer, &location(tree()));
        assert_eq!(found, vec!["a.txt", "sub/b.txt"]);
    }

    #[test]
    fn descriptors_carry_location_and_name() {
        let indexer = Indexer::new(ExclusionFilter::new(), true);
        let mut files = Vec::new();
        indexer
            .walk(&location(MemoryFs::new().with_file("docs/x.pdf", "x")), |f| files.push(f))
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "x.pdf");
        assert_eq!(files[0].location.name(), "root");
        assert_eq!(files[0].full_name(), PathBuf::from("root/docs/x.pdf"));
    }

    #[test]
    fn unreadable_subdirectory_is_skipped() {
        let fs = MemoryFs::new().with_file("ok.txt", "ok").deny("locked");
        let indexer = Indexer::new(ExclusionFilter::new(), true);
        let mut found = Vec::new();
        let summary = indexer
            .walk(&location(fs), |f| found.push(f.name))
            .unwrap();
        assert_eq!(found, vec!["ok.txt"]);
        assert_eq!(summary.unreadable, 1);
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let indexer = Indexer::new(ExclusionFilter::new(), true);
        let result = indexer.walk(&location(MemoryFs::new().deny("")), |_| {});
        assert!(matches!(result, Err(WalkError::PermissionDenied { .. })));
    }

    #[test]
    fn missing_location_is_an_error() {
        let fs = Arc::new(crate::core::fs::LocalFs::new("/definitely/not/here"));
        let indexer = Indexer::new(ExclusionFilter::new(), true);
        let result = indexer.walk(&Arc::new(Location::new("missing", fs)), |_| {});
        assert!(matches!(result, Err(WalkError::LocationNotFound { .. })));
    }

    #[test]
    fn summary_counts_exclusions() {
        let indexer = Indexer::new(ExclusionFilter::new(), true);
        let summary = indexer.walk(&location(tree()), |_| {}).unwrap();
        assert_eq!(summary.files, 4);
        // .hidden, .git and Thumbs.db
        assert_eq!(summary.excluded, 3);
    }
}
