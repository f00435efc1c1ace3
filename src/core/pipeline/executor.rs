//! Pipeline execution implementation.

use super::config::PipelineConfig;
use super::session::Session;
use crate::core::comparator::{DuplicateGroup, FileRecord};
use crate::core::hasher::HashAlgorithmKind;
use crate::core::scanner::{FileDescriptor, Indexer, Location};
use crate::core::slicer::{BufferPool, HashResult, Slicer, DEFAULT_MAX_IDLE, MAX_BUFFER_SIZE};
use crate::core::summary::{summarize, RunSummary};
use crate::error::{ConfigError, SmashError};
use crate::events::{
    null_sender, Event, EventSender, IndexEvent, PipelineEvent, PipelinePhase, SmashEvent,
};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Queue slots per worker between the indexer and the hashers
const QUEUE_DEPTH_PER_WORKER: usize = 64;

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Totals and the top list
    pub summary: RunSummary,
    /// Groups with two or more members, keyed by digest
    pub duplicates: BTreeMap<String, DuplicateGroup>,
    /// Files whose content nobody else shared
    pub unique: Vec<FileRecord>,
    /// Zero-byte files
    pub empty_files: Vec<FileRecord>,
    /// File or location name mapped to the error that stopped it
    pub failures: BTreeMap<String, String>,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    locations: Vec<Location>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            locations: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a location
    pub fn location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Add several locations
    pub fn locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations.extend(locations);
        self
    }

    /// Add directories on the local disk
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.locations.extend(paths.iter().map(Location::local));
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    /// Set the number of hashing workers
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the number of middle slices
    pub fn slices(mut self, slices: usize) -> Self {
        self.config.slices = slices;
        self
    }

    /// Set the size of each slice in bytes
    pub fn slice_size(mut self, slice_size: u64) -> Self {
        self.config.slice_size = slice_size;
        self
    }

    /// Set the size below which files are hashed in full
    pub fn threshold(mut self, threshold: u64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Only consider files within `[min, max]` bytes (0 = unbounded)
    pub fn size_range(mut self, min: u64, max: u64) -> Self {
        self.config.min_size = min;
        self.config.max_size = max;
        self
    }

    /// Prune directories matching any of these regular expressions
    pub fn exclude_dirs(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude_dirs = patterns;
        self
    }

    /// Skip files whose names match any of these regular expressions
    pub fn exclude_files(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude_files = patterns;
        self
    }

    /// Skip hidden files and directories
    pub fn ignore_hidden(mut self, ignore: bool) -> Self {
        self.config.ignore_hidden = ignore;
        self
    }

    /// Skip operating system files and directories
    pub fn ignore_system(mut self, ignore: bool) -> Self {
        self.config.ignore_system = ignore;
        self
    }

    /// Descend into subdirectories
    pub fn recurse(mut self, recurse: bool) -> Self {
        self.config.recurse = recurse;
        self
    }

    /// Always hash whole files
    pub fn disable_slicing(mut self, disable: bool) -> Self {
        self.config.disable_slicing = disable;
        self
    }

    /// Leave the file size out of the digest
    pub fn disable_meta(mut self, disable: bool) -> Self {
        self.config.disable_meta = disable;
        self
    }

    /// Skip the text probe
    pub fn disable_auto_text(mut self, disable: bool) -> Self {
        self.config.disable_auto_text = disable;
        self
    }

    /// Set the length of the top list
    pub fn top(mut self, count: usize) -> Self {
        self.config.top_count = count;
        self
    }

    /// Emit progress events at this interval
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.config.progress_interval = Some(interval);
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<Pipeline, ConfigError> {
        self.config.validate()?;
        if self.locations.is_empty() {
            return Err(ConfigError::NoLocations);
        }

        let indexer = Indexer::new(self.config.exclusion_filter()?, self.config.recurse);
        Ok(Pipeline {
            config: self.config,
            locations: self.locations.into_iter().map(Arc::new).collect(),
            indexer,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The duplicate detection pipeline.
///
/// One producer thread walks every location and feeds a bounded queue;
/// a fixed pool of workers drains it, each with its own [`Slicer`].
pub struct Pipeline {
    config: PipelineConfig,
    locations: Vec<Arc<Location>>,
    indexer: Indexer,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn locations(&self) -> &[Arc<Location>] {
        &self.locations
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, SmashError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, SmashError> {
        let start_time = Instant::now();
        let workers = self.config.workers;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("smash-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;
        let buffers = Arc::new(BufferPool::new(
            usize::try_from(self.config.slice_size).unwrap_or(MAX_BUFFER_SIZE),
            DEFAULT_MAX_IDLE.max(workers * 2),
        ));
        let session = Session::new();
        let (queue_tx, queue_rx) = bounded::<FileDescriptor>(workers * QUEUE_DEPTH_PER_WORKER);

        events.send(Event::Pipeline(PipelineEvent::Started));
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Smashing,
        }));
        info!(
            locations = self.locations.len(),
            workers,
            algorithm = %self.config.algorithm,
            "Starting run"
        );

        thread::scope(|scope| {
            let session = &session;
            scope.spawn(move || self.produce(queue_tx, session, events));

            let stop_ticker = self.config.progress_interval.map(|interval| {
                let (stop_tx, stop_rx) = bounded::<()>(0);
                scope.spawn(move || report_progress(interval, stop_rx, session, events, start_time));
                stop_tx
            });

            pool.broadcast(|_| self.work(&queue_rx, session, &buffers, events));

            // Every worker has returned, so the queue is drained
            drop(stop_ticker);
        });

        events.send(Event::Smash(SmashEvent::Completed {
            files_seen: session.files_seen(),
        }));
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Summarising,
        }));

        let outcome = session.finish();
        let summary = summarize(
            &outcome.groups.duplicates,
            outcome.tally,
            self.config.top_count,
            start_time.elapsed(),
        );

        let metrics = buffers.metrics();
        debug!(
            allocated = metrics.allocated,
            recycled = metrics.recycled,
            discarded = metrics.discarded,
            "Buffer pool usage"
        );
        info!(
            total = summary.total_files,
            duplicates = summary.duplicate_files,
            groups = summary.duplicate_groups,
            reclaimable = summary.reclaimable_bytes,
            elapsed_ms = summary.elapsed_ms,
            "Run complete"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));

        let mut unique = outcome.groups.unique;
        unique.sort_by(|a, b| a.full_name.cmp(&b.full_name));

        Ok(PipelineResult {
            summary,
            duplicates: outcome.groups.duplicates,
            unique,
            empty_files: outcome.empty,
            failures: outcome.failures,
        })
    }

    /// Walk every location into the queue. Dropping `queue` on return
    /// tells the workers no more files are coming.
    fn produce(&self, queue: Sender<FileDescriptor>, session: &Session, events: &EventSender) {
        for location in &self.locations {
            events.send(Event::Index(IndexEvent::Started {
                location: location.name().to_string(),
            }));

            let walked = self.indexer.walk(location, |file| {
                // Receivers outlive the producer
                let _ = queue.send(file);
            });

            match walked {
                Ok(summary) => {
                    events.send(Event::Index(IndexEvent::Completed {
                        location: location.name().to_string(),
                        files: summary.files,
                    }));
                }
                Err(e) => {
                    warn!(location = location.name(), error = %e, "Failed to index location");
                    events.send(Event::Index(IndexEvent::Error {
                        location: location.name().to_string(),
                        message: e.to_string(),
                    }));
                    session.record_location_failure(location.name().to_string(), e.to_string());
                }
            }
        }
    }

    /// Hash files until the queue is closed and empty
    fn work(
        &self,
        queue: &Receiver<FileDescriptor>,
        session: &Session,
        buffers: &Arc<BufferPool>,
        events: &EventSender,
    ) {
        let mut slicer = Slicer::new(self.config.algorithm, Arc::clone(buffers))
            .with_slices(self.config.slices)
            .with_slice_size(self.config.slice_size)
            .with_threshold(self.config.threshold);
        let options = self.config.slicer_options();

        for file in queue.iter() {
            session.begin_file();
            let started = Instant::now();

            match slicer.hash_path(file.location.fs(), &file.path, &options) {
                Err(e) => {
                    let full_name = file.full_name();
                    debug!(file = %full_name.display(), error = %e, "Failed to hash file");
                    events.send(Event::Smash(SmashEvent::Failed {
                        path: full_name.clone(),
                        message: e.to_string(),
                    }));
                    session.record_file_failure(full_name.display().to_string(), e.to_string());
                }
                Ok(result) if result.empty_file => {
                    session.record_empty(file_record(file, &result, started));
                }
                Ok(result) if result.ignored_file => session.record_ignored(),
                Ok(result) => session.record_hashed(file_record(file, &result, started)),
            }
        }
    }
}

fn file_record(file: FileDescriptor, result: &HashResult, started: Instant) -> FileRecord {
    FileRecord {
        full_name: file.full_name(),
        location: file.location.name().to_string(),
        name: file.name,
        path: file.path,
        digest: result.hex(),
        size: result.file_size,
        fully_hashed: result.fully_hashed,
        hash_time_us: started.elapsed().as_micros().min(u64::MAX as u128) as u64,
    }
}

/// Emit a progress event every `interval` until `stop` is dropped
fn report_progress(
    interval: Duration,
    stop: Receiver<()>,
    session: &Session,
    events: &EventSender,
    started: Instant,
) {
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                events.progress(
                    session.files_seen(),
                    started.elapsed().as_millis().min(u64::MAX as u128) as u64,
                );
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::{FileKind, LocalFs, MemoryFs};
    use crate::events::EventChannel;
    use std::collections::BTreeSet;

    /// Deterministic binary content (xorshift)
    fn binary(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed | 1;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 24) as u8
            })
            .collect()
    }

    /// 3 copies of a sampled file, 2 copies of a small file, 4 unique
    /// files and one empty file
    fn mixed_fs() -> MemoryFs {
        let big = binary(300_000, 1);
        let small = binary(2_000, 2);
        MemoryFs::new()
            .with_file("big-1.bin", big.clone())
            .with_file("nested/big-2.bin", big.clone())
            .with_file("nested/deeper/big-3.bin", big)
            .with_file("small-1.bin", small.clone())
            .with_file("nested/small-2.bin", small)
            .with_file("u1.bin", binary(500, 3))
            .with_file("u2.bin", binary(150_000, 4))
            .with_file("nested/u3.txt", "just some text")
            .with_file("nested/deeper/u4.bin", binary(64, 5))
            .with_file("empty.dat", Vec::new())
    }

    fn run_memory(fs: MemoryFs, workers: usize) -> PipelineResult {
        Pipeline::builder()
            .location(Location::new("mem", Arc::new(fs)))
            .recurse(true)
            .workers(workers)
            .build()
            .unwrap()
            .run()
            .unwrap()
    }

    fn membership(result: &PipelineResult) -> BTreeSet<Vec<String>> {
        result
            .duplicates
            .values()
            .map(|group| {
                let mut names: Vec<String> = group.files.iter().map(|f| f.name.clone()).collect();
                names.sort();
                names
            })
            .collect()
    }

    #[test]
    fn builder_requires_a_location() {
        assert!(matches!(
            Pipeline::builder().build(),
            Err(ConfigError::NoLocations)
        ));
    }

    #[test]
    fn builder_validates_config() {
        let result = Pipeline::builder()
            .location(Location::new("mem", Arc::new(MemoryFs::new())))
            .workers(0)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidWorkers { .. })));

        let result = Pipeline::builder()
            .location(Location::new("mem", Arc::new(MemoryFs::new())))
            .exclude_files(vec!["(".to_string()])
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn groups_identical_content() {
        let result = run_memory(mixed_fs(), 4);

        let expected: BTreeSet<Vec<String>> = [
            vec!["big-1.bin", "big-2.bin", "big-3.bin"],
            vec!["small-1.bin", "small-2.bin"],
        ]
        .into_iter()
        .map(|names| names.into_iter().map(String::from).collect())
        .collect();
        assert_eq!(membership(&result), expected);

        let summary = &result.summary;
        assert_eq!(summary.total_files, 10);
        assert_eq!(summary.duplicate_groups, 2);
        assert_eq!(summary.duplicate_files, 3);
        assert_eq!(summary.unique_files, 4);
        assert_eq!(summary.empty_files, 1);
        assert_eq!(summary.reclaimable_bytes, 2 * 300_000 + 2_000);
        assert_eq!(result.unique.len(), 4);
        assert_eq!(result.empty_files[0].name, "empty.dat");
    }

    #[test]
    fn large_duplicates_are_sampled() {
        let result = run_memory(mixed_fs(), 2);
        let big = result
            .duplicates
            .values()
            .find(|g| g.files.len() == 3)
            .unwrap();
        assert!(big.files.iter().all(|f| !f.fully_hashed));
        assert!(big.files.iter().all(|f| f.size == 300_000));
    }

    #[test]
    fn membership_is_independent_of_worker_count() {
        let baseline = run_memory(mixed_fs(), 1);
        for workers in [4, 16, 32] {
            let result = run_memory(mixed_fs(), workers);
            assert_eq!(membership(&result), membership(&baseline), "workers = {workers}");
            assert_eq!(result.summary.total_files, baseline.summary.total_files);
            assert_eq!(result.summary.empty_files, 1);
        }
    }

    #[test]
    fn failures_do_not_stop_the_run() {
        let fs = mixed_fs().with_unreadable_file("locked.bin", 4096);
        let result = run_memory(fs, 4);

        assert_eq!(result.summary.failed_files, 1);
        assert!(result.failures.contains_key("mem/locked.bin"));
        assert_eq!(result.summary.duplicate_groups, 2);
    }

    #[test]
    fn filtered_and_special_files_are_ignored() {
        let fs = MemoryFs::new()
            .with_file("a.bin", binary(10, 1))
            .with_file("b.bin", binary(10, 1))
            .with_file("huge.bin", binary(5_000, 2))
            .with_file("huge-copy.bin", binary(5_000, 2))
            .with_special("fifo", FileKind::Pipe, 0)
            .with_special("socket", FileKind::Socket, 64);

        let result = Pipeline::builder()
            .location(Location::new("mem", Arc::new(fs)))
            .size_range(0, 100)
            .build()
            .unwrap()
            .run()
            .unwrap();

        // Two oversized files and the socket; the zero-byte fifo is empty
        assert_eq!(result.summary.ignored_files, 3);
        assert_eq!(result.summary.duplicate_groups, 1);
        assert_eq!(result.summary.empty_files, 1);
        assert_eq!(result.empty_files[0].name, "fifo");
        assert_eq!(result.summary.total_files, 6);
    }

    #[test]
    fn duplicates_span_locations() {
        let shared = binary(1_000, 9);
        let result = Pipeline::builder()
            .location(Location::new("left", Arc::new(MemoryFs::new().with_file("a", shared.clone()))))
            .location(Location::new("right", Arc::new(MemoryFs::new().with_file("b", shared))))
            .build()
            .unwrap()
            .run()
            .unwrap();

        let group = result.duplicates.values().next().unwrap();
        let locations: BTreeSet<&str> = group.files.iter().map(|f| f.location.as_str()).collect();
        assert_eq!(locations, BTreeSet::from(["left", "right"]));
    }

    #[test]
    fn missing_location_is_recorded() {
        let result = Pipeline::builder()
            .location(Location::new(
                "/no/such/place",
                Arc::new(LocalFs::new("/no/such/place")),
            ))
            .location(Location::new("mem", Arc::new(mixed_fs())))
            .recurse(true)
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(result.summary.failed_locations, 1);
        assert!(result.failures.contains_key("/no/such/place"));
        assert_eq!(result.summary.total_files, 10);
    }

    #[test]
    fn top_list_is_descending() {
        let mut fs = MemoryFs::new();
        for (i, size) in [100usize, 5_000, 50, 2_000].iter().enumerate() {
            let data = binary(*size, i as u64 + 10);
            fs = fs
                .with_file(format!("f{i}-a"), data.clone())
                .with_file(format!("f{i}-b"), data);
        }
        let result = Pipeline::builder()
            .location(Location::new("mem", Arc::new(fs)))
            .top(3)
            .build()
            .unwrap()
            .run()
            .unwrap();

        let sizes: Vec<u64> = result.summary.top.iter().map(|t| t.size).collect();
        assert_eq!(sizes, vec![5_000, 2_000, 100]);
    }

    #[test]
    fn events_cover_the_run() {
        let (sender, receiver) = EventChannel::new();
        let pipeline = Pipeline::builder()
            .location(Location::new("mem", Arc::new(mixed_fs())))
            .recurse(true)
            .progress_interval(Duration::from_millis(1))
            .build()
            .unwrap();

        let result = pipeline.run_with_events(&sender).unwrap();
        drop(sender);

        let events: Vec<Event> = receiver.iter().collect();
        assert!(matches!(
            events.first(),
            Some(Event::Pipeline(PipelineEvent::Started))
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Index(IndexEvent::Completed { files: 10, .. })
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Smash(SmashEvent::Completed { files_seen: 10 })
        )));
        match events.last() {
            Some(Event::Pipeline(PipelineEvent::Completed { summary })) => {
                assert_eq!(summary, &result.summary);
            }
            other => panic!("unexpected final event: {other:?}"),
        }
    }
}
