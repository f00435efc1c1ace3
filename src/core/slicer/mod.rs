//! # Slicer Module
//!
//! Fingerprints a file by hashing a handful of fixed-size windows instead
//! of every byte.
//!
//! ## How It Works
//! For a file of size `S`, slice size `L` and slice count `k`:
//! 1. Hash the head window `[0, L)`
//! 2. Split the middle `S - 2L` bytes into `k` equal parts and hash `L`
//!    bytes from each, stepping `stride = (S - 2L) / k - L` between reads
//! 3. Hash the tail window `[S - L, S)`
//! 4. Append the file size to the digest, so files with identical windows
//!    but different lengths never collide (sampled files only)
//!
//! Small files, text files and files below the threshold are hashed in full.
//!
//! ## Example
//! ```rust,ignore
//! use smash::core::hasher::HashAlgorithmKind;
//! use smash::core::slicer::{BufferPool, Slicer, SlicerOptions, DEFAULT_SLICE_SIZE};
//!
//! let pool = Arc::new(BufferPool::new(DEFAULT_SLICE_SIZE as usize, 64));
//! let mut slicer = Slicer::new(HashAlgorithmKind::Xxhash, pool);
//! let result = slicer.hash(&mut file, size, &SlicerOptions::default())?;
//! println!("{}", result.hex());
//! ```

mod pool;
mod text;

pub use pool::{BufferPool, PoolMetrics, PooledBuffer, DEFAULT_MAX_IDLE, MAX_BUFFER_SIZE};
pub use text::{looks_like_text, PEEK_SIZE};

use crate::core::fs::{FileKind, FileSystem};
use crate::core::hasher::{to_hex, Digest, DigestWriter, HashAlgorithmKind};
use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Default number of middle slices
pub const DEFAULT_SLICES: usize = 4;
/// Default slice size (8 KiB)
pub const DEFAULT_SLICE_SIZE: u64 = 8 * 1024;
/// Files smaller than this are always hashed in full (100 KiB)
pub const DEFAULT_THRESHOLD: u64 = 100 * 1024;
/// Upper bound on the middle slice count
pub const MAX_SLICES: usize = 128;

const META_TAG: &[u8] = b"smash:size";

/// Per-call switches for [`Slicer::hash`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlicerOptions {
    /// Files smaller than this are ignored (0 = no lower bound)
    pub min_size: u64,
    /// Files larger than this are ignored (0 = no upper bound)
    pub max_size: u64,
    /// Always hash the whole file
    pub disable_slicing: bool,
    /// Do not mix the file size into the digest
    pub disable_meta: bool,
    /// Skip the text probe; files are then hashed in full
    pub disable_auto_text: bool,
}

/// Outcome of hashing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashResult {
    /// Digest bytes; empty for empty or ignored files
    pub digest: Vec<u8>,
    /// Size the decision was based on
    pub file_size: u64,
    /// The file has zero bytes
    pub empty_file: bool,
    /// Skipped by size filter or file type
    pub ignored_file: bool,
    /// Every byte went into the digest
    pub fully_hashed: bool,
    /// Start of each sampled window, head first and tail last
    pub slice_offsets: Vec<u64>,
}

impl HashResult {
    fn empty() -> Self {
        Self {
            digest: Vec::new(),
            file_size: 0,
            empty_file: true,
            ignored_file: false,
            fully_hashed: false,
            slice_offsets: Vec::new(),
        }
    }

    fn ignored(size: u64) -> Self {
        Self {
            digest: Vec::new(),
            file_size: size,
            empty_file: false,
            ignored_file: true,
            fully_hashed: false,
            slice_offsets: Vec::new(),
        }
    }

    /// Digest as lowercase hex
    pub fn hex(&self) -> String {
        to_hex(&self.digest)
    }
}

/// The sampling hash engine.
///
/// Each instance owns its digest, so one `Slicer` must not be shared
/// between threads; the buffer pool behind it can be.
pub struct Slicer {
    algorithm: HashAlgorithmKind,
    digest: Box<dyn Digest>,
    slices: usize,
    slice_size: u64,
    threshold: u64,
    pool: Arc<BufferPool>,
}

impl Slicer {
    /// Create a slicer with the default slice count, slice size and threshold
    pub fn new(algorithm: HashAlgorithmKind, pool: Arc<BufferPool>) -> Self {
        Self {
            algorithm,
            digest: algorithm.new_digest(),
            slices: DEFAULT_SLICES,
            slice_size: DEFAULT_SLICE_SIZE,
            threshold: DEFAULT_THRESHOLD,
            pool,
        }
    }

    /// Set the number of middle slices (0 forces full hashing)
    pub fn with_slices(mut self, slices: usize) -> Self {
        self.slices = slices;
        self
    }

    /// Set the size of each window in bytes
    pub fn with_slice_size(mut self, slice_size: u64) -> Self {
        self.slice_size = slice_size;
        self
    }

    /// Set the size below which files are hashed in full
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn algorithm(&self) -> HashAlgorithmKind {
        self.algorithm
    }

    pub fn slices(&self) -> usize {
        self.slices
    }

    pub fn slice_size(&self) -> u64 {
        self.slice_size
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Hash a file through a filesystem.
    ///
    /// Zero-byte entries of any kind are empty. Otherwise pipes, sockets,
    /// devices and symlinks are reported as ignored without being opened.
    pub fn hash_path(
        &mut self,
        fs: &dyn FileSystem,
        path: &Path,
        options: &SlicerOptions,
    ) -> Result<HashResult, HashError> {
        let stat = fs.stat(path).map_err(|source| HashError::Stat {
            path: path.to_path_buf(),
            source,
        })?;

        if stat.size == 0 {
            return Ok(HashResult::empty());
        }
        if stat.kind.is_special() || stat.kind == FileKind::Dir {
            return Ok(HashResult::ignored(stat.size));
        }
        if let Some(result) = screen(stat.size, options) {
            return Ok(result);
        }

        let mut reader = fs.open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.hash(&mut reader, stat.size, options)
    }

    /// Hash `size` bytes of a seekable reader.
    pub fn hash<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        size: u64,
        options: &SlicerOptions,
    ) -> Result<HashResult, HashError> {
        if let Some(result) = screen(size, options) {
            return Ok(result);
        }

        self.digest.reset();

        let stride = match self.plan(size, options)? {
            Some(stride) if !options.disable_auto_text && is_samplable(reader, size)? => {
                Some(stride)
            }
            _ => None,
        };

        let slice_offsets = match stride {
            Some(stride) => {
                let offsets = self.hash_sampled(reader, size, stride)?;
                // Full hashes already cover the length
                if !options.disable_meta {
                    self.digest.write(META_TAG);
                    self.digest.write(&size.to_be_bytes());
                }
                offsets
            }
            None => {
                self.hash_full(reader, size)?;
                Vec::new()
            }
        };

        trace!(
            size,
            sampled = !slice_offsets.is_empty(),
            algorithm = %self.algorithm,
            "Hashed file"
        );

        Ok(HashResult {
            digest: self.digest.sum(),
            file_size: size,
            empty_file: false,
            ignored_file: false,
            fully_hashed: slice_offsets.is_empty(),
            slice_offsets,
        })
    }

    /// Returns the stride between middle windows, or `None` when the file
    /// has to be hashed in full.
    fn plan(&self, size: u64, options: &SlicerOptions) -> Result<Option<u64>, HashError> {
        if options.disable_slicing || size < self.threshold || self.slices == 0 {
            return Ok(None);
        }

        let k = self.slices as u64;
        let minimum = k
            .checked_add(2)
            .and_then(|windows| windows.checked_mul(self.slice_size))
            .ok_or(HashError::Overflow {
                what: "minimum sampled size",
                size,
            })?;
        if size < minimum {
            return Ok(None);
        }

        let invalid = || HashError::InvalidStride {
            size,
            slices: self.slices,
            slice_size: self.slice_size,
        };
        let middle = size
            .checked_sub(2 * self.slice_size)
            .ok_or_else(invalid)?;
        let stride = (middle / k).checked_sub(self.slice_size).ok_or_else(invalid)?;
        Ok(Some(stride))
    }

    fn hash_full<R: Read + Seek>(&mut self, reader: &mut R, size: u64) -> Result<(), HashError> {
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|source| HashError::Seek { offset: 0, source })?;
        io::copy(
            &mut reader.by_ref().take(size),
            &mut DigestWriter(self.digest.as_mut()),
        )
        .map_err(|source| HashError::Read { offset: 0, source })?;
        Ok(())
    }

    fn hash_sampled<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        size: u64,
        stride: u64,
    ) -> Result<Vec<u64>, HashError> {
        let length = usize::try_from(self.slice_size).map_err(|_| HashError::Overflow {
            what: "slice length",
            size,
        })?;
        let step = i64::try_from(stride).map_err(|_| HashError::Overflow {
            what: "stride",
            size,
        })?;
        let mut buffer = self
            .pool
            .acquire(length)
            .ok_or(HashError::BufferUnavailable {
                size: self.slice_size,
            })?;

        let mut offsets = Vec::with_capacity(self.slices + 2);

        let head = seek(reader, SeekFrom::Start(0), 0)?;
        read_window(reader, &mut buffer, head)?;
        self.digest.write(&buffer);
        offsets.push(head);

        let mut expected = head;
        for _ in 0..self.slices {
            expected += self.slice_size + stride;
            let offset = seek(reader, SeekFrom::Current(step), expected)?;
            read_window(reader, &mut buffer, offset)?;
            self.digest.write(&buffer);
            offsets.push(offset);
        }

        let tail_start = size - self.slice_size;
        let tail = seek(reader, SeekFrom::Start(tail_start), tail_start)?;
        read_window(reader, &mut buffer, tail)?;
        self.digest.write(&buffer);
        offsets.push(tail);

        Ok(offsets)
    }
}

/// Decide from the size alone whether a file is empty or filtered out.
fn screen(size: u64, options: &SlicerOptions) -> Option<HashResult> {
    if size == 0 {
        return Some(HashResult::empty());
    }
    let too_small = options.min_size > 0 && size < options.min_size;
    let too_large = options.max_size > 0 && size > options.max_size;
    if too_small || too_large {
        return Some(HashResult::ignored(size));
    }
    None
}

/// Peek at the head of the file; text and tiny files are not sampled.
fn is_samplable<R: Read + Seek>(reader: &mut R, size: u64) -> Result<bool, HashError> {
    if size < PEEK_SIZE as u64 {
        return Ok(false);
    }
    let mut prefix = [0u8; PEEK_SIZE];
    seek(reader, SeekFrom::Start(0), 0)?;
    read_window(reader, &mut prefix, 0)?;
    seek(reader, SeekFrom::Start(0), 0)?;
    Ok(!looks_like_text(&prefix))
}

fn seek<R: Seek>(reader: &mut R, target: SeekFrom, offset: u64) -> Result<u64, HashError> {
    reader
        .seek(target)
        .map_err(|source| HashError::Seek { offset, source })
}

fn read_window<R: Read>(reader: &mut R, buffer: &mut [u8], offset: u64) -> Result<(), HashError> {
    reader
        .read_exact(buffer)
        .map_err(|source| HashError::Read { offset, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs::MemoryFs;
    use std::io::Cursor;

    const MB_FILE: u64 = 1_024_000;

    fn pool() -> Arc<BufferPool> {
        Arc::new(BufferPool::new(DEFAULT_SLICE_SIZE as usize, 8))
    }

    fn slicer() -> Slicer {
        Slicer::new(HashAlgorithmKind::Xxhash, pool())
    }

    /// Deterministic binary content (xorshift)
    fn binary(len: u64, seed: u64) -> Vec<u8> {
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

    fn hash_bytes(slicer: &mut Slicer, data: &[u8], options: &SlicerOptions) -> HashResult {
        slicer
            .hash(&mut Cursor::new(data), data.len() as u64, options)
            .unwrap()
    }

    #[test]
    fn empty_file_has_no_digest() {
        let result = hash_bytes(&mut slicer(), b"", &SlicerOptions::default());
        assert!(result.empty_file);
        assert!(!result.ignored_file);
        assert!(result.digest.is_empty());
    }

    #[test]
    fn size_filters_mark_files_ignored() {
        let options = SlicerOptions {
            min_size: 10,
            max_size: 100,
            ..Default::default()
        };
        let mut slicer = slicer();
        assert!(hash_bytes(&mut slicer, &[7; 5], &options).ignored_file);
        assert!(hash_bytes(&mut slicer, &[7; 101], &options).ignored_file);
        assert!(!hash_bytes(&mut slicer, &[7; 50], &options).ignored_file);
    }

    #[test]
    fn empty_check_wins_over_size_filter() {
        let options = SlicerOptions {
            min_size: 10,
            ..Default::default()
        };
        let result = hash_bytes(&mut slicer(), b"", &options);
        assert!(result.empty_file);
    }

    #[test]
    fn small_file_is_hashed_in_full() {
        let data = binary(4096, 3);
        let options = SlicerOptions {
            disable_meta: true,
            ..Default::default()
        };
        let result = hash_bytes(&mut slicer(), &data, &options);

        let mut expected = HashAlgorithmKind::Xxhash.new_digest();
        expected.write(&data);

        assert!(result.fully_hashed);
        assert!(result.slice_offsets.is_empty());
        assert_eq!(result.digest, expected.sum());
    }

    #[test]
    fn sample_offsets_for_large_file() {
        let data = binary(MB_FILE, 11);
        let result = hash_bytes(&mut slicer(), &data, &SlicerOptions::default());

        assert!(!result.fully_hashed);
        assert_eq!(
            result.slice_offsets,
            vec![0, 251_904, 503_808, 755_712, 1_007_616, 1_015_808]
        );
    }

    #[test]
    fn smallest_sampled_size_is_k_plus_two_slices() {
        let mut slicer = slicer().with_threshold(0);
        let boundary = (DEFAULT_SLICES as u64 + 2) * DEFAULT_SLICE_SIZE;

        let at = hash_bytes(&mut slicer, &binary(boundary, 5), &SlicerOptions::default());
        assert!(!at.fully_hashed);
        assert_eq!(at.slice_offsets, vec![0, 8192, 16384, 24576, 32768, 40960]);

        let below = hash_bytes(&mut slicer, &binary(boundary - 1, 5), &SlicerOptions::default());
        assert!(below.fully_hashed);
    }

    #[test]
    fn bytes_outside_windows_do_not_change_sampled_digest() {
        let original = binary(MB_FILE, 21);
        let mut outside = original.clone();
        outside[100_000] ^= 0xff;
        let mut inside = original.clone();
        inside[5] ^= 0xff;

        let mut slicer = slicer();
        let options = SlicerOptions::default();
        let base = hash_bytes(&mut slicer, &original, &options);
        assert_eq!(hash_bytes(&mut slicer, &outside, &options).digest, base.digest);
        assert_ne!(hash_bytes(&mut slicer, &inside, &options).digest, base.digest);
    }

    #[test]
    fn hashing_is_idempotent() {
        let data = binary(MB_FILE, 8);
        let options = SlicerOptions::default();

        let mut first = slicer();
        let a = hash_bytes(&mut first, &data, &options);
        let b = hash_bytes(&mut first, &data, &options);
        let c = hash_bytes(&mut slicer(), &data, &options);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn size_metadata_changes_sampled_digest() {
        let data = binary(MB_FILE, 4);
        let mut slicer = slicer();
        let with_meta = hash_bytes(&mut slicer, &data, &SlicerOptions::default());
        let without_meta = hash_bytes(
            &mut slicer,
            &data,
            &SlicerOptions {
                disable_meta: true,
                ..Default::default()
            },
        );
        assert!(!with_meta.fully_hashed);
        assert_ne!(with_meta.digest, without_meta.digest);
    }

    #[test]
    fn full_hash_is_the_plain_digest_of_the_content() {
        let data = binary(4096, 4);
        let result = hash_bytes(&mut slicer(), &data, &SlicerOptions::default());

        let mut expected = HashAlgorithmKind::Xxhash.new_digest();
        expected.write(&data);

        assert!(result.fully_hashed);
        assert_eq!(result.digest, expected.sum());
    }

    #[test]
    fn text_files_are_hashed_in_full() {
        let line = b"the quick brown fox jumps over the lazy dog\n";
        let data: Vec<u8> = line.iter().copied().cycle().take(MB_FILE as usize).collect();
        let result = hash_bytes(&mut slicer(), &data, &SlicerOptions::default());
        assert!(result.fully_hashed);
    }

    #[test]
    fn switches_force_full_hash() {
        let data = binary(MB_FILE, 13);
        let mut slicer = slicer();
        for options in [
            SlicerOptions {
                disable_slicing: true,
                ..Default::default()
            },
            SlicerOptions {
                disable_auto_text: true,
                ..Default::default()
            },
        ] {
            assert!(hash_bytes(&mut slicer, &data, &options).fully_hashed);
        }
        assert!(hash_bytes(&mut slicer.with_slices(0), &data, &SlicerOptions::default()).fully_hashed);
    }

    #[test]
    fn overflowing_geometry_is_an_error() {
        let data = binary(MB_FILE, 17);
        let mut slicer = slicer().with_threshold(0).with_slice_size(u64::MAX / 4);
        let error = slicer
            .hash(&mut Cursor::new(&data), MB_FILE, &SlicerOptions::default())
            .unwrap_err();
        assert!(matches!(error, HashError::Overflow { .. }));
    }

    #[test]
    fn truncated_reader_is_a_read_error() {
        let data = binary(MB_FILE / 2, 19);
        let error = slicer()
            .hash(&mut Cursor::new(&data), MB_FILE, &SlicerOptions::default())
            .unwrap_err();
        assert!(matches!(error, HashError::Read { .. }));
    }

    #[test]
    fn sampled_buffer_returns_to_pool() {
        let pool = pool();
        let mut slicer = Slicer::new(HashAlgorithmKind::Xxhash, Arc::clone(&pool));
        hash_bytes(&mut slicer, &binary(MB_FILE, 23), &SlicerOptions::default());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn hash_path_handles_file_types() {
        let fs = MemoryFs::new()
            .with_file("data.bin", binary(4096, 29))
            .with_special("fifo", FileKind::Pipe, 0)
            .with_special("tty", FileKind::Device, 512)
            .with_unreadable_file("locked.bin", 4096);
        let options = SlicerOptions::default();
        let mut slicer = slicer();

        let result = slicer.hash_path(&fs, Path::new("data.bin"), &options).unwrap();
        assert!(result.fully_hashed);
        assert_eq!(result.file_size, 4096);

        let pipe = slicer.hash_path(&fs, Path::new("fifo"), &options).unwrap();
        assert!(pipe.empty_file);
        assert!(!pipe.ignored_file);

        let device = slicer.hash_path(&fs, Path::new("tty"), &options).unwrap();
        assert!(device.ignored_file);
        assert!(!device.empty_file);

        assert!(matches!(
            slicer.hash_path(&fs, Path::new("locked.bin"), &options),
            Err(HashError::Open { .. })
        ));
        assert!(matches!(
            slicer.hash_path(&fs, Path::new("missing"), &options),
            Err(HashError::Stat { .. })
        ));
    }

    #[test]
    fn every_algorithm_samples_the_same_windows() {
        let data = binary(MB_FILE, 31);
        for kind in HashAlgorithmKind::ALL {
            let mut slicer = Slicer::new(kind, pool());
            let result = hash_bytes(&mut slicer, &data, &SlicerOptions::default());
            assert_eq!(result.slice_offsets.len(), DEFAULT_SLICES + 2, "{kind}");
        }
    }
}
