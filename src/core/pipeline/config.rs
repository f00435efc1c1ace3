//! Pipeline configuration and its validation.

use crate::core::hasher::HashAlgorithmKind;
use crate::core::scanner::ExclusionFilter;
use crate::core::slicer::{
    SlicerOptions, DEFAULT_SLICES, DEFAULT_SLICE_SIZE, DEFAULT_THRESHOLD, MAX_BUFFER_SIZE,
    MAX_SLICES,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default length of the top list
pub const DEFAULT_TOP_COUNT: usize = 10;

/// Everything that shapes a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Digest algorithm
    pub algorithm: HashAlgorithmKind,
    /// Number of hashing workers
    pub workers: usize,
    /// Middle slices per sampled file
    pub slices: usize,
    /// Bytes per slice
    pub slice_size: u64,
    /// Files below this size are hashed in full
    pub threshold: u64,
    /// Smallest file considered (0 = no limit)
    pub min_size: u64,
    /// Largest file considered (0 = no limit)
    pub max_size: u64,
    /// Regular expressions for directories to prune
    pub exclude_dirs: Vec<String>,
    /// Regular expressions for file names to skip
    pub exclude_files: Vec<String>,
    /// Skip dot-files and dot-directories
    pub ignore_hidden: bool,
    /// Skip operating system clutter
    pub ignore_system: bool,
    /// Descend into subdirectories
    pub recurse: bool,
    /// Always hash whole files
    pub disable_slicing: bool,
    /// Leave the file size out of the digest
    pub disable_meta: bool,
    /// Skip the text probe (files are then hashed in full)
    pub disable_auto_text: bool,
    /// Length of the top list
    pub top_count: usize,
    /// How often to report progress (None = never)
    pub progress_interval: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithmKind::default(),
            workers: default_workers(),
            slices: DEFAULT_SLICES,
            slice_size: DEFAULT_SLICE_SIZE,
            threshold: DEFAULT_THRESHOLD,
            min_size: 0,
            max_size: 0,
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
            ignore_hidden: true,
            ignore_system: true,
            recurse: false,
            disable_slicing: false,
            disable_meta: false,
            disable_auto_text: false,
            top_count: DEFAULT_TOP_COUNT,
            progress_interval: None,
        }
    }
}

/// One worker per available CPU
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl PipelineConfig {
    /// Reject parameters that would make the run meaningless or unsafe
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers {
                value: self.workers,
            });
        }
        if self.slices == 0 || self.slices > MAX_SLICES {
            return Err(ConfigError::InvalidSlices {
                value: self.slices,
                max: MAX_SLICES,
            });
        }
        if self.slice_size == 0 || self.slice_size > MAX_BUFFER_SIZE as u64 {
            return Err(ConfigError::InvalidSliceSize {
                value: self.slice_size,
                max: MAX_BUFFER_SIZE as u64,
            });
        }
        if self.max_size > 0 && self.min_size > self.max_size {
            return Err(ConfigError::InvalidSizeRange {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.top_count == 0 {
            return Err(ConfigError::InvalidTopCount {
                value: self.top_count,
            });
        }
        if self.progress_interval.is_some_and(|i| i.is_zero()) {
            return Err(ConfigError::InvalidProgressInterval);
        }
        self.exclusion_filter()?;
        Ok(())
    }

    /// Per-file switches handed to every slicer
    pub fn slicer_options(&self) -> SlicerOptions {
        SlicerOptions {
            min_size: self.min_size,
            max_size: self.max_size,
            disable_slicing: self.disable_slicing,
            disable_meta: self.disable_meta,
            disable_auto_text: self.disable_auto_text,
        }
    }

    /// Compile the exclusion rules
    pub fn exclusion_filter(&self) -> Result<ExclusionFilter, ConfigError> {
        ExclusionFilter::new()
            .with_hidden(self.ignore_hidden)
            .with_system(self.ignore_system)
            .with_dir_patterns(&self.exclude_dirs)?
            .with_file_patterns(&self.exclude_files)
    }
}
