//! # Error Module
//!
//! Error types for the duplicate file finder.
//!
//! ## Design Principles
//! - **Never abort on one bad file** - per-file and per-location errors are
//!   recorded and the run continues
//! - **Include context** - paths, offsets, the value that was rejected
//! - **Fatal only before work starts** - configuration errors stop a run,
//!   nothing else does

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SmashError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Indexing error: {0}")]
    Walk(#[from] WalkError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Invalid parameters detected before a run starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid worker count: {value} (must be at least 1)")]
    InvalidWorkers { value: usize },

    #[error("Invalid slice count: {value} (must be 1-{max})")]
    InvalidSlices { value: usize, max: usize },

    #[error("Invalid slice size: {value} bytes (must be 1-{max})")]
    InvalidSliceSize { value: u64, max: u64 },

    #[error("Minimum size {min} is larger than maximum size {max}")]
    InvalidSizeRange { min: u64, max: u64 },

    #[error("Invalid top list size: {value} (must be at least 1)")]
    InvalidTopCount { value: usize },

    #[error("Progress interval must be greater than zero")]
    InvalidProgressInterval,

    #[error("Invalid exclusion pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Unknown hash algorithm: {name}")]
    UnknownAlgorithm { name: String },

    #[error("No valid locations to index")]
    NoLocations,

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),
}

/// Errors that occur while walking a location
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Location not found: {path}")]
    LocationNotFound { path: PathBuf },

    #[error("Location is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while hashing a single file
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read at offset {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to seek to offset {offset}: {source}")]
    Seek {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Arithmetic overflow computing {what} for a {size} byte file")]
    Overflow { what: &'static str, size: u64 },

    #[error("Invalid stride for a {size} byte file with {slices} slices of {slice_size} bytes")]
    InvalidStride {
        size: u64,
        slices: usize,
        slice_size: u64,
    },

    #[error("No buffer available for a {size} byte slice")]
    BufferUnavailable { size: u64 },
}

/// Errors that occur while writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SmashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_error_includes_path() {
        let error = WalkError::LocationNotFound {
            path: PathBuf::from("/data/archive"),
        };
        assert!(error.to_string().contains("/data/archive"));
    }

    #[test]
    fn hash_error_includes_offset() {
        let error = HashError::Read {
            offset: 251_904,
            source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read"),
        };
        let message = error.to_string();
        assert!(message.contains("251904"));
        assert!(message.contains("short read"));
    }

    #[test]
    fn config_error_converts_to_top_level() {
        let error: SmashError = ConfigError::InvalidWorkers { value: 0 }.into();
        assert!(matches!(error, SmashError::Config(_)));
        assert!(error.to_string().contains("at least 1"));
    }
}
