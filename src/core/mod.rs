//! # Core Module
//!
//! The UI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `fs` - Filesystem abstraction (local disk and in-memory)
//! - `scanner` - Walks locations and applies exclusions
//! - `hasher` - Digest algorithms behind a stable registry
//! - `slicer` - Sampling hash engine and its buffer pool
//! - `comparator` - Groups files by digest
//! - `summary` - Totals and the top duplicates list
//! - `pipeline` - Orchestrates the full workflow
//! - `reporter` - Writes reports to disk

pub mod comparator;
pub mod fs;
pub mod hasher;
pub mod pipeline;
pub mod reporter;
pub mod scanner;
pub mod slicer;
pub mod summary;

// Re-export commonly used types
pub use comparator::{DuplicateGroup, FileRecord};
pub use hasher::HashAlgorithmKind;
pub use pipeline::{Pipeline, PipelineConfig, PipelineResult};
pub use scanner::Location;
pub use slicer::{HashResult, Slicer, SlicerOptions};
pub use summary::RunSummary;
