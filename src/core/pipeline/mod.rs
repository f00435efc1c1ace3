//! # Pipeline Module
//!
//! Orchestrates a full duplicate search.
//!
//! ## Pipeline Stages
//! 1. **Index** - One producer walks every location and queues files
//! 2. **Smash** - A fixed pool of workers hashes queued files and groups
//!    them by digest
//! 3. **Summarise** - Prune unique files, total up duplicates and pick the
//!    largest groups
//!
//! ## Parallelism
//! Indexing and hashing overlap: the queue is bounded, so a fast walker
//! waits for the workers rather than buffering the whole tree. Workers run
//! on a dedicated rayon pool sized by the configuration.

mod config;
mod executor;
mod session;

pub use config::{default_workers, PipelineConfig, DEFAULT_TOP_COUNT};
pub use executor::{Pipeline, PipelineBuilder, PipelineResult};
