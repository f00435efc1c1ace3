//! # smash
//!
//! A fast duplicate file finder.
//!
//! Files are identified by a sampled digest: small files and text files are
//! hashed in full, larger binaries are hashed from a handful of evenly spaced
//! slices plus the head and tail, with the file size mixed in. Files with the
//! same digest are reported as duplicates. Nothing is ever deleted.
//!
//! ## Architecture
//! - `core` - The duplicate detection engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types
//!
//! ## Example
//! ```no_run
//! use smash::core::Pipeline;
//!
//! let pipeline = Pipeline::builder()
//!     .paths(vec!["/srv/media".into()])
//!     .recurse(true)
//!     .build()?;
//! let result = pipeline.run()?;
//! println!("{} bytes reclaimable", result.summary.reclaimable_bytes);
//! # Ok::<(), smash::SmashError>(())
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SmashError};

/// Initialize tracing for the library
///
/// Called once by the application entry point. `RUST_LOG` wins over the
/// default level; a second call is a no-op.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "smash=debug" } else { "smash=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
