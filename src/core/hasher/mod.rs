//! # Hasher Module
//!
//! Registry of the digest algorithms used to fingerprint files.
//!
//! ## Supported Algorithms
//! - **xxhash** (default) - XXH64, fastest general choice
//! - **fnv128 / fnv128a** - 128-bit FNV-1 and FNV-1a
//! - **xxh3 / xxh128** - XXH3 at 64 and 128 bits
//! - **md5, sha256, sha512, blake3** - cryptographic digests
//!
//! Every algorithm has a stable index; an unknown index resolves to
//! `fnv128a` rather than failing, so validation belongs to the caller.
//!
//! ## Example
//! ```rust,ignore
//! use smash::core::hasher::HashAlgorithmKind;
//!
//! let mut digest = HashAlgorithmKind::from_name("fnv").unwrap().new_digest();
//! digest.write(b"hello");
//! let bytes = digest.sum();
//! ```

mod algorithms;
mod traits;

pub use traits::{to_hex, Digest, DigestWriter, HashAlgorithmKind};
