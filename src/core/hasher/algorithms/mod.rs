//! Digest implementations behind the [`Digest`](super::Digest) trait.

mod crypto;
mod fnv;
mod xxhash;

pub use crypto::{Blake3Digest, Md5Digest, Sha256Digest, Sha512Digest};
pub use fnv::{Fnv128Digest, Fnv128aDigest};
pub use xxhash::{Xxh128Digest, Xxh3Digest, Xxh64Digest};
