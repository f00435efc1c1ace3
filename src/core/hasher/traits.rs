//! Trait definitions for streaming digests and the algorithm registry.

use super::algorithms::{
    Blake3Digest, Fnv128Digest, Fnv128aDigest, Md5Digest, Sha256Digest, Sha512Digest,
    Xxh128Digest, Xxh3Digest, Xxh64Digest,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::io;
use std::str::FromStr;

/// A resettable, incrementally fed digest
pub trait Digest: Send {
    /// Return the digest to its freshly constructed state
    fn reset(&mut self);

    /// Feed bytes into the digest
    fn write(&mut self, bytes: &[u8]);

    /// Produce the digest of everything written since the last reset.
    ///
    /// Does not consume or reset the state.
    fn sum(&self) -> Vec<u8>;

    /// Number of bytes produced by `sum`
    fn output_size(&self) -> usize;
}

/// Adapts a [`Digest`] to `std::io::Write` so it can sit behind `io::copy`.
pub struct DigestWriter<'a>(pub &'a mut dyn Digest);

impl io::Write for DigestWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Render digest bytes as lowercase hex
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Available hash algorithms.
///
/// The discriminant is the stable index used on the command line and in
/// reports; existing indices never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithmKind {
    /// XXH64, seed 0
    #[default]
    Xxhash = 0,
    /// FNV-1, 128 bit
    Fnv128 = 1,
    /// FNV-1a, 128 bit
    Fnv128a = 2,
    /// XXH3, 64 bit
    Xxh3 = 3,
    /// XXH3, 128 bit
    Xxh128 = 4,
    /// MD5
    Md5 = 5,
    /// SHA-256
    Sha256 = 6,
    /// SHA-512
    Sha512 = 7,
    /// BLAKE3
    Blake3 = 8,
}

impl HashAlgorithmKind {
    /// Every registered algorithm, in index order
    pub const ALL: [HashAlgorithmKind; 9] = [
        HashAlgorithmKind::Xxhash,
        HashAlgorithmKind::Fnv128,
        HashAlgorithmKind::Fnv128a,
        HashAlgorithmKind::Xxh3,
        HashAlgorithmKind::Xxh128,
        HashAlgorithmKind::Md5,
        HashAlgorithmKind::Sha256,
        HashAlgorithmKind::Sha512,
        HashAlgorithmKind::Blake3,
    ];

    /// Algorithm used when an index does not name a registered algorithm
    pub const FALLBACK: HashAlgorithmKind = HashAlgorithmKind::Fnv128a;

    /// Stable numeric index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up an algorithm by index, falling back to [`Self::FALLBACK`].
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Self::FALLBACK)
    }

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithmKind::Xxhash => "xxhash",
            HashAlgorithmKind::Fnv128 => "fnv128",
            HashAlgorithmKind::Fnv128a => "fnv128a",
            HashAlgorithmKind::Xxh3 => "xxh3",
            HashAlgorithmKind::Xxh128 => "xxh128",
            HashAlgorithmKind::Md5 => "md5",
            HashAlgorithmKind::Sha256 => "sha256",
            HashAlgorithmKind::Sha512 => "sha512",
            HashAlgorithmKind::Blake3 => "blake3",
        }
    }

    /// Alternative names accepted when parsing
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            HashAlgorithmKind::Xxhash => &["xxh64"],
            HashAlgorithmKind::Fnv128 => &["fnv1"],
            HashAlgorithmKind::Fnv128a => &["fnv", "fnv1a"],
            HashAlgorithmKind::Xxh3 => &["xxh3-64"],
            HashAlgorithmKind::Xxh128 => &["xxh3-128"],
            HashAlgorithmKind::Md5 => &[],
            HashAlgorithmKind::Sha256 => &["sha-256"],
            HashAlgorithmKind::Sha512 => &["sha-512"],
            HashAlgorithmKind::Blake3 => &["b3"],
        }
    }

    /// Case-insensitive lookup over canonical names and synonyms
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted || kind.synonyms().contains(&wanted.as_str()))
    }

    /// Get a human-readable description of the algorithm
    pub fn description(self) -> &'static str {
        match self {
            HashAlgorithmKind::Xxhash => "XXH64 - very fast 64-bit non-cryptographic hash",
            HashAlgorithmKind::Fnv128 => "FNV-1 128-bit - simple multiply/xor hash",
            HashAlgorithmKind::Fnv128a => "FNV-1a 128-bit - xor/multiply variant of FNV-1",
            HashAlgorithmKind::Xxh3 => "XXH3 64-bit - fastest on modern CPUs",
            HashAlgorithmKind::Xxh128 => "XXH3 128-bit - wider XXH3 output",
            HashAlgorithmKind::Md5 => "MD5 - legacy 128-bit cryptographic hash",
            HashAlgorithmKind::Sha256 => "SHA-256 - cryptographic, slow but collision resistant",
            HashAlgorithmKind::Sha512 => "SHA-512 - cryptographic, faster than SHA-256 on 64-bit",
            HashAlgorithmKind::Blake3 => "BLAKE3 - fast cryptographic hash",
        }
    }

    /// Construct a fresh digest for this algorithm
    pub fn new_digest(self) -> Box<dyn Digest> {
        match self {
            HashAlgorithmKind::Xxhash => Box::new(Xxh64Digest::new()),
            HashAlgorithmKind::Fnv128 => Box::new(Fnv128Digest::new()),
            HashAlgorithmKind::Fnv128a => Box::new(Fnv128aDigest::new()),
            HashAlgorithmKind::Xxh3 => Box::new(Xxh3Digest::new()),
            HashAlgorithmKind::Xxh128 => Box::new(Xxh128Digest::new()),
            HashAlgorithmKind::Md5 => Box::new(Md5Digest::new()),
            HashAlgorithmKind::Sha256 => Box::new(Sha256Digest::new()),
            HashAlgorithmKind::Sha512 => Box::new(Sha512Digest::new()),
            HashAlgorithmKind::Blake3 => Box::new(Blake3Digest::new()),
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithmKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ConfigError::UnknownAlgorithm {
            name: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(kind: HashAlgorithmKind, data: &[u8]) -> Vec<u8> {
        let mut digest = kind.new_digest();
        digest.write(data);
        digest.sum()
    }

    #[test]
    fn default_is_xxhash() {
        assert_eq!(HashAlgorithmKind::default(), HashAlgorithmKind::Xxhash);
        assert_eq!(HashAlgorithmKind::default().index(), 0);
    }

    #[test]
    fn indices_are_stable() {
        for (i, kind) in HashAlgorithmKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(HashAlgorithmKind::from_index(i as i64), *kind);
        }
    }

    #[test]
    fn unknown_index_falls_back() {
        assert_eq!(HashAlgorithmKind::from_index(99), HashAlgorithmKind::Fnv128a);
        assert_eq!(HashAlgorithmKind::from_index(-1), HashAlgorithmKind::Fnv128a);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(HashAlgorithmKind::from_name("XXHash"), Some(HashAlgorithmKind::Xxhash));
        assert_eq!(HashAlgorithmKind::from_name("FNV"), Some(HashAlgorithmKind::Fnv128a));
        assert_eq!(HashAlgorithmKind::from_name("Sha-256"), Some(HashAlgorithmKind::Sha256));
        assert_eq!(HashAlgorithmKind::from_name("whirlpool"), None);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let error = "crc32".parse::<HashAlgorithmKind>().unwrap_err();
        assert!(error.to_string().contains("crc32"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in HashAlgorithmKind::ALL {
            assert_eq!(kind.to_string().parse::<HashAlgorithmKind>().unwrap(), kind);
        }
    }

    #[test]
    fn output_size_matches_sum_length() {
        for kind in HashAlgorithmKind::ALL {
            let digest = kind.new_digest();
            assert_eq!(digest.sum().len(), digest.output_size(), "{kind}");
        }
    }

    #[test]
    fn incremental_writes_match_single_write() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        for kind in HashAlgorithmKind::ALL {
            let mut digest = kind.new_digest();
            for chunk in data.chunks(977) {
                digest.write(chunk);
            }
            assert_eq!(digest.sum(), digest_of(kind, &data), "{kind}");
        }
    }

    #[test]
    fn reset_restores_initial_state() {
        for kind in HashAlgorithmKind::ALL {
            let mut digest = kind.new_digest();
            digest.write(b"some earlier content");
            digest.reset();
            digest.write(b"payload");
            assert_eq!(digest.sum(), digest_of(kind, b"payload"), "{kind}");
        }
    }

    #[test]
    fn sum_does_not_consume_state() {
        let mut digest = HashAlgorithmKind::Sha256.new_digest();
        digest.write(b"abc");
        assert_eq!(digest.sum(), digest.sum());
    }

    #[test]
    fn known_vectors() {
        assert_eq!(
            to_hex(&digest_of(HashAlgorithmKind::Md5, b"abc")),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            to_hex(&digest_of(HashAlgorithmKind::Sha256, b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            to_hex(&digest_of(HashAlgorithmKind::Xxhash, b"")),
            "ef46db3751d8e999"
        );
    }

    #[test]
    fn digest_writer_feeds_digest() {
        use std::io::Write;

        let mut digest = HashAlgorithmKind::Xxhash.new_digest();
        let mut writer = DigestWriter(digest.as_mut());
        writer.write_all(b"hello").unwrap();
        assert_eq!(digest.sum(), digest_of(HashAlgorithmKind::Xxhash, b"hello"));
    }
}
