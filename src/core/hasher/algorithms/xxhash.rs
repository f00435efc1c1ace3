//! xxHash family wrappers.

use crate::core::hasher::Digest;
use xxhash_rust::xxh3::Xxh3;
use xxhash_rust::xxh64::Xxh64;

const SEED: u64 = 0;

pub struct Xxh64Digest(Xxh64);

impl Xxh64Digest {
    pub fn new() -> Self {
        Self(Xxh64::new(SEED))
    }
}

impl Default for Xxh64Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Xxh64Digest {
    fn reset(&mut self) {
        self.0.reset(SEED);
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn sum(&self) -> Vec<u8> {
        self.0.digest().to_be_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        8
    }
}

pub struct Xxh3Digest(Xxh3);

impl Xxh3Digest {
    pub fn new() -> Self {
        Self(Xxh3::new())
    }
}

impl Default for Xxh3Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Xxh3Digest {
    fn reset(&mut self) {
        self.0.reset();
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn sum(&self) -> Vec<u8> {
        self.0.digest().to_be_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        8
    }
}

pub struct Xxh128Digest(Xxh3);

impl Xxh128Digest {
    pub fn new() -> Self {
        Self(Xxh3::new())
    }
}

impl Default for Xxh128Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Xxh128Digest {
    fn reset(&mut self) {
        self.0.reset();
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn sum(&self) -> Vec<u8> {
        self.0.digest128().to_be_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        16
    }
}
