//! Cryptographic digests for users who want collision resistance over speed.

use crate::core::hasher::Digest;
use md5::{Digest as Md5Trait, Md5};
use sha2::{Digest as Sha2Trait, Sha256, Sha512};

#[derive(Clone)]
pub struct Md5Digest(Md5);

impl Md5Digest {
    pub fn new() -> Self {
        Self(Md5::new())
    }
}

impl Default for Md5Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Md5Digest {
    fn reset(&mut self) {
        Md5Trait::reset(&mut self.0);
    }

    fn write(&mut self, bytes: &[u8]) {
        Md5Trait::update(&mut self.0, bytes);
    }

    fn sum(&self) -> Vec<u8> {
        Md5Trait::finalize(self.0.clone()).to_vec()
    }

    fn output_size(&self) -> usize {
        <Md5 as Md5Trait>::output_size()
    }
}

#[derive(Clone)]
pub struct Sha256Digest(Sha256);

impl Sha256Digest {
    pub fn new() -> Self {
        Self(Sha256::new())
    }
}

impl Default for Sha256Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Sha256Digest {
    fn reset(&mut self) {
        Sha2Trait::reset(&mut self.0);
    }

    fn write(&mut self, bytes: &[u8]) {
        Sha2Trait::update(&mut self.0, bytes);
    }

    fn sum(&self) -> Vec<u8> {
        Sha2Trait::finalize(self.0.clone()).to_vec()
    }

    fn output_size(&self) -> usize {
        <Sha256 as Sha2Trait>::output_size()
    }
}

#[derive(Clone)]
pub struct Sha512Digest(Sha512);

impl Sha512Digest {
    pub fn new() -> Self {
        Self(Sha512::new())
    }
}

impl Default for Sha512Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Sha512Digest {
    fn reset(&mut self) {
        Sha2Trait::reset(&mut self.0);
    }

    fn write(&mut self, bytes: &[u8]) {
        Sha2Trait::update(&mut self.0, bytes);
    }

    fn sum(&self) -> Vec<u8> {
        Sha2Trait::finalize(self.0.clone()).to_vec()
    }

    fn output_size(&self) -> usize {
        <Sha512 as Sha2Trait>::output_size()
    }
}

#[derive(Clone)]
pub struct Blake3Digest(blake3::Hasher);

impl Blake3Digest {
    pub fn new() -> Self {
        Self(blake3::Hasher::new())
    }
}

impl Default for Blake3Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Blake3Digest {
    fn reset(&mut self) {
        self.0.reset();
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn sum(&self) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        blake3::OUT_LEN
    }
}
