//! 128-bit FNV-1 and FNV-1a.

use crate::core::hasher::Digest;

const OFFSET_BASIS: u128 = 0x6c62272e07bb014262b821756295c58d;
const PRIME: u128 = 0x0000000001000000000000000000013b;

/// FNV-1: multiply, then xor
#[derive(Debug, Clone)]
pub struct Fnv128Digest {
    state: u128,
}

impl Fnv128Digest {
    pub fn new() -> Self {
        Self {
            state: OFFSET_BASIS,
        }
    }
}

impl Default for Fnv128Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Fnv128Digest {
    fn reset(&mut self) {
        self.state = OFFSET_BASIS;
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = self.state.wrapping_mul(PRIME) ^ u128::from(b);
        }
    }

    fn sum(&self) -> Vec<u8> {
        self.state.to_be_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        16
    }
}

/// FNV-1a: xor, then multiply
#[derive(Debug, Clone)]
pub struct Fnv128aDigest {
    state: u128,
}

impl Fnv128aDigest {
    pub fn new() -> Self {
        Self {
            state: OFFSET_BASIS,
        }
    }
}

impl Default for Fnv128aDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl Digest for Fnv128aDigest {
    fn reset(&mut self) {
        self.state = OFFSET_BASIS;
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = (self.state ^ u128::from(b)).wrapping_mul(PRIME);
        }
    }

    fn sum(&self) -> Vec<u8> {
        self.state.to_be_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        16
    }
}
