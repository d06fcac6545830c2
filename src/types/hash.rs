//! 32-byte SHA-256 hash type.

use crate::types::encoding::EncodeSink;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 hash length in bytes.
pub const HASH_LEN: usize = 32;

/// Fixed-size 32-byte SHA-256 digest.
///
/// Used for address checksums and to fingerprint compiled code segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash, Ord, PartialOrd)]
pub struct Hash(pub [u8; HASH_LEN]);

impl Hash {
    /// Creates a zero-valued hash (all bytes are 0x00).
    pub const fn zero() -> Hash {
        Hash([0u8; HASH_LEN])
    }

    /// Returns the hash as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Creates a new SHA-256 hash builder for incremental hashing.
    pub fn sha256() -> HashBuilder {
        HashBuilder::new()
    }

    /// Hashes `data` in one call.
    pub fn digest(data: &[u8]) -> Hash {
        let mut h = Hash::sha256();
        h.update(data);
        h.finalize()
    }

    /// SHA-256 applied twice, as used by address checksums.
    pub fn double_digest(data: &[u8]) -> Hash {
        Hash::digest(Hash::digest(data).as_slice())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Incremental SHA-256 hash builder.
///
/// Implements [`EncodeSink`] so encodable types can be hashed directly
/// without intermediate byte buffers.
pub struct HashBuilder {
    hasher: Sha256,
}

impl HashBuilder {
    /// Creates a new hash builder with empty state.
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Feeds data into the hash computation.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Consumes the builder and returns the final hash.
    pub fn finalize(self) -> Hash {
        Hash(self.hasher.finalize().into())
    }
}

impl Default for HashBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeSink for HashBuilder {
    fn write(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }
}
