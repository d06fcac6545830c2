//! 25-byte checksummed account addresses and their Base58 text form.
//!
//! Layout: `version (1) || payload (20) || checksum (4)`, where the checksum is
//! the first four bytes of SHA-256(SHA-256(version || payload)).

use crate::types::hash::Hash;
use crowdfund_derive::Error;
use std::fmt;
use std::str::FromStr;

/// Encoded address length in bytes.
pub const ADDRESS_LEN: usize = 25;
/// Length of the public-key hash carried by an address.
pub const PAYLOAD_LEN: usize = 20;
/// Length of the trailing checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Address version byte, selecting which kind of account the address names.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressVersion {
    /// Regular account (text form starts with `Q`).
    Account = 58,
    /// Automated-transaction account (text form starts with `A`).
    AutomatedTransaction = 23,
}

impl TryFrom<u8> for AddressVersion {
    type Error = AddressError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            58 => Ok(AddressVersion::Account),
            23 => Ok(AddressVersion::AutomatedTransaction),
            other => Err(AddressError::UnknownVersion { version: other }),
        }
    }
}

/// Reasons an address fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("not valid Base58: {reason}")]
    InvalidBase58 { reason: String },
    #[error("expected 25 bytes, got {actual}")]
    InvalidLength { actual: usize },
    #[error("unknown address version {version}")]
    UnknownVersion { version: u8 },
    #[error("checksum mismatch")]
    ChecksumMismatch,
}

/// A validated address. Construction always checks version and checksum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Builds an address from its version and payload, computing the checksum.
    pub fn new(version: AddressVersion, payload: [u8; PAYLOAD_LEN]) -> Address {
        let mut raw = [0u8; ADDRESS_LEN];
        raw[0] = version as u8;
        raw[1..1 + PAYLOAD_LEN].copy_from_slice(&payload);
        let checksum = checksum(&raw[..1 + PAYLOAD_LEN]);
        raw[1 + PAYLOAD_LEN..].copy_from_slice(&checksum);
        Address(raw)
    }

    pub fn version(&self) -> AddressVersion {
        if self.0[0] == AddressVersion::AutomatedTransaction as u8 {
            AddressVersion::AutomatedTransaction
        } else {
            AddressVersion::Account
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.0[1..1 + PAYLOAD_LEN]
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Returns the address zero-padded to `N` bytes, for machine words that
    /// are wider than the address itself.
    pub fn to_padded<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        let n = ADDRESS_LEN.min(N);
        out[..n].copy_from_slice(&self.0[..n]);
        out
    }

    /// Base58 text form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Hash::double_digest(data);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest.as_slice()[..CHECKSUM_LEN]);
    out
}

impl TryFrom<&[u8]> for Address {
    type Error = AddressError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength {
                actual: bytes.len(),
            })?;
        AddressVersion::try_from(raw[0])?;

        let (body, passed) = raw.split_at(ADDRESS_LEN - CHECKSUM_LEN);
        if checksum(body) != passed {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(Address(raw))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58 {
                reason: e.to_string(),
            })?;
        Address::try_from(bytes.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}
