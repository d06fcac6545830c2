//! Core value types shared by the compiler and the AT encoder.
//!
//! - `Address`: 25-byte checksummed account address with Base58 text form
//! - `Amount`: fixed-point currency amount with eight decimals
//! - `Hash`: SHA-256 digest used for checksums and code fingerprints
//! - `encoding`: big-endian `Encode`/`Decode` traits for the wire format

pub mod address;
pub mod amount;
pub mod encoding;
pub mod hash;
