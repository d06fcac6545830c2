//! Creation-bytes container.
//!
//! [`CreationBytes`] bundles a code segment and a data segment with the fixed
//! header the AT machine expects when a new AT is deployed. The encoded form is
//! what gets hashed and submitted, so it must be reproducible byte for byte.
//!
//! # Layout
//!
//! ```text
//! version i16 | reserved i16 | code_pages i16 | data_pages i16
//! call_stack_pages i16 | user_stack_pages i16 | min_activation i64
//! code_len (u8 | u16 | u32) | code
//! data_len (u8 | u16 | u32) | data
//! ```
//!
//! Code pages are one byte each and data pages one 8-byte word each. The width
//! of each length prefix follows from the segment length: below 256 one byte,
//! below 65536 two bytes, four bytes otherwise.

use crate::at::errors::AtError;
use crate::types::encoding::{Decode, Encode, EncodeSink, read_bytes};
use crate::types::hash::Hash;
use crowdfund_derive::BinaryCodec;

/// AT container format version.
pub const AT_VERSION: i16 = 2;
/// Width of one data-segment word.
pub const WORD_SIZE: usize = 8;
/// Default call and user stack page counts.
pub const DEFAULT_STACK_PAGES: i16 = 0;
/// Default minimum activation amount.
pub const DEFAULT_MIN_ACTIVATION: i64 = 0;

/// Fixed-size container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinaryCodec)]
pub struct Header {
    pub version: i16,
    pub reserved: i16,
    pub code_pages: i16,
    pub data_pages: i16,
    pub call_stack_pages: i16,
    pub user_stack_pages: i16,
    /// Smallest payment that wakes the AT.
    pub min_activation: i64,
}

/// A deployable AT: header plus code and data segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationBytes {
    pub header: Header,
    pub code: Vec<u8>,
    pub data: Vec<u8>,
}

fn page_count(segment: &'static str, pages: usize) -> Result<i16, AtError> {
    i16::try_from(pages).map_err(|_| AtError::SegmentTooLarge {
        segment,
        len: pages,
    })
}

fn malformed(reason: &str) -> AtError {
    AtError::Decode {
        reason: reason.to_string(),
    }
}

fn write_len<S: EncodeSink>(len: usize, out: &mut S) {
    if len < 0x100 {
        (len as u8).encode(out);
    } else if len < 0x1_0000 {
        (len as u16).encode(out);
    } else {
        (len as u32).encode(out);
    }
}

fn read_len(expected: usize, input: &mut &[u8]) -> Result<usize, AtError> {
    let len = if expected < 0x100 {
        u8::decode(input).map(usize::from)
    } else if expected < 0x1_0000 {
        u16::decode(input).map(usize::from)
    } else {
        u32::decode(input).map(|n| n as usize)
    };
    len.map_err(|_| malformed("truncated"))
}

impl CreationBytes {
    /// Wraps the segments with default stack sizes and minimum activation.
    ///
    /// The header always carries [`AT_VERSION`]; it is the only version the
    /// decoder accepts, so there is no setter for it.
    pub fn new(code: Vec<u8>, data: Vec<u8>) -> Result<Self, AtError> {
        if data.len() % WORD_SIZE != 0 {
            return Err(AtError::MisalignedData { len: data.len() });
        }
        let header = Header {
            version: AT_VERSION,
            reserved: 0,
            code_pages: page_count("code", code.len())?,
            data_pages: page_count("data", data.len() / WORD_SIZE)?,
            call_stack_pages: DEFAULT_STACK_PAGES,
            user_stack_pages: DEFAULT_STACK_PAGES,
            min_activation: DEFAULT_MIN_ACTIVATION,
        };
        Ok(Self { header, code, data })
    }

    pub fn with_stack_pages(mut self, call: i16, user: i16) -> Self {
        self.header.call_stack_pages = call;
        self.header.user_stack_pages = user;
        self
    }

    pub fn with_min_activation(mut self, amount: i64) -> Self {
        self.header.min_activation = amount;
        self
    }

    /// SHA-256 of the code segment.
    pub fn code_hash(&self) -> Hash {
        Hash::digest(&self.code)
    }

    /// Base58 text form of the encoded container.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_bytes()).into_string()
    }

    /// Deserializes creation bytes.
    ///
    /// Rejects unknown versions, segment lengths that disagree with the page
    /// counts, truncated input and trailing bytes.
    pub fn from_bytes(mut input: &[u8]) -> Result<Self, AtError> {
        let header = Header::decode(&mut input).map_err(|_| malformed("truncated"))?;
        if header.version != AT_VERSION {
            return Err(malformed("unsupported version"));
        }
        if header.code_pages < 0 || header.data_pages < 0 {
            return Err(malformed("negative page count"));
        }

        let code_len = header.code_pages as usize;
        if read_len(code_len, &mut input)? != code_len {
            return Err(malformed("code length disagrees with page count"));
        }
        let code = read_bytes(&mut input, code_len)
            .map_err(|_| malformed("truncated"))?
            .to_vec();

        let data_len = header.data_pages as usize * WORD_SIZE;
        if read_len(data_len, &mut input)? != data_len {
            return Err(malformed("data length disagrees with page count"));
        }
        let data = read_bytes(&mut input, data_len)
            .map_err(|_| malformed("truncated"))?
            .to_vec();

        if !input.is_empty() {
            return Err(malformed("trailing bytes"));
        }
        Ok(Self { header, code, data })
    }

    /// Decodes the Base58 text form.
    pub fn from_base58(text: &str) -> Result<Self, AtError> {
        let bytes = bs58::decode(text.trim())
            .into_vec()
            .map_err(|e| AtError::Decode {
                reason: format!("invalid Base58: {e}"),
            })?;
        Self::from_bytes(&bytes)
    }
}

impl Encode for CreationBytes {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.header.encode(out);
        write_len(self.code.len(), out);
        out.write(&self.code);
        write_len(self.data.len(), out);
        out.write(&self.data);
    }
}
