use crate::types::encoding::DecodeError;
use crowdfund_derive::Error;

/// Errors raised while assembling, encoding or decoding AT programs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtError {
    /// A branch or jump names a label that no pass defined.
    #[error("undefined label: {label}")]
    UndefinedLabel { label: &'static str },
    /// The same label was placed twice in one pass.
    #[error("duplicate label: {label}")]
    DuplicateLabel { label: &'static str },
    /// The second pass placed a label somewhere other than the first pass did.
    #[error("label {label} moved between passes: {first} then {second}")]
    LabelMoved {
        label: &'static str,
        first: usize,
        second: usize,
    },
    /// The passes emitted code segments of different lengths.
    #[error("code length diverged between passes: {first} then {second}")]
    LengthDiverged { first: usize, second: usize },
    /// A relative branch target does not fit the signed one-byte offset.
    #[error("branch at {at} to {label} ({target}) is out of range")]
    BranchOutOfRange {
        label: &'static str,
        at: usize,
        target: usize,
    },
    /// A code address does not fit the 32-bit operand.
    #[error("code address {offset} does not fit in 32 bits")]
    CodeAddressOverflow { offset: usize },
    /// Unknown opcode byte while decoding.
    #[error("invalid opcode 0x{opcode:02x} at {offset}")]
    InvalidOpcode { opcode: u8, offset: usize },
    /// Unknown external function code while decoding.
    #[error("invalid function code 0x{code:04x} at {offset}")]
    InvalidFunctionCode { code: u16, offset: usize },
    /// The code segment ends in the middle of an instruction.
    #[error("unexpected end of code at {offset}")]
    UnexpectedEndOfCode { offset: usize },
    /// A segment is larger than the container can describe.
    #[error("{segment} segment of {len} bytes is too large")]
    SegmentTooLarge { segment: &'static str, len: usize },
    /// The data segment is not a whole number of 8-byte words.
    #[error("data segment of {len} bytes is not a multiple of 8")]
    MisalignedData { len: usize },
    /// Malformed creation bytes.
    #[error("decoding error: {reason}")]
    Decode { reason: String },
}

impl From<DecodeError> for AtError {
    fn from(err: DecodeError) -> Self {
        AtError::Decode {
            reason: err.to_string(),
        }
    }
}
