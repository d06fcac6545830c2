use crate::at::errors::AtError;
use crate::types::address::AddressError;
use crowdfund_derive::Error;

/// Errors returned by [`compile`](super::compile).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A numeric parameter lies outside its accepted range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    ParameterOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// The awardee is not a well-formed address.
    #[error("invalid awardee address '{address}': {reason}")]
    InvalidRecipient {
        address: String,
        reason: AddressError,
    },
    /// The emitter produced an inconsistent program. Never caused by input.
    #[error("internal assembly error: {0}")]
    AssemblyInternalError(#[from] AtError),
}

impl CompileError {
    /// Returns true for errors caused by the caller's parameters.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, CompileError::AssemblyInternalError(_))
    }
}
