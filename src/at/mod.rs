//! Encoder for the CIYAM automated-transaction (AT) machine.
//!
//! The AT machine runs small programs attached to an account: a code segment
//! of fixed-width instructions over a data segment of 8-byte words, plus two
//! 32-byte pseudo registers (A and B) used to exchange values with the chain
//! through external function calls.
//!
//! # Modules
//!
//! - [`isa`]: opcode and function-code tables
//! - [`operand`]: operand kinds and the generic instruction decoder
//! - [`assembler`]: typed instructions and the two-pass label-resolving emitter
//! - [`program`]: creation-bytes container
//! - [`disasm`]: listing renderer
//! - [`errors`]: error type shared by the above

pub mod assembler;
pub mod disasm;
pub mod errors;
pub mod isa;
#[cfg(test)]
pub mod machine;
pub mod operand;
pub mod program;
