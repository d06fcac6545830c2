//! Operand kinds and the generic instruction decoder.

use crate::at::errors::AtError;
use crate::at::isa::{FunctionCode, OpCode};
use crate::types::encoding::{Decode, DecodeError, read_bytes};
use std::fmt;

/// Operand kind as listed in the opcode table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OperandKind {
    /// Data-segment slot index, 4 bytes.
    Addr,
    /// Immediate value, 8 bytes.
    Value,
    /// External function code, 2 bytes.
    Func,
    /// Branch offset from the start of the instruction, 1 byte.
    Offset,
    /// Absolute code-segment offset, 4 bytes.
    CodeAddr,
}

impl OperandKind {
    /// Returns the encoded width in bytes.
    pub const fn width(&self) -> usize {
        match self {
            OperandKind::Addr => 4,
            OperandKind::Value => 8,
            OperandKind::Func => 2,
            OperandKind::Offset => 1,
            OperandKind::CodeAddr => 4,
        }
    }
}

/// A decoded operand value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operand {
    Addr(u32),
    Value(i64),
    Func(FunctionCode),
    Offset(i8),
    CodeAddr(u32),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Addr(slot) => write!(f, "@{slot}"),
            Operand::Value(v) => write!(f, "#{v}"),
            Operand::Func(func) => f.write_str(func.mnemonic()),
            Operand::Offset(o) => write!(f, "{o:+}"),
            Operand::CodeAddr(a) => write!(f, ":{a:04x}"),
        }
    }
}

/// One instruction decoded from a code segment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Decoded {
    /// Offset of the opcode byte.
    pub offset: usize,
    pub opcode: OpCode,
    pub operands: Vec<Operand>,
}

impl Decoded {
    /// Encoded length of the instruction.
    pub fn size(&self) -> usize {
        self.opcode.size()
    }

    /// Offset of the following instruction.
    pub fn next(&self) -> usize {
        self.offset + self.size()
    }

    /// Absolute target of a relative branch, or `None` for other opcodes.
    pub fn branch_target(&self) -> Option<usize> {
        self.operands.iter().find_map(|op| match op {
            Operand::Offset(o) => self.offset.checked_add_signed(*o as isize),
            _ => None,
        })
    }

    /// Absolute target of a jump, call or error-handler operand.
    pub fn code_target(&self) -> Option<usize> {
        self.operands.iter().find_map(|op| match op {
            Operand::CodeAddr(a) => Some(*a as usize),
            _ => None,
        })
    }
}

/// Decodes the instruction starting at `offset`.
pub fn decode_at(code: &[u8], offset: usize) -> Result<Decoded, AtError> {
    let byte = *code
        .get(offset)
        .ok_or(AtError::UnexpectedEndOfCode { offset })?;
    let opcode = OpCode::try_from(byte).map_err(|_| AtError::InvalidOpcode {
        opcode: byte,
        offset,
    })?;

    let end = offset + opcode.size();
    if end > code.len() {
        return Err(AtError::UnexpectedEndOfCode { offset });
    }

    let mut input = &code[offset + 1..end];
    let mut operands = Vec::with_capacity(opcode.operands().len());
    for kind in opcode.operands() {
        let truncated = |_: DecodeError| AtError::UnexpectedEndOfCode { offset };
        let operand = match kind {
            OperandKind::Addr => Operand::Addr(u32::decode(&mut input).map_err(truncated)?),
            OperandKind::Value => Operand::Value(i64::decode(&mut input).map_err(truncated)?),
            OperandKind::Offset => Operand::Offset(i8::decode(&mut input).map_err(truncated)?),
            OperandKind::CodeAddr => {
                Operand::CodeAddr(u32::decode(&mut input).map_err(truncated)?)
            }
            OperandKind::Func => {
                let raw = read_bytes(&mut input, 2).map_err(truncated)?;
                let code = u16::from_be_bytes([raw[0], raw[1]]);
                Operand::Func(
                    FunctionCode::try_from(code)
                        .map_err(|_| AtError::InvalidFunctionCode { code, offset })?,
                )
            }
        };
        operands.push(operand);
    }

    Ok(Decoded {
        offset,
        opcode,
        operands,
    })
}

/// Decodes a whole code segment in order.
pub fn decode_all(code: &[u8]) -> Result<Vec<Decoded>, AtError> {
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < code.len() {
        let instr = decode_at(code, offset)?;
        offset = instr.next();
        out.push(instr);
    }
    Ok(out)
}
