//! Two-pass AT code emitter.
//!
//! Uses [`for_each_opcode!`](crate::for_each_opcode) to generate [`Instr`], one
//! variant per opcode with typed operand fields, and its byte encoding.
//!
//! Programs are written as a closure over an [`Emitter`] and run twice by
//! [`assemble`]:
//!
//! 1. The layout pass records where every label lands. Branches to labels that
//!    are not placed yet get a placeholder operand.
//! 2. The emit pass re-runs the closure from an empty buffer, resolving every
//!    label against the layout pass.
//!
//! Each opcode has a fixed encoded size, so both passes place every
//! instruction at the same offset. The driver still compares the label tables
//! and lengths of both passes and fails with an [`AtError`] if they differ.

use crate::at::errors::AtError;
use crate::at::isa::OpCode;
use crate::at::operand::{Decoded, Operand, decode_at};
use crate::define_opcodes;
use crate::for_each_opcode;
use crate::types::encoding::{Encode, EncodeSink};
use std::collections::BTreeMap;
use std::fmt;

/// Named position in the code segment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Label(pub &'static str);

impl Label {
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

macro_rules! define_instr {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        /// A single instruction with its operand values.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Instr {
            $(
                $name {
                    $( $field: define_opcodes!(@ty $kind) ),*
                },
            )*
        }

        impl Instr {
            /// Returns the opcode of this instruction.
            pub const fn opcode(&self) -> OpCode {
                match self {
                    $( Instr::$name { .. } => OpCode::$name, )*
                }
            }
        }

        impl TryFrom<&Decoded> for Instr {
            type Error = AtError;

            fn try_from(decoded: &Decoded) -> Result<Self, Self::Error> {
                let mut ops = decoded.operands.iter();
                let mismatch = || AtError::Decode {
                    reason: format!("operand mismatch at {}", decoded.offset),
                };
                match decoded.opcode {
                    $(
                        OpCode::$name => Ok(Instr::$name {
                            $( $field: define_instr!(@take ops, $kind).ok_or_else(mismatch)?, )*
                        }),
                    )*
                }
            }
        }

        impl Encode for Instr {
            fn encode<S: EncodeSink>(&self, out: &mut S) {
                match self {
                    $(
                        Instr::$name { $( $field ),* } => {
                            out.write(&[OpCode::$name as u8]);
                            $(
                                define_opcodes!(@emit out, $kind, $field);
                            )*
                        }
                    ),*
                }
            }
        }
    };

    (@take $ops:ident, $kind:ident) => {
        match $ops.next() {
            Some(Operand::$kind(v)) => Some(*v),
            _ => None,
        }
    };
}

for_each_opcode!(define_instr);

impl Instr {
    /// Decodes the instruction starting at `offset`.
    pub fn decode_at(code: &[u8], offset: usize) -> Result<Instr, AtError> {
        Instr::try_from(&decode_at(code, offset)?)
    }
}

/// Which of the two passes an [`Emitter`] is running.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Pass {
    /// Placing labels; forward references are not known yet.
    Layout,
    /// Final emission with every label known.
    Emit,
}

/// Append-only code buffer plus the label tables of one pass.
#[derive(Debug)]
pub struct Emitter {
    code: Vec<u8>,
    pass: Pass,
    /// Labels placed so far in this pass.
    labels: BTreeMap<Label, usize>,
    /// Labels placed by the layout pass, empty during the layout pass.
    resolved: BTreeMap<Label, usize>,
}

impl Emitter {
    fn new(pass: Pass, resolved: BTreeMap<Label, usize>) -> Self {
        Self {
            code: Vec::new(),
            pass,
            labels: BTreeMap::new(),
            resolved,
        }
    }

    pub fn pass(&self) -> Pass {
        self.pass
    }

    /// Offset at which the next instruction will be placed.
    pub fn offset(&self) -> usize {
        self.code.len()
    }

    /// Appends one instruction.
    pub fn emit(&mut self, instr: Instr) {
        instr.encode(&mut self.code);
    }

    /// Places `label` at the current offset.
    pub fn label(&mut self, label: Label) -> Result<(), AtError> {
        let offset = self.offset();
        if self.labels.contains_key(&label) {
            return Err(AtError::DuplicateLabel { label: label.0 });
        }
        if self.pass == Pass::Emit
            && let Some(&first) = self.resolved.get(&label)
            && first != offset
        {
            return Err(AtError::LabelMoved {
                label: label.0,
                first,
                second: offset,
            });
        }
        self.labels.insert(label, offset);
        Ok(())
    }

    /// Looks up a label, returning `None` for a forward reference during layout.
    fn lookup(&self, label: Label) -> Result<Option<usize>, AtError> {
        match self.pass {
            Pass::Layout => Ok(self.labels.get(&label).copied()),
            Pass::Emit => self
                .resolved
                .get(&label)
                .copied()
                .map(Some)
                .ok_or(AtError::UndefinedLabel { label: label.0 }),
        }
    }

    /// Relative offset from the branch about to be emitted to `label`.
    pub fn branch_offset(&self, label: Label) -> Result<i8, AtError> {
        let at = self.offset();
        let Some(target) = self.lookup(label)? else {
            return Ok(0);
        };
        let delta = target as i64 - at as i64;
        i8::try_from(delta).map_err(|_| AtError::BranchOutOfRange {
            label: label.0,
            at,
            target,
        })
    }

    /// Absolute code address of `label`.
    pub fn code_address(&self, label: Label) -> Result<u32, AtError> {
        let Some(target) = self.lookup(label)? else {
            return Ok(0);
        };
        u32::try_from(target).map_err(|_| AtError::CodeAddressOverflow { offset: target })
    }
}

/// Output of [`assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub code: Vec<u8>,
    pub labels: BTreeMap<Label, usize>,
}

/// Runs `program` through the layout and emit passes.
pub fn assemble<F>(mut program: F) -> Result<Assembled, AtError>
where
    F: FnMut(&mut Emitter) -> Result<(), AtError>,
{
    let mut layout = Emitter::new(Pass::Layout, BTreeMap::new());
    program(&mut layout)?;
    let first_len = layout.code.len();

    let mut emit = Emitter::new(Pass::Emit, layout.labels);
    program(&mut emit)?;

    if emit.code.len() != first_len {
        return Err(AtError::LengthDiverged {
            first: first_len,
            second: emit.code.len(),
        });
    }
    if let Some(label) = emit.resolved.keys().find(|l| !emit.labels.contains_key(*l)) {
        return Err(AtError::UndefinedLabel { label: label.0 });
    }

    Ok(Assembled {
        code: emit.code,
        labels: emit.labels,
    })
}
