//! Instruction set of the CIYAM automated-transaction (AT) machine, version 2.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode table and invokes a callback macro for code generation, and
//! [`for_each_function!`](crate::for_each_function) does the same for the
//! external function codes. The assembler, the decoder and the ISA fingerprint
//! test all expand the same tables.
//!
//! This module generates:
//! - The [`OpCode`] enum with byte mappings, operand kinds and encoded sizes
//! - The [`FunctionCode`] enum with its 16-bit codes and names
//! - `TryFrom<u8>` / `TryFrom<u16>` for decoding
//!
//! # Bytecode Format
//!
//! Every instruction is an opcode byte followed by fixed-width big-endian
//! operands (see [`OperandKind`]), so an opcode alone determines the
//! instruction length.

use crate::at::errors::AtError;
use crate::at::operand::OperandKind;

/// Timestamps are `height << HEIGHT_SHIFT | transaction sequence`.
pub const HEIGHT_SHIFT: i64 = 32;
/// Blocks per minute assumed by `ADD_MINUTES_TO_TIMESTAMP`.
pub const BLOCKS_PER_MINUTE: i64 = 1;

/// Transaction type of a value transfer.
pub const TX_TYPE_PAYMENT: i64 = 0;
/// Transaction type of a message without value.
pub const TX_TYPE_MESSAGE: i64 = 1;

/// Invokes a callback macro with the complete opcode definition list.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            /// NOP ; no operation
            Nop = 0x7f, "NOP" => [],
            /// SET_VAL dest, value ; @dest = value
            SetVal = 0x01, "SET_VAL" => [dest: Addr, value: Value],
            /// SET_DAT dest, src ; @dest = @src
            SetDat = 0x02, "SET_DAT" => [dest: Addr, src: Addr],
            /// CLR_DAT dest ; @dest = 0
            ClrDat = 0x03, "CLR_DAT" => [dest: Addr],
            /// INC_DAT dest ; @dest += 1
            IncDat = 0x04, "INC_DAT" => [dest: Addr],
            /// DEC_DAT dest ; @dest -= 1
            DecDat = 0x05, "DEC_DAT" => [dest: Addr],
            /// ADD_DAT dest, src ; @dest += @src
            AddDat = 0x06, "ADD_DAT" => [dest: Addr, src: Addr],
            /// SUB_DAT dest, src ; @dest -= @src
            SubDat = 0x07, "SUB_DAT" => [dest: Addr, src: Addr],
            /// MUL_DAT dest, src ; @dest *= @src
            MulDat = 0x08, "MUL_DAT" => [dest: Addr, src: Addr],
            /// DIV_DAT dest, src ; @dest /= @src
            DivDat = 0x09, "DIV_DAT" => [dest: Addr, src: Addr],
            /// BOR_DAT dest, src ; @dest |= @src
            BorDat = 0x0a, "BOR_DAT" => [dest: Addr, src: Addr],
            /// AND_DAT dest, src ; @dest &= @src
            AndDat = 0x0b, "AND_DAT" => [dest: Addr, src: Addr],
            /// XOR_DAT dest, src ; @dest ^= @src
            XorDat = 0x0c, "XOR_DAT" => [dest: Addr, src: Addr],
            /// NOT_DAT dest ; @dest = !@dest
            NotDat = 0x0d, "NOT_DAT" => [dest: Addr],
            /// SET_IND dest, ptr ; @dest = @(@ptr)
            SetInd = 0x0e, "SET_IND" => [dest: Addr, ptr: Addr],
            /// SET_IDX dest, base, index ; @dest = @(@base + @index)
            SetIdx = 0x0f, "SET_IDX" => [dest: Addr, base: Addr, index: Addr],
            /// PSH_DAT src ; push @src onto the user stack
            PshDat = 0x10, "PSH_DAT" => [src: Addr],
            /// POP_DAT dest ; pop the user stack into @dest
            PopDat = 0x11, "POP_DAT" => [dest: Addr],
            /// JMP_SUB target ; call subroutine at target
            JmpSub = 0x12, "JMP_SUB" => [target: CodeAddr],
            /// RET_SUB ; return from subroutine
            RetSub = 0x13, "RET_SUB" => [],
            /// IND_DAT ptr, src ; @(@ptr) = @src
            IndDat = 0x14, "IND_DAT" => [ptr: Addr, src: Addr],
            /// IDX_DAT base, index, src ; @(@base + @index) = @src
            IdxDat = 0x15, "IDX_DAT" => [base: Addr, index: Addr, src: Addr],
            /// MOD_DAT dest, src ; @dest %= @src
            ModDat = 0x16, "MOD_DAT" => [dest: Addr, src: Addr],
            /// SHL_DAT dest, src ; @dest <<= @src
            ShlDat = 0x17, "SHL_DAT" => [dest: Addr, src: Addr],
            /// SHR_DAT dest, src ; @dest >>= @src
            ShrDat = 0x18, "SHR_DAT" => [dest: Addr, src: Addr],
            /// JMP_ADR target ; pc = target
            JmpAdr = 0x1a, "JMP_ADR" => [target: CodeAddr],
            /// BZR_DAT src, offset ; if @src == 0 then pc += offset
            BzrDat = 0x1b, "BZR_DAT" => [src: Addr, offset: Offset],
            /// BNZ_DAT src, offset ; if @src != 0 then pc += offset
            BnzDat = 0x1e, "BNZ_DAT" => [src: Addr, offset: Offset],
            /// BGT_DAT left, right, offset ; if @left > @right then pc += offset
            BgtDat = 0x1f, "BGT_DAT" => [left: Addr, right: Addr, offset: Offset],
            /// BLT_DAT left, right, offset ; if @left < @right then pc += offset
            BltDat = 0x20, "BLT_DAT" => [left: Addr, right: Addr, offset: Offset],
            /// BGE_DAT left, right, offset ; if @left >= @right then pc += offset
            BgeDat = 0x21, "BGE_DAT" => [left: Addr, right: Addr, offset: Offset],
            /// BLE_DAT left, right, offset ; if @left <= @right then pc += offset
            BleDat = 0x22, "BLE_DAT" => [left: Addr, right: Addr, offset: Offset],
            /// BEQ_DAT left, right, offset ; if @left == @right then pc += offset
            BeqDat = 0x23, "BEQ_DAT" => [left: Addr, right: Addr, offset: Offset],
            /// BNE_DAT left, right, offset ; if @left != @right then pc += offset
            BneDat = 0x24, "BNE_DAT" => [left: Addr, right: Addr, offset: Offset],
            /// SLP_DAT height ; sleep until block height @height
            SlpDat = 0x25, "SLP_DAT" => [height: Addr],
            /// FIZ_DAT src ; finish if @src == 0
            FizDat = 0x26, "FIZ_DAT" => [src: Addr],
            /// STZ_DAT src ; stop if @src == 0
            StzDat = 0x27, "STZ_DAT" => [src: Addr],
            /// FIN_IMD ; finish
            FinImd = 0x28, "FIN_IMD" => [],
            /// STP_IMD ; stop until next activation
            StpImd = 0x29, "STP_IMD" => [],
            /// SLP_IMD ; sleep until next block
            SlpImd = 0x2a, "SLP_IMD" => [],
            /// ERR_ADR target ; set error handler to target
            ErrAdr = 0x2b, "ERR_ADR" => [target: CodeAddr],
            /// SLP_VAL blocks ; sleep for a number of blocks
            SlpVal = 0x2c, "SLP_VAL" => [blocks: Value],
            /// SET_PCS ; restart point = next instruction
            SetPcs = 0x30, "SET_PCS" => [],
            /// EXT_FUN func ; call func()
            ExtFun = 0x32, "EXT_FUN" => [func: Func],
            /// EXT_FUN_DAT func, arg ; call func(@arg)
            ExtFunDat = 0x33, "EXT_FUN_DAT" => [func: Func, arg: Addr],
            /// EXT_FUN_DAT_2 func, arg1, arg2 ; call func(@arg1, @arg2)
            ExtFunDat2 = 0x34, "EXT_FUN_DAT_2" => [func: Func, arg1: Addr, arg2: Addr],
            /// EXT_FUN_RET func, dest ; @dest = func()
            ExtFunRet = 0x35, "EXT_FUN_RET" => [func: Func, dest: Addr],
            /// EXT_FUN_RET_DAT func, dest, arg ; @dest = func(@arg)
            ExtFunRetDat = 0x36, "EXT_FUN_RET_DAT" => [func: Func, dest: Addr, arg: Addr],
            /// EXT_FUN_RET_DAT_2 func, dest, arg1, arg2 ; @dest = func(@arg1, @arg2)
            ExtFunRetDat2 = 0x37, "EXT_FUN_RET_DAT_2" => [func: Func, dest: Addr, arg1: Addr, arg2: Addr],
            /// EXT_FUN_VAL func, value ; call func(value)
            ExtFunVal = 0x38, "EXT_FUN_VAL" => [func: Func, value: Value],
            /// ADD_VAL dest, value ; @dest += value
            AddVal = 0x46, "ADD_VAL" => [dest: Addr, value: Value],
            /// SUB_VAL dest, value ; @dest -= value
            SubVal = 0x47, "SUB_VAL" => [dest: Addr, value: Value],
            /// MUL_VAL dest, value ; @dest *= value
            MulVal = 0x48, "MUL_VAL" => [dest: Addr, value: Value],
            /// DIV_VAL dest, value ; @dest /= value
            DivVal = 0x49, "DIV_VAL" => [dest: Addr, value: Value],
            /// SHL_VAL dest, value ; @dest <<= value
            ShlVal = 0x4a, "SHL_VAL" => [dest: Addr, value: Value],
            /// SHR_VAL dest, value ; @dest >>= value
            ShrVal = 0x4b, "SHR_VAL" => [dest: Addr, value: Value],
        }
    };
}

/// Invokes a callback macro with the external function code list.
#[macro_export]
macro_rules! for_each_function {
    ($callback:ident) => {
        $callback! {
            // A/B register access
            GetA1 = 0x0100, "GET_A1",
            GetA2 = 0x0101, "GET_A2",
            GetA3 = 0x0102, "GET_A3",
            GetA4 = 0x0103, "GET_A4",
            GetB1 = 0x0104, "GET_B1",
            GetB2 = 0x0105, "GET_B2",
            GetB3 = 0x0106, "GET_B3",
            GetB4 = 0x0107, "GET_B4",
            SetA1 = 0x0110, "SET_A1",
            SetA2 = 0x0111, "SET_A2",
            SetA3 = 0x0112, "SET_A3",
            SetA4 = 0x0113, "SET_A4",
            SetA1A2 = 0x0114, "SET_A1_A2",
            SetA3A4 = 0x0115, "SET_A3_A4",
            SetB1 = 0x0116, "SET_B1",
            SetB2 = 0x0117, "SET_B2",
            SetB3 = 0x0118, "SET_B3",
            SetB4 = 0x0119, "SET_B4",
            SetB1B2 = 0x011a, "SET_B1_B2",
            SetB3B4 = 0x011b, "SET_B3_B4",
            // A/B register arithmetic
            ClearA = 0x0120, "CLEAR_A",
            ClearB = 0x0121, "CLEAR_B",
            ClearAAndB = 0x0122, "CLEAR_A_AND_B",
            CopyAFromB = 0x0123, "COPY_A_FROM_B",
            CopyBFromA = 0x0124, "COPY_B_FROM_A",
            CheckAIsZero = 0x0125, "CHECK_A_IS_ZERO",
            CheckBIsZero = 0x0126, "CHECK_B_IS_ZERO",
            CheckAEqualsB = 0x0127, "CHECK_A_EQUALS_B",
            SwapAAndB = 0x0128, "SWAP_A_AND_B",
            OrAWithB = 0x0129, "OR_A_WITH_B",
            OrBWithA = 0x012a, "OR_B_WITH_A",
            AndAWithB = 0x012b, "AND_A_WITH_B",
            AndBWithA = 0x012c, "AND_B_WITH_A",
            XorAWithB = 0x012d, "XOR_A_WITH_B",
            XorBWithA = 0x012e, "XOR_B_WITH_A",
            // A/B bulk copy to and from data
            GetADat = 0x0132, "GET_A_DAT",
            GetBDat = 0x0133, "GET_B_DAT",
            SetADat = 0x0134, "SET_A_DAT",
            SetBDat = 0x0135, "SET_B_DAT",
            // Hashing
            Md5AToB = 0x0200, "MD5_A_TO_B",
            CheckMd5AWithB = 0x0201, "CHECK_MD5_A_WITH_B",
            Hash160AToB = 0x0202, "HASH160_A_TO_B",
            CheckHash160AWithB = 0x0203, "CHECK_HASH160_A_WITH_B",
            Sha256AToB = 0x0204, "SHA256_A_TO_B",
            CheckSha256AWithB = 0x0205, "CHECK_SHA256_A_WITH_B",
            // Blocks and transactions
            GetBlockTimestamp = 0x0300, "GET_BLOCK_TIMESTAMP",
            GetCreationTimestamp = 0x0301, "GET_CREATION_TIMESTAMP",
            GetPreviousBlockTimestamp = 0x0302, "GET_PREVIOUS_BLOCK_TIMESTAMP",
            PutPreviousBlockHashIntoA = 0x0303, "PUT_PREVIOUS_BLOCK_HASH_INTO_A",
            PutTxAfterTimestampIntoA = 0x0304, "PUT_TX_AFTER_TIMESTAMP_INTO_A",
            GetTypeFromTxInA = 0x0305, "GET_TYPE_FROM_TX_IN_A",
            GetAmountFromTxInA = 0x0306, "GET_AMOUNT_FROM_TX_IN_A",
            GetTimestampFromTxInA = 0x0307, "GET_TIMESTAMP_FROM_TX_IN_A",
            GenerateRandomUsingTxInA = 0x0308, "GENERATE_RANDOM_USING_TX_IN_A",
            PutMessageFromTxInAIntoB = 0x0309, "PUT_MESSAGE_FROM_TX_IN_A_INTO_B",
            PutAddressFromTxInAIntoB = 0x030a, "PUT_ADDRESS_FROM_TX_IN_A_INTO_B",
            PutCreatorIntoB = 0x030b, "PUT_CREATOR_INTO_B",
            // Balances and payments
            GetCurrentBalance = 0x0400, "GET_CURRENT_BALANCE",
            GetPreviousBalance = 0x0401, "GET_PREVIOUS_BALANCE",
            PayToAddressInB = 0x0402, "PAY_TO_ADDRESS_IN_B",
            PayAllToAddressInB = 0x0403, "PAY_ALL_TO_ADDRESS_IN_B",
            PayPreviousToAddressInB = 0x0404, "PAY_PREVIOUS_TO_ADDRESS_IN_B",
            MessageAToAddressInB = 0x0405, "MESSAGE_A_TO_ADDRESS_IN_B",
            AddMinutesToTimestamp = 0x0406, "ADD_MINUTES_TO_TIMESTAMP",
        }
    };
}

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        #[repr(u8)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum OpCode {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<u8> for OpCode {
            type Error = AtError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(OpCode::$name), )*
                    _ => Err(AtError::InvalidOpcode {
                        opcode: value,
                        offset: 0,
                    }),
                }
            }
        }

        impl OpCode {
            /// Returns the assembly mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( OpCode::$name => $mnemonic, )*
                }
            }

            /// Returns the operand kinds in encoding order.
            pub const fn operands(&self) -> &'static [OperandKind] {
                match self {
                    $( OpCode::$name => &[ $( OperandKind::$kind ),* ], )*
                }
            }

            /// Returns the encoded size (opcode + operands).
            pub const fn size(&self) -> usize {
                match self {
                    $( OpCode::$name => 1usize $( + define_opcodes!(@size $kind) )*, )*
                }
            }
        }
    };

    // ---------- operand sizes ----------
    (@size Addr)     => { 4usize };
    (@size Value)    => { 8usize };
    (@size Func)     => { 2usize };
    (@size Offset)   => { 1usize };
    (@size CodeAddr) => { 4usize };

    // ---------- types ----------
    (@ty Addr)     => { u32 };
    (@ty Value)    => { i64 };
    (@ty Func)     => { $crate::at::isa::FunctionCode };
    (@ty Offset)   => { i8 };
    (@ty CodeAddr) => { u32 };

    // ---------- encoding ----------
    (@emit $out:ident, Func, $v:ident) => {
        $crate::types::encoding::Encode::encode(&$v.code(), $out)
    };

    (@emit $out:ident, $kind:ident, $v:ident) => {
        $crate::types::encoding::Encode::encode($v, $out)
    };
}

#[macro_export]
macro_rules! define_functions {
    (
        $( $name:ident = $code:literal, $mnemonic:literal ),* $(,)?
    ) => {
        /// External function codes callable through the `EXT_FUN*` opcodes.
        #[repr(u16)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum FunctionCode {
            $( $name = $code, )*
        }

        impl TryFrom<u16> for FunctionCode {
            type Error = AtError;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $code => Ok(FunctionCode::$name), )*
                    _ => Err(AtError::InvalidFunctionCode {
                        code: value,
                        offset: 0,
                    }),
                }
            }
        }

        impl FunctionCode {
            pub const fn code(self) -> u16 {
                self as u16
            }

            /// Returns the canonical function name.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( FunctionCode::$name => $mnemonic, )*
                }
            }
        }
    };
}

for_each_opcode!(define_opcodes);
for_each_function!(define_functions);

impl OpCode {
    /// Returns true if the last operand is a relative branch offset.
    pub const fn is_branch(&self) -> bool {
        matches!(self.operands().last(), Some(OperandKind::Offset))
    }
}
