//! The crowdfund program.
//!
//! On its first run the AT records its creation timestamp as the refund-loop
//! cursor, computes the end of the entry window and sleeps until then. When it
//! wakes it either pays its whole balance to the awardee (goal reached) or
//! walks every transaction received before the window closed and pays each
//! payment back to its sender. Anything left over goes to the creator when the
//! AT finishes.

use crate::at::assembler::{Emitter, Instr, Label};
use crate::at::errors::AtError;
use crate::at::isa::{FunctionCode, HEIGHT_SHIFT};
use crate::crowdfund::layout::Slots;

pub const REFUND_DONORS: Label = Label("refund_donors");
pub const TXN_LOOP: Label = Label("txn_loop");
pub const REFUND_TXN: Label = Label("refund_txn");
pub const CHECK_TYPE: Label = Label("check_type");

/// Emits the program into `e`. Runs once per assembler pass.
pub fn emit_program(e: &mut Emitter, s: &Slots) -> Result<(), AtError> {
    use FunctionCode as F;

    e.emit(Instr::ExtFunRet {
        func: F::GetCreationTimestamp,
        dest: s.last_txn_timestamp,
    });
    e.emit(Instr::ExtFunRet {
        func: F::GetBlockTimestamp,
        dest: s.sleep_until_timestamp,
    });
    e.emit(Instr::ExtFunRetDat2 {
        func: F::AddMinutesToTimestamp,
        dest: s.sleep_until_timestamp,
        arg1: s.sleep_until_timestamp,
        arg2: s.window_minutes,
    });
    e.emit(Instr::SetDat {
        dest: s.sleep_until_height,
        src: s.sleep_until_timestamp,
    });
    e.emit(Instr::ShrVal {
        dest: s.sleep_until_height,
        value: HEIGHT_SHIFT,
    });
    e.emit(Instr::SlpDat {
        height: s.sleep_until_height,
    });

    // Window closed.
    e.emit(Instr::ExtFunRet {
        func: F::GetCurrentBalance,
        dest: s.final_balance,
    });
    e.emit(Instr::BltDat {
        left: s.final_balance,
        right: s.goal_amount,
        offset: e.branch_offset(REFUND_DONORS)?,
    });
    e.emit(Instr::ExtFunVal {
        func: F::SetBDat,
        value: i64::from(s.awardee),
    });
    e.emit(Instr::ExtFun {
        func: F::PayAllToAddressInB,
    });
    e.emit(Instr::FinImd {});

    e.label(REFUND_DONORS)?;
    e.emit(Instr::SetPcs {});

    e.label(TXN_LOOP)?;
    e.emit(Instr::ExtFunDat {
        func: F::PutTxAfterTimestampIntoA,
        arg: s.last_txn_timestamp,
    });
    e.emit(Instr::ExtFunRet {
        func: F::CheckAIsZero,
        dest: s.scratch_result,
    });
    e.emit(Instr::BzrDat {
        src: s.scratch_result,
        offset: e.branch_offset(REFUND_TXN)?,
    });
    e.emit(Instr::FinImd {});

    e.label(REFUND_TXN)?;
    e.emit(Instr::ExtFunRet {
        func: F::GetTimestampFromTxInA,
        dest: s.last_txn_timestamp,
    });
    // Transactions at or after the wake-up block are not refunded.
    e.emit(Instr::BltDat {
        left: s.last_txn_timestamp,
        right: s.sleep_until_timestamp,
        offset: e.branch_offset(CHECK_TYPE)?,
    });
    e.emit(Instr::FinImd {});

    e.label(CHECK_TYPE)?;
    e.emit(Instr::ExtFunRet {
        func: F::GetTypeFromTxInA,
        dest: s.txn_type,
    });
    e.emit(Instr::BneDat {
        left: s.txn_type,
        right: s.payment_type,
        offset: e.branch_offset(TXN_LOOP)?,
    });
    e.emit(Instr::ExtFunRet {
        func: F::GetAmountFromTxInA,
        dest: s.payment_amount,
    });
    e.emit(Instr::ExtFun {
        func: F::PutAddressFromTxInAIntoB,
    });
    e.emit(Instr::ExtFunDat {
        func: F::PayToAddressInB,
        arg: s.payment_amount,
    });
    e.emit(Instr::JmpAdr {
        target: e.code_address(TXN_LOOP)?,
    });
    Ok(())
}
