//! Reference AT interpreter hosted on a mock chain.
//!
//! Executes creation bytes the way a node would: the AT runs once per block
//! while awake, sleeps on `SLP_*`, and pays its remaining balance back to its
//! creator when it finishes. Block timestamps are `height << 32`, and the
//! `n`-th transaction of a block gets sequence `n` (the deploy transaction has
//! sequence 0).

use crate::at::assembler::Instr;
use crate::at::isa::{BLOCKS_PER_MINUTE, FunctionCode, HEIGHT_SHIFT, TX_TYPE_MESSAGE, TX_TYPE_PAYMENT};
use crate::at::program::{CreationBytes, WORD_SIZE};
use crate::types::address::{ADDRESS_LEN, Address};

/// Instructions executed per activation before the AT is faulted.
const STEP_LIMIT: usize = 100_000;

pub fn block_timestamp(height: u32, seq: u32) -> i64 {
    (i64::from(height) << HEIGHT_SHIFT) | i64::from(seq)
}

/// A transaction sent to the AT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    pub kind: i64,
    pub sender: Address,
    pub amount: i64,
    pub timestamp: i64,
}

/// A payment made by the AT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub recipient: Address,
    pub amount: i64,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Runs at the next block.
    Ready,
    Sleeping { until: u32 },
    Finished,
    Faulted,
}

enum Flow {
    Continue,
    Sleep(u32),
    Stop,
    Finish,
}

/// Chain state visible to a running AT.
struct Env<'a> {
    height: u32,
    txs: &'a [Tx],
    payments: &'a mut Vec<Payment>,
}

fn words(address: &Address) -> [i64; 4] {
    let padded: [u8; 4 * WORD_SIZE] = address.to_padded();
    let mut out = [0i64; 4];
    for (word, chunk) in out.iter_mut().zip(padded.chunks_exact(WORD_SIZE)) {
        let mut raw = [0u8; WORD_SIZE];
        raw.copy_from_slice(chunk);
        *word = i64::from_be_bytes(raw);
    }
    out
}

fn address_from_words(w: &[i64; 4]) -> Result<Address, String> {
    let bytes: Vec<u8> = w.iter().flat_map(|v| v.to_be_bytes()).collect();
    Address::try_from(&bytes[..ADDRESS_LEN]).map_err(|e| format!("no address in B: {e}"))
}

fn arg(args: &[i64], i: usize) -> Result<i64, String> {
    args.get(i).copied().ok_or_else(|| format!("missing argument {i}"))
}

pub struct Machine {
    code: Vec<u8>,
    data: Vec<i64>,
    a: [i64; 4],
    b: [i64; 4],
    pc: usize,
    pcs: usize,
    err_handler: Option<usize>,
    call_stack: Vec<usize>,
    user_stack: Vec<i64>,
    status: Status,
    fault: Option<String>,
    creator: Address,
    creation_timestamp: i64,
    balance: i64,
}

impl Machine {
    fn new(creation: &CreationBytes, creator: Address, creation_timestamp: i64, balance: i64) -> Self {
        let data = creation
            .data
            .chunks_exact(WORD_SIZE)
            .map(|chunk| {
                let mut raw = [0u8; WORD_SIZE];
                raw.copy_from_slice(chunk);
                i64::from_be_bytes(raw)
            })
            .collect();
        Self {
            code: creation.code.clone(),
            data,
            a: [0; 4],
            b: [0; 4],
            pc: 0,
            pcs: 0,
            err_handler: None,
            call_stack: Vec::new(),
            user_stack: Vec::new(),
            status: Status::Ready,
            fault: None,
            creator,
            creation_timestamp,
            balance,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Value of a data slot.
    pub fn slot(&self, index: u32) -> i64 {
        self.data[index as usize]
    }

    fn awake_at(&self, height: u32) -> bool {
        match self.status {
            Status::Ready => true,
            Status::Sleeping { until } => height >= until,
            Status::Finished | Status::Faulted => false,
        }
    }

    fn load(&self, addr: u32) -> Result<i64, String> {
        self.data
            .get(addr as usize)
            .copied()
            .ok_or_else(|| format!("slot {addr} out of bounds"))
    }

    fn store(&mut self, addr: u32, value: i64) -> Result<(), String> {
        let slot = self
            .data
            .get_mut(addr as usize)
            .ok_or_else(|| format!("slot {addr} out of bounds"))?;
        *slot = value;
        Ok(())
    }

    fn indirect(value: i64) -> Result<u32, String> {
        u32::try_from(value).map_err(|_| format!("invalid slot reference {value}"))
    }

    fn binary(&mut self, dest: u32, rhs: i64, op: fn(i64, i64) -> Option<i64>) -> Result<(), String> {
        let lhs = self.load(dest)?;
        let value = op(lhs, rhs).ok_or("arithmetic fault")?;
        self.store(dest, value)
    }

    fn load_words(&self, addr: i64) -> Result<[i64; 4], String> {
        let base = Self::indirect(addr)?;
        let mut out = [0i64; 4];
        for (i, word) in out.iter_mut().enumerate() {
            *word = self.load(base + i as u32)?;
        }
        Ok(out)
    }

    fn store_words(&mut self, addr: i64, words: [i64; 4]) -> Result<(), String> {
        let base = Self::indirect(addr)?;
        for (i, word) in words.into_iter().enumerate() {
            self.store(base + i as u32, word)?;
        }
        Ok(())
    }

    fn tx_in_a<'a>(&self, env: &Env<'a>) -> Option<&'a Tx> {
        let id = usize::try_from(self.a[0]).ok()?;
        env.txs.get(id.checked_sub(1)?)
    }

    fn pay(&mut self, env: &mut Env<'_>, recipient: Address, amount: i64) {
        let amount = amount.clamp(0, self.balance);
        if amount == 0 {
            return;
        }
        self.balance -= amount;
        env.payments.push(Payment {
            recipient,
            amount,
            height: env.height,
        });
    }

    fn call(&mut self, env: &mut Env<'_>, func: FunctionCode, args: &[i64]) -> Result<i64, String> {
        use FunctionCode as F;
        let value = match func {
            F::GetA1 | F::GetA2 | F::GetA3 | F::GetA4 => self.a[func.code() as usize - 0x0100],
            F::GetB1 | F::GetB2 | F::GetB3 | F::GetB4 => self.b[func.code() as usize - 0x0104],
            F::SetA1 | F::SetA2 | F::SetA3 | F::SetA4 => {
                self.a[func.code() as usize - 0x0110] = arg(args, 0)?;
                0
            }
            F::SetB1 | F::SetB2 | F::SetB3 | F::SetB4 => {
                self.b[func.code() as usize - 0x0116] = arg(args, 0)?;
                0
            }
            F::SetA1A2 => {
                self.a[0] = arg(args, 0)?;
                self.a[1] = arg(args, 1)?;
                0
            }
            F::SetA3A4 => {
                self.a[2] = arg(args, 0)?;
                self.a[3] = arg(args, 1)?;
                0
            }
            F::SetB1B2 => {
                self.b[0] = arg(args, 0)?;
                self.b[1] = arg(args, 1)?;
                0
            }
            F::SetB3B4 => {
                self.b[2] = arg(args, 0)?;
                self.b[3] = arg(args, 1)?;
                0
            }
            F::ClearA => {
                self.a = [0; 4];
                0
            }
            F::ClearB => {
                self.b = [0; 4];
                0
            }
            F::ClearAAndB => {
                self.a = [0; 4];
                self.b = [0; 4];
                0
            }
            F::CopyAFromB => {
                self.a = self.b;
                0
            }
            F::CopyBFromA => {
                self.b = self.a;
                0
            }
            F::CheckAIsZero => i64::from(self.a == [0; 4]),
            F::CheckBIsZero => i64::from(self.b == [0; 4]),
            F::CheckAEqualsB => i64::from(self.a == self.b),
            F::SwapAAndB => {
                std::mem::swap(&mut self.a, &mut self.b);
                0
            }
            F::OrAWithB | F::AndAWithB | F::XorAWithB => {
                for (a, b) in self.a.iter_mut().zip(self.b) {
                    *a = match func {
                        F::OrAWithB => *a | b,
                        F::AndAWithB => *a & b,
                        _ => *a ^ b,
                    };
                }
                0
            }
            F::OrBWithA | F::AndBWithA | F::XorBWithA => {
                for (b, a) in self.b.iter_mut().zip(self.a) {
                    *b = match func {
                        F::OrBWithA => *b | a,
                        F::AndBWithA => *b & a,
                        _ => *b ^ a,
                    };
                }
                0
            }
            F::GetADat => {
                self.store_words(arg(args, 0)?, self.a)?;
                0
            }
            F::GetBDat => {
                self.store_words(arg(args, 0)?, self.b)?;
                0
            }
            F::SetADat => {
                self.a = self.load_words(arg(args, 0)?)?;
                0
            }
            F::SetBDat => {
                self.b = self.load_words(arg(args, 0)?)?;
                0
            }
            F::GetBlockTimestamp => block_timestamp(env.height, 0),
            F::GetCreationTimestamp => self.creation_timestamp,
            F::GetPreviousBlockTimestamp => block_timestamp(env.height.saturating_sub(1), 0),
            F::PutTxAfterTimestampIntoA => {
                let after = arg(args, 0)?;
                let found = env.txs.iter().position(|tx| tx.timestamp > after);
                self.a = [found.map_or(0, |i| i as i64 + 1), 0, 0, 0];
                0
            }
            F::GetTypeFromTxInA => self.tx_in_a(env).map_or(-1, |tx| tx.kind),
            F::GetAmountFromTxInA => self.tx_in_a(env).map_or(-1, |tx| tx.amount),
            F::GetTimestampFromTxInA => self.tx_in_a(env).map_or(-1, |tx| tx.timestamp),
            F::PutAddressFromTxInAIntoB => {
                self.b = self.tx_in_a(env).map_or([0; 4], |tx| words(&tx.sender));
                0
            }
            F::PutCreatorIntoB => {
                self.b = words(&self.creator);
                0
            }
            F::GetCurrentBalance | F::GetPreviousBalance => self.balance,
            F::PayToAddressInB => {
                let recipient = address_from_words(&self.b)?;
                self.pay(env, recipient, arg(args, 0)?);
                0
            }
            F::PayAllToAddressInB | F::PayPreviousToAddressInB => {
                let recipient = address_from_words(&self.b)?;
                self.pay(env, recipient, self.balance);
                0
            }
            F::AddMinutesToTimestamp => {
                let height = (arg(args, 0)? >> HEIGHT_SHIFT) + arg(args, 1)? * BLOCKS_PER_MINUTE;
                let height = u32::try_from(height).map_err(|_| "timestamp overflow")?;
                block_timestamp(height, 0)
            }
            other => return Err(format!("unsupported function {}", other.mnemonic())),
        };
        Ok(value)
    }

    fn step(&mut self, env: &mut Env<'_>) -> Result<Flow, String> {
        let at = self.pc;
        let instr = Instr::decode_at(&self.code, at).map_err(|e| e.to_string())?;
        let mut next = at + instr.opcode().size();
        let branch_to = |offset: i8| {
            at.checked_add_signed(isize::from(offset))
                .ok_or_else(|| format!("branch before start of code at {at}"))
        };

        match instr {
            Instr::Nop {} => {}
            Instr::SetVal { dest, value } => self.store(dest, value)?,
            Instr::SetDat { dest, src } => self.store(dest, self.load(src)?)?,
            Instr::ClrDat { dest } => self.store(dest, 0)?,
            Instr::IncDat { dest } => self.binary(dest, 1, |a, b| Some(a.wrapping_add(b)))?,
            Instr::DecDat { dest } => self.binary(dest, 1, |a, b| Some(a.wrapping_sub(b)))?,
            Instr::NotDat { dest } => self.store(dest, !self.load(dest)?)?,
            Instr::AddDat { dest, src } => {
                self.binary(dest, self.load(src)?, |a, b| Some(a.wrapping_add(b)))?
            }
            Instr::SubDat { dest, src } => {
                self.binary(dest, self.load(src)?, |a, b| Some(a.wrapping_sub(b)))?
            }
            Instr::MulDat { dest, src } => {
                self.binary(dest, self.load(src)?, |a, b| Some(a.wrapping_mul(b)))?
            }
            Instr::DivDat { dest, src } => self.binary(dest, self.load(src)?, i64::checked_div)?,
            Instr::ModDat { dest, src } => self.binary(dest, self.load(src)?, i64::checked_rem)?,
            Instr::BorDat { dest, src } => self.binary(dest, self.load(src)?, |a, b| Some(a | b))?,
            Instr::AndDat { dest, src } => self.binary(dest, self.load(src)?, |a, b| Some(a & b))?,
            Instr::XorDat { dest, src } => self.binary(dest, self.load(src)?, |a, b| Some(a ^ b))?,
            Instr::ShlDat { dest, src } => self.binary(dest, self.load(src)?, shl)?,
            Instr::ShrDat { dest, src } => self.binary(dest, self.load(src)?, shr)?,
            Instr::AddVal { dest, value } => self.binary(dest, value, |a, b| Some(a.wrapping_add(b)))?,
            Instr::SubVal { dest, value } => self.binary(dest, value, |a, b| Some(a.wrapping_sub(b)))?,
            Instr::MulVal { dest, value } => self.binary(dest, value, |a, b| Some(a.wrapping_mul(b)))?,
            Instr::DivVal { dest, value } => self.binary(dest, value, i64::checked_div)?,
            Instr::ShlVal { dest, value } => self.binary(dest, value, shl)?,
            Instr::ShrVal { dest, value } => self.binary(dest, value, shr)?,
            Instr::SetInd { dest, ptr } => {
                let value = self.load(Self::indirect(self.load(ptr)?)?)?;
                self.store(dest, value)?
            }
            Instr::SetIdx { dest, base, index } => {
                let slot = self.load(base)?.wrapping_add(self.load(index)?);
                let value = self.load(Self::indirect(slot)?)?;
                self.store(dest, value)?
            }
            Instr::IndDat { ptr, src } => {
                let slot = Self::indirect(self.load(ptr)?)?;
                self.store(slot, self.load(src)?)?
            }
            Instr::IdxDat { base, index, src } => {
                let slot = Self::indirect(self.load(base)?.wrapping_add(self.load(index)?))?;
                self.store(slot, self.load(src)?)?
            }
            Instr::PshDat { src } => self.user_stack.push(self.load(src)?),
            Instr::PopDat { dest } => {
                let value = self.user_stack.pop().ok_or("user stack underflow")?;
                self.store(dest, value)?
            }
            Instr::JmpSub { target } => {
                self.call_stack.push(next);
                next = target as usize;
            }
            Instr::RetSub {} => next = self.call_stack.pop().ok_or("call stack underflow")?,
            Instr::JmpAdr { target } => next = target as usize,
            Instr::BzrDat { src, offset } => {
                if self.load(src)? == 0 {
                    next = branch_to(offset)?;
                }
            }
            Instr::BnzDat { src, offset } => {
                if self.load(src)? != 0 {
                    next = branch_to(offset)?;
                }
            }
            Instr::BgtDat { left, right, offset }
            | Instr::BltDat { left, right, offset }
            | Instr::BgeDat { left, right, offset }
            | Instr::BleDat { left, right, offset }
            | Instr::BeqDat { left, right, offset }
            | Instr::BneDat { left, right, offset } => {
                let (l, r) = (self.load(left)?, self.load(right)?);
                let taken = match instr {
                    Instr::BgtDat { .. } => l > r,
                    Instr::BltDat { .. } => l < r,
                    Instr::BgeDat { .. } => l >= r,
                    Instr::BleDat { .. } => l <= r,
                    Instr::BeqDat { .. } => l == r,
                    _ => l != r,
                };
                if taken {
                    next = branch_to(offset)?;
                }
            }
            Instr::SlpDat { height } => {
                let until = u32::try_from(self.load(height)?).map_err(|_| "invalid sleep height")?;
                self.pc = next;
                return Ok(Flow::Sleep(until));
            }
            Instr::SlpImd {} => {
                self.pc = next;
                return Ok(Flow::Sleep(env.height + 1));
            }
            Instr::SlpVal { blocks } => {
                let blocks = u32::try_from(blocks).map_err(|_| "invalid sleep length")?;
                self.pc = next;
                return Ok(Flow::Sleep(env.height.saturating_add(blocks)));
            }
            Instr::FizDat { src } => {
                if self.load(src)? == 0 {
                    return Ok(Flow::Finish);
                }
            }
            Instr::StzDat { src } => {
                if self.load(src)? == 0 {
                    return Ok(Flow::Stop);
                }
            }
            Instr::FinImd {} => return Ok(Flow::Finish),
            Instr::StpImd {} => return Ok(Flow::Stop),
            Instr::ErrAdr { target } => self.err_handler = Some(target as usize),
            Instr::SetPcs {} => self.pcs = next,
            Instr::ExtFun { func } => {
                self.call(env, func, &[])?;
            }
            Instr::ExtFunDat { func, arg } => {
                let args = [self.load(arg)?];
                self.call(env, func, &args)?;
            }
            Instr::ExtFunDat2 { func, arg1, arg2 } => {
                let args = [self.load(arg1)?, self.load(arg2)?];
                self.call(env, func, &args)?;
            }
            Instr::ExtFunVal { func, value } => {
                self.call(env, func, &[value])?;
            }
            Instr::ExtFunRet { func, dest } => {
                let value = self.call(env, func, &[])?;
                self.store(dest, value)?
            }
            Instr::ExtFunRetDat { func, dest, arg } => {
                let args = [self.load(arg)?];
                let value = self.call(env, func, &args)?;
                self.store(dest, value)?
            }
            Instr::ExtFunRetDat2 { func, dest, arg1, arg2 } => {
                let args = [self.load(arg1)?, self.load(arg2)?];
                let value = self.call(env, func, &args)?;
                self.store(dest, value)?
            }
        }

        self.pc = next;
        Ok(Flow::Continue)
    }

    fn finish(&mut self, env: &mut Env<'_>) {
        let creator = self.creator;
        self.pay(env, creator, self.balance);
        self.status = Status::Finished;
    }

    fn run(&mut self, env: &mut Env<'_>) {
        for _ in 0..STEP_LIMIT {
            match self.step(env) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Sleep(until)) => {
                    self.status = Status::Sleeping { until };
                    return;
                }
                Ok(Flow::Stop) => {
                    self.pc = self.pcs;
                    self.status = Status::Ready;
                    return;
                }
                Ok(Flow::Finish) => {
                    self.finish(env);
                    return;
                }
                Err(fault) => match self.err_handler {
                    Some(handler) => self.pc = handler,
                    None => {
                        self.fault = Some(fault);
                        self.status = Status::Faulted;
                        return;
                    }
                },
            }
        }
        self.fault = Some("step limit reached".to_string());
        self.status = Status::Faulted;
    }
}

fn shl(a: i64, b: i64) -> Option<i64> {
    Some(if (0..64).contains(&b) { a << b } else { 0 })
}

fn shr(a: i64, b: i64) -> Option<i64> {
    Some(if (0..64).contains(&b) { ((a as u64) >> b) as i64 } else { 0 })
}

/// A chain hosting a single AT.
pub struct Chain {
    height: u32,
    pending: Vec<Tx>,
    txs: Vec<Tx>,
    payments: Vec<Payment>,
    machine: Machine,
}

impl Chain {
    /// Deploys `creation` at `height`, funded with `funding` by `creator`.
    pub fn deploy(creation: &CreationBytes, creator: Address, funding: i64, height: u32) -> Self {
        let creation_timestamp = block_timestamp(height, 0);
        let deploy = Tx {
            kind: TX_TYPE_PAYMENT,
            sender: creator,
            amount: funding,
            timestamp: creation_timestamp,
        };
        Self {
            height,
            pending: Vec::new(),
            txs: vec![deploy],
            payments: Vec::new(),
            machine: Machine::new(creation, creator, creation_timestamp, funding),
        }
    }

    /// Queues a payment to the AT for the next block.
    pub fn pay(&mut self, sender: Address, amount: i64) {
        self.queue(TX_TYPE_PAYMENT, sender, amount);
    }

    /// Queues a message (optionally carrying value) for the next block.
    pub fn message(&mut self, sender: Address, amount: i64) {
        self.queue(TX_TYPE_MESSAGE, sender, amount);
    }

    fn queue(&mut self, kind: i64, sender: Address, amount: i64) {
        self.pending.push(Tx {
            kind,
            sender,
            amount,
            timestamp: 0,
        });
    }

    /// Mines one block: includes queued transactions, then runs the AT if awake.
    pub fn mine(&mut self) {
        self.height += 1;
        for (seq, mut tx) in self.pending.drain(..).enumerate() {
            tx.timestamp = block_timestamp(self.height, seq as u32 + 1);
            self.machine.balance += tx.amount;
            self.txs.push(tx);
        }

        if self.machine.awake_at(self.height) {
            let mut env = Env {
                height: self.height,
                txs: &self.txs,
                payments: &mut self.payments,
            };
            self.machine.run(&mut env);
        }
    }

    /// Mines until the AT finishes or faults, up to `max_blocks` blocks.
    pub fn mine_until_done(&mut self, max_blocks: u32) -> Status {
        for _ in 0..max_blocks {
            self.mine();
            if matches!(self.machine.status(), Status::Finished | Status::Faulted) {
                break;
            }
        }
        self.machine.status()
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    /// Total paid by the AT to `recipient`.
    pub fn paid_to(&self, recipient: &Address) -> i64 {
        self.payments
            .iter()
            .filter(|p| p.recipient == *recipient)
            .map(|p| p.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::at::assembler::{Label, assemble};
    use crate::types::encoding::Encode;
    use crate::utils::test_utils::utils::{creator, donor};

    fn deploy(code: Vec<u8>, slots: usize, funding: i64) -> Chain {
        let creation = CreationBytes::new(code, vec![0; slots * WORD_SIZE]).unwrap();
        Chain::deploy(&creation, creator(), funding, 100)
    }

    #[test]
    fn block_timestamps_pack_height_and_sequence() {
        assert_eq!(block_timestamp(1, 0), 1 << 32);
        assert_eq!(block_timestamp(7, 3), (7 << 32) | 3);
    }

    #[test]
    fn finish_refunds_creator() {
        let mut chain = deploy(Instr::FinImd {}.to_bytes(), 1, 500);
        assert_eq!(chain.mine_until_done(5), Status::Finished);
        assert_eq!(chain.paid_to(&creator()), 500);
        assert_eq!(chain.machine().balance(), 0);
    }

    #[test]
    fn arithmetic_and_branches() {
        let done = Label("done");
        let top = Label("top");
        let out = assemble(|e| {
            e.emit(Instr::SetVal { dest: 0, value: 5 });
            e.label(top)?;
            e.emit(Instr::AddVal { dest: 1, value: 3 });
            e.emit(Instr::DecDat { dest: 0 });
            e.emit(Instr::BzrDat {
                src: 0,
                offset: e.branch_offset(done)?,
            });
            e.emit(Instr::JmpAdr {
                target: e.code_address(top)?,
            });
            e.label(done)?;
            e.emit(Instr::StpImd {});
            Ok(())
        })
        .unwrap();
        let mut chain = deploy(out.code, 2, 0);
        chain.mine();
        assert_eq!(chain.machine().slot(0), 0);
        assert_eq!(chain.machine().slot(1), 15);
        assert_eq!(chain.machine().status(), Status::Ready);
    }

    #[test]
    fn sleep_until_height() {
        let code = [
            Instr::SetVal {
                dest: 0,
                value: 105,
            }
            .to_bytes(),
            Instr::SlpDat { height: 0 }.to_bytes(),
            Instr::IncDat { dest: 1 }.to_bytes(),
            Instr::FinImd {}.to_bytes(),
        ]
        .concat();
        let mut chain = deploy(code, 2, 0);
        chain.mine();
        assert_eq!(chain.machine().status(), Status::Sleeping { until: 105 });
        for _ in 0..3 {
            chain.mine();
        }
        assert_eq!(chain.machine().slot(1), 0);
        assert_eq!(chain.mine_until_done(5), Status::Finished);
        assert_eq!(chain.height(), 105);
        assert_eq!(chain.machine().slot(1), 1);
    }

    #[test]
    fn transactions_are_found_after_timestamp() {
        let code = [
            Instr::ExtFunDat {
                func: FunctionCode::PutTxAfterTimestampIntoA,
                arg: 0,
            }
            .to_bytes(),
            Instr::ExtFunRet {
                func: FunctionCode::GetAmountFromTxInA,
                dest: 1,
            }
            .to_bytes(),
            Instr::ExtFunRet {
                func: FunctionCode::GetTimestampFromTxInA,
                dest: 2,
            }
            .to_bytes(),
            Instr::FinImd {}.to_bytes(),
        ]
        .concat();
        let mut chain = deploy(code, 3, 10);
        chain.pay(donor(0), 40);
        chain.pay(donor(1), 60);
        chain.mine_until_done(1);
        assert_eq!(chain.machine().slot(1), 10);
        assert_eq!(chain.machine().slot(2), block_timestamp(100, 0));
        assert_eq!(chain.paid_to(&creator()), 110);
    }

    #[test]
    fn faults_without_error_handler() {
        let code = [
            Instr::SetVal { dest: 0, value: 1 }.to_bytes(),
            Instr::DivDat { dest: 0, src: 1 }.to_bytes(),
        ]
        .concat();
        let mut chain = deploy(code, 2, 0);
        assert_eq!(chain.mine_until_done(1), Status::Faulted);
        assert_eq!(chain.machine().fault(), Some("arithmetic fault"));
    }

    #[test]
    fn error_handler_catches_fault() {
        let code = [
            Instr::ErrAdr { target: 19 }.to_bytes(),
            Instr::DivDat { dest: 0, src: 1 }.to_bytes(),
            Instr::NotDat { dest: 0 }.to_bytes(),
            Instr::FinImd {}.to_bytes(),
        ]
        .concat();
        let mut chain = deploy(code, 2, 0);
        assert_eq!(chain.mine_until_done(1), Status::Finished);
        assert_eq!(chain.machine().slot(0), 0);
    }
}
