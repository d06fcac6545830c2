//! Data-segment layout.
//!
//! Slots are 8-byte words numbered in allocation order. Every scalar takes one
//! slot; the awardee address takes four consecutive slots so it can be loaded
//! into the B register with a single `SET_B_DAT`.

use crate::at::isa::TX_TYPE_PAYMENT;
use crate::at::program::WORD_SIZE;
use crate::crowdfund::params::Params;

/// Slots taken by an address loaded into a register.
pub const ADDRESS_SLOTS: u32 = 4;

/// Hands out slot numbers in order.
#[derive(Debug, Default)]
struct SlotAllocator {
    next: u32,
}

impl SlotAllocator {
    fn word(&mut self) -> u32 {
        self.words(1)
    }

    fn words(&mut self, count: u32) -> u32 {
        let slot = self.next;
        self.next += count;
        slot
    }
}

/// Slot numbers of every variable used by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slots {
    pub window_minutes: u32,
    pub goal_amount: u32,
    /// Block timestamp at which the entry window closes.
    pub sleep_until_timestamp: u32,
    pub sleep_until_height: u32,
    pub final_balance: u32,
    /// Timestamp of the last transaction looked at by the refund loop.
    pub last_txn_timestamp: u32,
    pub scratch_result: u32,
    pub txn_type: u32,
    /// Constant transaction type matched by the refund loop.
    pub payment_type: u32,
    pub payment_amount: u32,
    /// First of [`ADDRESS_SLOTS`] slots.
    pub awardee: u32,
    count: u32,
}

impl Slots {
    pub fn allocate() -> Self {
        let mut alloc = SlotAllocator::default();
        Self {
            window_minutes: alloc.word(),
            goal_amount: alloc.word(),
            sleep_until_timestamp: alloc.word(),
            sleep_until_height: alloc.word(),
            final_balance: alloc.word(),
            last_txn_timestamp: alloc.word(),
            scratch_result: alloc.word(),
            txn_type: alloc.word(),
            payment_type: alloc.word(),
            payment_amount: alloc.word(),
            awardee: alloc.words(ADDRESS_SLOTS),
            count: alloc.next,
        }
    }

    /// Number of slots allocated.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Size in bytes of the data segment.
    pub fn data_len(&self) -> usize {
        self.count as usize * WORD_SIZE
    }
}

impl Default for Slots {
    fn default() -> Self {
        Self::allocate()
    }
}

fn put_word(data: &mut [u8], slot: u32, value: i64) {
    let start = slot as usize * WORD_SIZE;
    data[start..start + WORD_SIZE].copy_from_slice(&value.to_be_bytes());
}

/// Builds the initial data segment. Slots not written here start at zero.
pub fn data_segment(slots: &Slots, params: &Params) -> Vec<u8> {
    let mut data = vec![0u8; slots.data_len()];
    put_word(&mut data, slots.window_minutes, params.window_minutes);
    put_word(&mut data, slots.goal_amount, params.goal.units());
    put_word(&mut data, slots.payment_type, TX_TYPE_PAYMENT);

    let start = slots.awardee as usize * WORD_SIZE;
    let padded = params.awardee.to_padded::<{ ADDRESS_SLOTS as usize * WORD_SIZE }>();
    data[start..start + padded.len()].copy_from_slice(&padded);
    data
}
