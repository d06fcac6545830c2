//! Crowdfunding AT template compiler.
//!
//! Builds creation bytes for an automated transaction that collects donations
//! during an entry window, then either pays its balance to an awardee once the
//! goal is met or refunds every donor.
//!
//! - [`at`]: instruction set, two-pass assembler, creation-bytes container and
//!   disassembler.
//! - [`crowdfund`]: parameter validation, data layout and the program itself.
//! - [`types`]: addresses, amounts, hashing and binary encoding.

pub mod at;
pub mod crowdfund;
pub mod types;
pub mod utils;
