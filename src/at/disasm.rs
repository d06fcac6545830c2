//! Code-segment disassembler.
//!
//! Renders one line per instruction: hex offset, a `>` marker on branch and
//! jump targets, mnemonic and operands. Relative branch operands are shown as
//! the absolute offset they land on.

use crate::at::assembler::Label;
use crate::at::errors::AtError;
use crate::at::operand::{Decoded, Operand, decode_all};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Disassembles `code`.
pub fn disassemble(code: &[u8]) -> Result<String, AtError> {
    disassemble_with_labels(code, &BTreeMap::new())
}

/// Disassembles `code`, printing a `name:` line before each labelled offset.
pub fn disassemble_with_labels(
    code: &[u8],
    labels: &BTreeMap<Label, usize>,
) -> Result<String, AtError> {
    let instrs = decode_all(code)?;
    let targets: BTreeSet<usize> = instrs
        .iter()
        .filter_map(|i| i.branch_target().or_else(|| i.code_target()))
        .collect();

    let mut names: BTreeMap<usize, Vec<Label>> = BTreeMap::new();
    for (label, offset) in labels {
        names.entry(*offset).or_default().push(*label);
    }

    let mut out = String::new();
    for instr in &instrs {
        for label in names.get(&instr.offset).into_iter().flatten() {
            let _ = writeln!(out, "{label}:");
        }
        let marker = if targets.contains(&instr.offset) { '>' } else { ' ' };
        let line = format!(
            "{:04x}{marker} {:<18} {}",
            instr.offset,
            instr.opcode.mnemonic(),
            render_operands(instr)
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    Ok(out)
}

fn render_operands(instr: &Decoded) -> String {
    instr
        .operands
        .iter()
        .map(|op| match (op, instr.branch_target()) {
            (Operand::Offset(_), Some(target)) => format!(":{target:04x}"),
            _ => op.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
