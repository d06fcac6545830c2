//! Crowdfunding AT template.
//!
//! [`compile`] validates the parameters, lays out the data segment, assembles
//! the program in two passes and wraps both segments in creation bytes. The
//! code segment does not depend on the parameters, so every instance of the
//! template shares one code hash.

pub mod codegen;
pub mod errors;
pub mod layout;
pub mod params;


use crate::at::assembler::{Label, assemble};
use crate::at::program::CreationBytes;
use crate::crowdfund::errors::CompileError;
use crate::crowdfund::layout::{Slots, data_segment};
use crate::crowdfund::params::Params;
use crate::types::encoding::Encode;
use crate::types::hash::Hash;
use std::collections::BTreeMap;

/// Compiles the template into encoded creation bytes.
pub fn compile(window_minutes: i64, goal_amount: i64, awardee: &str) -> Result<Vec<u8>, CompileError> {
    let params = Params::validate(window_minutes, goal_amount, awardee)?;
    Ok(CrowdfundTemplate::build(&params)?.creation_bytes())
}

/// Builder for [`CompiledProgram`]s.
pub struct CrowdfundTemplate;

impl CrowdfundTemplate {
    /// Assembles the program for already validated parameters.
    pub fn build(params: &Params) -> Result<CompiledProgram, CompileError> {
        let slots = Slots::allocate();
        let data = data_segment(&slots, params);
        let assembled = assemble(|e| codegen::emit_program(e, &slots))?;
        let container = CreationBytes::new(assembled.code.clone(), data.clone())?;
        Ok(CompiledProgram {
            code: assembled.code,
            data,
            labels: assembled.labels,
            slots,
            params: *params,
            container,
        })
    }
}

/// A compiled template instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    pub code: Vec<u8>,
    pub data: Vec<u8>,
    pub labels: BTreeMap<Label, usize>,
    pub slots: Slots,
    pub params: Params,
    container: CreationBytes,
}

impl CompiledProgram {
    /// The encoded creation bytes.
    pub fn creation_bytes(&self) -> Vec<u8> {
        self.container.to_bytes()
    }

    pub fn container(&self) -> &CreationBytes {
        &self.container
    }

    /// SHA-256 of the code segment, identical for every parameter set.
    pub fn code_hash(&self) -> Hash {
        self.container.code_hash()
    }
}
