use std::collections::BTreeMap;

use casm_contract::ProgramJson;
use casm_ir::function::Function;
use casm_ir::instruction::{Instruction, Opcode};
use num_traits::ToPrimitive;

use crate::decode;
use crate::error::Result;

/// Build the disassembled function list for a parsed contract program.
///
/// Decodes the data words once, attaches hints and labels by pc, resolves
/// direct-call cross references against function entry points, and slices
/// the instruction stream at function boundaries.
pub fn build_functions(program: &ProgramJson) -> Result<Vec<Function>> {
    let prime = program.field_prime()?;
    let words = program.data_words()?;
    let mut instructions = decode::decode_program(&words, &prime)?;

    for insn in &mut instructions {
        insn.hint = program.hint_at(insn.id);
    }

    let decls = program.function_decls();
    let entry_names: BTreeMap<u64, &str> = decls
        .iter()
        .map(|decl| (decl.pc, decl.name.as_str()))
        .collect();

    for insn in &mut instructions {
        if insn.opcode == Opcode::Call && insn.is_call_direct() {
            let target = if insn.is_call_abs() {
                insn.signed_imm().and_then(|v| v.to_u64())
            } else {
                insn.relative_target()
            };
            insn.callee = target
                .and_then(|t| entry_names.get(&t))
                .map(|name| name.to_string());
        }
    }

    let labels = program.labels();
    let end_pc = words.len() as u64;

    let mut functions = Vec::with_capacity(decls.len());
    for (i, decl) in decls.iter().enumerate() {
        let next_pc = decls.get(i + 1).map_or(end_pc, |next| next.pc);
        let body: Vec<Instruction> = instructions
            .iter()
            .filter(|insn| insn.id >= decl.pc && insn.id < next_pc)
            .cloned()
            .collect();
        let fn_labels = labels
            .range(decl.pc..next_pc)
            .map(|(id, name)| (*id, name.clone()))
            .collect();

        functions.push(Function {
            name: decl.name.clone(),
            args: program.member_names(&format!("{}.Args", decl.name)),
            implicit_args: program.member_names(&format!("{}.ImplicitArgs", decl.name)),
            // An empty return struct means the function returns nothing.
            ret: program
                .member_names(&format!("{}.Return", decl.name))
                .filter(|names| !names.is_empty()),
            is_import: !decl.name.starts_with("__main__"),
            entry_pc: decl.pc,
            decorators: decl.decorators.clone(),
            instructions: body,
            labels: fn_labels,
        });
    }

    Ok(functions)
}
