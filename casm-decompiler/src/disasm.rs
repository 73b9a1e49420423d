use std::fmt::Write;

use casm_ir::function::Function;
use casm_ir::instruction::{ApUpdate, Instruction, Opcode, PcUpdate, ResLogic};

use crate::format;

/// Render the whole program as a flat per-function instruction listing,
/// with no control-flow recovery.
pub fn disassemble(functions: &[Function]) -> String {
    let mut out = String::new();
    for function in functions {
        if function.is_import {
            continue;
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", function.get_prototype());
        for insn in &function.instructions {
            if let Some(label) = function.labels.get(&insn.id) {
                let _ = writeln!(out, "{label}:");
            }
            if let Some(hint) = &insn.hint {
                for line in hint.lines() {
                    let _ = writeln!(out, "        %{{ {line}");
                }
                let _ = writeln!(out, "        %}}");
            }
            let _ = writeln!(
                out,
                "{:>6}:  {:<10} {}",
                insn.id,
                insn.opcode.to_string(),
                describe(insn)
            );
        }
    }
    out
}

/// One-line operand summary for an instruction.
fn describe(insn: &Instruction) -> String {
    match insn.opcode {
        Opcode::AssertEq => {
            let rhs = match insn.res {
                ResLogic::Op1 => format::op1(insn),
                ResLogic::Add => format!("{} + {}", format::op0(insn), format::op1(insn)),
                ResLogic::Mul => format!("{} * {}", format::op0(insn), format::op1(insn)),
            };
            let suffix = match insn.ap_update {
                ApUpdate::Regular => "",
                _ => "; ap ++",
            };
            format!("{} = {rhs}{suffix}", format::dst(insn))
        }
        Opcode::Nop => match insn.pc_update {
            PcUpdate::Regular => "nop".to_string(),
            PcUpdate::Jnz => format!(
                "jmp rel {} if {} != 0",
                format::op1(insn),
                format::dst(insn)
            ),
            PcUpdate::JumpRel => format!("jmp rel {}", format::op1(insn)),
            PcUpdate::JumpAbs => format!("jmp abs {}", format::op1(insn)),
        },
        Opcode::Call => {
            let kind = if insn.is_call_abs() { "abs" } else { "rel" };
            let target = format::op1(insn);
            match &insn.callee {
                Some(name) => format!("call {kind} {target} # {name}"),
                None => format!("call {kind} {target}"),
            }
        }
        Opcode::Ret => "ret".to_string(),
    }
}
