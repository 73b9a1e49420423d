use casm_ir::instruction::{Instruction, Op1Source, Register};

/// Render a signed cell offset: empty for zero, explicit sign otherwise.
pub fn offset(off: i32) -> String {
    match off {
        0 => String::new(),
        o if o > 0 => format!("+{o}"),
        o => o.to_string(),
    }
}

/// `[<register><off_dst>]` destination cell.
pub fn dst(insn: &Instruction) -> String {
    format!("[{}{}]", insn.dst_register, offset(insn.off_dst))
}

/// `[<register><off_op0>]` operand-0 cell.
pub fn op0(insn: &Instruction) -> String {
    format!("[{}{}]", insn.op0_register, offset(insn.off_op0))
}

/// The operand-1 value: a direct register-relative cell, a double
/// dereference through operand 0, or the signed immediate.
pub fn op1(insn: &Instruction) -> String {
    match insn.op1_source {
        Op1Source::Fp => format!("[{}{}]", Register::Fp, offset(insn.off_op1)),
        Op1Source::Ap => format!("[{}{}]", Register::Ap, offset(insn.off_op1)),
        Op1Source::Op0 => format!(
            "[[{}{}]{}]",
            insn.op0_register,
            offset(insn.off_op0),
            offset(insn.off_op1)
        ),
        Op1Source::Imm => insn.signed_imm().map_or(String::new(), |v| v.to_string()),
    }
}
