#![allow(dead_code)]

use std::collections::BTreeMap;

use casm_ir::function::Function;
use casm_ir::instruction::{
    ApUpdate, Instruction, Op1Source, Opcode, PcUpdate, Register, ResLogic,
};
use num_bigint::BigUint;

pub fn prime() -> BigUint {
    "3618502788666131213697322783095070105623107215331596699973092056135872020481"
        .parse()
        .unwrap()
}

/// A field element from a signed integer (negative values wrap mod prime).
pub fn felt_of(v: i64) -> BigUint {
    if v >= 0 {
        BigUint::from(v as u64)
    } else {
        prime() - BigUint::from(v.unsigned_abs())
    }
}

pub fn inst(id: u64, opcode: Opcode) -> Instruction {
    Instruction {
        id,
        off_dst: 0,
        off_op0: -1,
        off_op1: 1,
        dst_register: Register::Ap,
        op0_register: Register::Fp,
        op1_source: Op1Source::Op0,
        res: ResLogic::Op1,
        pc_update: PcUpdate::Regular,
        ap_update: ApUpdate::Regular,
        opcode,
        imm: None,
        hint: None,
        callee: None,
        size: 1,
        prime: prime(),
    }
}

/// `[AP] = [[FP-1]+1]`, a one-word filler assignment.
pub fn assert_op0(id: u64) -> Instruction {
    inst(id, Opcode::AssertEq)
}

/// `[AP] = <value>`, an immediate assignment (two words).
pub fn assert_imm(id: u64, value: i64) -> Instruction {
    let mut i = inst(id, Opcode::AssertEq);
    i.op1_source = Op1Source::Imm;
    i.imm = Some(felt_of(value));
    i.size = 2;
    i
}

/// Conditional relative jump by `offset`.
pub fn jnz(id: u64, offset: i64) -> Instruction {
    let mut i = inst(id, Opcode::Nop);
    i.pc_update = PcUpdate::Jnz;
    i.op1_source = Op1Source::Imm;
    i.imm = Some(felt_of(offset));
    i.size = 2;
    i
}

/// Unconditional relative jump by `offset`.
pub fn jmp_rel(id: u64, offset: i64) -> Instruction {
    let mut i = jnz(id, offset);
    i.pc_update = PcUpdate::JumpRel;
    i
}

/// Direct relative call by `offset`.
pub fn call_rel(id: u64, offset: i64) -> Instruction {
    let mut i = inst(id, Opcode::Call);
    i.pc_update = PcUpdate::JumpRel;
    i.op1_source = Op1Source::Imm;
    i.imm = Some(felt_of(offset));
    i.ap_update = ApUpdate::Add2;
    i.size = 2;
    i
}

pub fn ret(id: u64) -> Instruction {
    inst(id, Opcode::Ret)
}

pub fn func(name: &str, instructions: Vec<Instruction>) -> Function {
    Function {
        name: name.to_string(),
        args: None,
        implicit_args: None,
        ret: None,
        is_import: false,
        entry_pc: instructions.first().map_or(0, |i| i.id),
        decorators: vec![],
        instructions,
        labels: BTreeMap::new(),
    }
}
