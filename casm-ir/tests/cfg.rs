use casm_ir::cfg::Cfg;
use casm_ir::instruction::{
    ApUpdate, Instruction, Op1Source, Opcode, PcUpdate, Register, ResLogic,
};
use num_bigint::BigUint;

fn prime() -> BigUint {
    "3618502788666131213697322783095070105623107215331596699973092056135872020481"
        .parse()
        .unwrap()
}

fn felt_of(v: i64) -> BigUint {
    if v >= 0 {
        BigUint::from(v as u64)
    } else {
        prime() - BigUint::from(v.unsigned_abs())
    }
}

fn inst(id: u64, opcode: Opcode) -> Instruction {
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

fn assert_eq_insn(id: u64) -> Instruction {
    inst(id, Opcode::AssertEq)
}

fn jnz(id: u64, offset: i64) -> Instruction {
    let mut i = inst(id, Opcode::Nop);
    i.pc_update = PcUpdate::Jnz;
    i.op1_source = Op1Source::Imm;
    i.imm = Some(felt_of(offset));
    i.size = 2;
    i
}

fn jmp_rel(id: u64, offset: i64) -> Instruction {
    let mut i = jnz(id, offset);
    i.pc_update = PcUpdate::JumpRel;
    i
}

fn ret(id: u64) -> Instruction {
    inst(id, Opcode::Ret)
}

#[test]
fn straight_line_is_one_block() {
    let insns = vec![assert_eq_insn(0), assert_eq_insn(1), ret(2)];
    let cfg = Cfg::build(&insns);
    assert_eq!(cfg.basic_blocks.len(), 1);
    let block = &cfg.basic_blocks[0];
    assert_eq!((block.first_insn, block.last_insn), (0, 3));
    assert!(block.succs.is_empty(), "ret ends the function");
}

#[test]
fn conditional_jump_splits_blocks_and_edges() {
    // 0: jnz -> 4, 2..3: body, 4: ret
    let insns = vec![jnz(0, 4), assert_eq_insn(2), assert_eq_insn(3), ret(4)];
    let cfg = Cfg::build(&insns);
    assert_eq!(cfg.basic_blocks.len(), 3);
    assert_eq!(
        cfg.basic_blocks[0].succs,
        vec![1, 2],
        "fall-through first, then jump target"
    );
    assert_eq!(cfg.basic_blocks[1].succs, vec![2]);
    assert!(cfg.basic_blocks[2].succs.is_empty());
    assert_eq!(cfg.basic_blocks[2].preds, vec![0, 1]);
}

#[test]
fn unconditional_jump_has_only_its_target() {
    // 0: jmp rel -> 3, 2: skipped, 3: ret
    let insns = vec![jmp_rel(0, 3), assert_eq_insn(2), ret(3)];
    let cfg = Cfg::build(&insns);
    assert_eq!(cfg.basic_blocks.len(), 3);
    assert_eq!(
        cfg.basic_blocks[0].succs,
        vec![2],
        "no fall-through edge out of an unconditional jump"
    );
}

#[test]
fn calls_do_not_end_blocks() {
    let mut call = inst(0, Opcode::Call);
    call.pc_update = PcUpdate::JumpRel;
    call.op1_source = Op1Source::Imm;
    call.imm = Some(felt_of(10));
    call.ap_update = ApUpdate::Add2;
    call.size = 2;
    let insns = vec![call, ret(2)];
    let cfg = Cfg::build(&insns);
    assert_eq!(cfg.basic_blocks.len(), 1, "a call transfers and returns");
}

#[test]
fn jump_targets_outside_the_function_are_ignored() {
    // 0: jnz -> 20 (beyond the body), 2: body, 3: ret
    let insns = vec![jnz(0, 20), assert_eq_insn(2), ret(3)];
    let cfg = Cfg::build(&insns);
    assert_eq!(cfg.basic_blocks.len(), 2);
    assert_eq!(
        cfg.basic_blocks[0].succs,
        vec![1],
        "only the fall-through edge survives"
    );
    let starts: Vec<u64> = cfg.basic_blocks.iter().map(|b| b.start).collect();
    assert_eq!(starts, vec![0, 2], "blocks ordered by start id");
}
