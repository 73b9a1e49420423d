use bitflags::bitflags;
use casm_ir::instruction::{ApUpdate, Instruction, Op1Source, Opcode, PcUpdate, Register, ResLogic};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::error::{Error, Result};

bitflags! {
    /// The 15 one-hot flag bits of a machine word (bits 48..63).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u16 {
        const DST_REG_FP       = 1 << 0;
        const OP0_REG_FP       = 1 << 1;
        const OP1_IMM          = 1 << 2;
        const OP1_FP           = 1 << 3;
        const OP1_AP           = 1 << 4;
        const RES_ADD          = 1 << 5;
        const RES_MUL          = 1 << 6;
        const PC_JUMP_ABS      = 1 << 7;
        const PC_JUMP_REL      = 1 << 8;
        const PC_JNZ           = 1 << 9;
        const AP_ADD           = 1 << 10;
        const AP_ADD1          = 1 << 11;
        const OPCODE_CALL      = 1 << 12;
        const OPCODE_RET       = 1 << 13;
        const OPCODE_ASSERT_EQ = 1 << 14;
    }
}

/// Offsets are stored biased so the 16-bit field covers [-2^15, 2^15).
const OFFSET_BIAS: i64 = 1 << 15;

fn unbias(raw: u64) -> i32 {
    (raw as i64 - OFFSET_BIAS) as i32
}

/// Decode a program's machine words into typed instructions.
///
/// Instruction ids are assigned from the running pc offset; an `OP1_IMM`
/// instruction consumes the following word as its immediate.
pub fn decode_program(words: &[BigUint], prime: &BigUint) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    let mut pc = 0u64;

    while (pc as usize) < words.len() {
        let insn = decode_word(words, pc, prime)?;
        pc += insn.size as u64;
        instructions.push(insn);
    }

    Ok(instructions)
}

fn decode_word(words: &[BigUint], pc: u64, prime: &BigUint) -> Result<Instruction> {
    let word = words[pc as usize]
        .to_u64()
        .filter(|w| w >> 63 == 0)
        .ok_or(Error::OversizedWord { pc })?;

    let off_dst = unbias(word & 0xffff);
    let off_op0 = unbias((word >> 16) & 0xffff);
    let off_op1 = unbias((word >> 32) & 0xffff);
    let flags = Flags::from_bits_truncate((word >> 48) as u16);

    let dst_register = if flags.contains(Flags::DST_REG_FP) {
        Register::Fp
    } else {
        Register::Ap
    };
    let op0_register = if flags.contains(Flags::OP0_REG_FP) {
        Register::Fp
    } else {
        Register::Ap
    };

    let op1_source = match (
        flags.contains(Flags::OP1_IMM),
        flags.contains(Flags::OP1_FP),
        flags.contains(Flags::OP1_AP),
    ) {
        (false, false, false) => Op1Source::Op0,
        (true, false, false) => Op1Source::Imm,
        (false, true, false) => Op1Source::Fp,
        (false, false, true) => Op1Source::Ap,
        _ => {
            return Err(Error::InvalidFlags {
                group: "op1 source",
                pc,
            });
        }
    };

    let res = match (flags.contains(Flags::RES_ADD), flags.contains(Flags::RES_MUL)) {
        (false, false) => ResLogic::Op1,
        (true, false) => ResLogic::Add,
        (false, true) => ResLogic::Mul,
        (true, true) => {
            return Err(Error::InvalidFlags {
                group: "res logic",
                pc,
            });
        }
    };

    let pc_update = match (
        flags.contains(Flags::PC_JUMP_ABS),
        flags.contains(Flags::PC_JUMP_REL),
        flags.contains(Flags::PC_JNZ),
    ) {
        (false, false, false) => PcUpdate::Regular,
        (true, false, false) => PcUpdate::JumpAbs,
        (false, true, false) => PcUpdate::JumpRel,
        (false, false, true) => PcUpdate::Jnz,
        _ => {
            return Err(Error::InvalidFlags {
                group: "pc update",
                pc,
            });
        }
    };

    let opcode = match (
        flags.contains(Flags::OPCODE_CALL),
        flags.contains(Flags::OPCODE_RET),
        flags.contains(Flags::OPCODE_ASSERT_EQ),
    ) {
        (false, false, false) => Opcode::Nop,
        (true, false, false) => Opcode::Call,
        (false, true, false) => Opcode::Ret,
        (false, false, true) => Opcode::AssertEq,
        _ => {
            return Err(Error::InvalidFlags {
                group: "opcode",
                pc,
            });
        }
    };

    let ap_update = match (flags.contains(Flags::AP_ADD), flags.contains(Flags::AP_ADD1)) {
        // A call stores the return frame in two cells.
        (false, false) if opcode == Opcode::Call => ApUpdate::Add2,
        (false, false) => ApUpdate::Regular,
        (true, false) => ApUpdate::Add,
        (false, true) => ApUpdate::Add1,
        (true, true) => {
            return Err(Error::InvalidFlags {
                group: "ap update",
                pc,
            });
        }
    };

    let size = if op1_source == Op1Source::Imm { 2 } else { 1 };
    let imm = if op1_source == Op1Source::Imm {
        let word = words
            .get(pc as usize + 1)
            .ok_or(Error::TruncatedImmediate { pc })?;
        Some(word.clone())
    } else {
        None
    };

    Ok(Instruction {
        id: pc,
        off_dst,
        off_op0,
        off_op1,
        dst_register,
        op0_register,
        op1_source,
        res,
        pc_update,
        ap_update,
        opcode,
        imm,
        hint: None,
        callee: None,
        size,
        prime: prime.clone(),
    })
}
