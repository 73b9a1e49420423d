use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

use crate::felt;

/// Addressing register for destination and operand-0 cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Ap,
    Fp,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Ap => write!(f, "AP"),
            Register::Fp => write!(f, "FP"),
        }
    }
}

/// Where the operand-1 value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op1Source {
    /// Dereference relative to the operand-0 value (double dereference).
    Op0,
    /// Immediate field element in the following word.
    Imm,
    /// FP-relative cell.
    Fp,
    /// AP-relative cell.
    Ap,
}

/// How the result cell is computed from the operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResLogic {
    /// Plain operand-1 value.
    Op1,
    Add,
    Mul,
}

/// Program-counter transition encoded by the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcUpdate {
    Regular,
    JumpAbs,
    JumpRel,
    /// Conditional relative jump, taken when the destination cell is nonzero.
    Jnz,
}

/// Allocation-pointer transition encoded by the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApUpdate {
    Regular,
    /// `ap += imm` (increment taken from the immediate).
    Add,
    Add1,
    /// Implied by `CALL` (return cell pair).
    Add2,
}

/// The closed opcode set of the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop,
    AssertEq,
    Call,
    Ret,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Nop => write!(f, "NOP"),
            Opcode::AssertEq => write!(f, "ASSERT_EQ"),
            Opcode::Call => write!(f, "CALL"),
            Opcode::Ret => write!(f, "RET"),
        }
    }
}

/// A decoded machine instruction.
///
/// `id` is the instruction's position in the program-counter space; ids are
/// unique and increasing within a function, and jump targets are expressed
/// as `id + relative offset`.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub id: u64,
    pub off_dst: i32,
    pub off_op0: i32,
    pub off_op1: i32,
    pub dst_register: Register,
    pub op0_register: Register,
    pub op1_source: Op1Source,
    pub res: ResLogic,
    pub pc_update: PcUpdate,
    pub ap_update: ApUpdate,
    pub opcode: Opcode,
    /// Immediate field element, present when `op1_source` is `Imm`.
    pub imm: Option<BigUint>,
    /// Multi-line hint snippet attached ahead of this instruction.
    pub hint: Option<String>,
    /// Resolved callee name for direct calls to a known function entry.
    pub callee: Option<String>,
    /// Size in machine words (2 when an immediate follows).
    pub size: u8,
    /// Field modulus the immediate lives in.
    pub prime: BigUint,
}

impl Instruction {
    /// Call target encoded as an absolute address.
    pub fn is_call_abs(&self) -> bool {
        self.pc_update == PcUpdate::JumpAbs
    }

    /// Call target encoded as an immediate offset.
    pub fn is_call_direct(&self) -> bool {
        self.op1_source == Op1Source::Imm
    }

    /// Call target computed through a register-relative cell.
    pub fn is_call_indirect(&self) -> bool {
        matches!(self.op1_source, Op1Source::Ap | Op1Source::Fp)
    }

    /// The register operand-1 is read through, for register-relative sources.
    pub fn op1_register(&self) -> Option<Register> {
        match self.op1_source {
            Op1Source::Ap => Some(Register::Ap),
            Op1Source::Fp => Some(Register::Fp),
            Op1Source::Op0 | Op1Source::Imm => None,
        }
    }

    /// Signed reading of the immediate, if present.
    pub fn signed_imm(&self) -> Option<BigInt> {
        self.imm.as_ref().map(|v| felt::signed_repr(v, &self.prime))
    }

    /// Absolute target of a relative jump or call: `id + signed(imm)`.
    /// `None` when there is no immediate or the target falls before pc 0.
    pub fn relative_target(&self) -> Option<u64> {
        let target = BigInt::from(self.id) + self.signed_imm()?;
        target.to_u64()
    }
}
