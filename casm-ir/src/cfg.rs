use std::collections::{BTreeMap, BTreeSet};

use num_traits::ToPrimitive;

use crate::instruction::{Instruction, Opcode, PcUpdate};

/// Index of a basic block within the CFG.
pub type BlockId = usize;

/// A basic block: a maximal straight-line run of instructions with no
/// internal jump targets.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    /// Unique block index.
    pub id: BlockId,
    /// Id of the first instruction.
    pub start: u64,
    /// Id past the last instruction (exclusive).
    pub end: u64,
    /// Index range into the function's instruction list [first_insn..last_insn).
    pub first_insn: usize,
    pub last_insn: usize,
    /// Successor block IDs.
    pub succs: Vec<BlockId>,
    /// Predecessor block IDs.
    pub preds: Vec<BlockId>,
}

impl BasicBlock {
    /// The block's slice of the function's instruction list.
    pub fn instructions<'a>(&self, all: &'a [Instruction]) -> &'a [Instruction] {
        &all[self.first_insn..self.last_insn]
    }
}

/// Control flow graph for a single function, blocks ordered by start id.
#[derive(Debug)]
pub struct Cfg {
    pub basic_blocks: Vec<BasicBlock>,
    /// Entry block ID (always 0 when non-empty).
    pub entry: BlockId,
}

/// Static target of a jump-family instruction, when one is encoded.
fn jump_target(insn: &Instruction) -> Option<u64> {
    if insn.opcode != Opcode::Nop {
        return None;
    }
    match insn.pc_update {
        PcUpdate::JumpRel | PcUpdate::Jnz => insn.relative_target(),
        PcUpdate::JumpAbs => insn.signed_imm().and_then(|v| v.to_u64()),
        PcUpdate::Regular => None,
    }
}

impl Cfg {
    /// Build a CFG from a function's decoded instructions.
    pub fn build(instructions: &[Instruction]) -> Self {
        if instructions.is_empty() {
            return Cfg {
                basic_blocks: vec![],
                entry: 0,
            };
        }

        // Step 1: identify leaders (block start ids). Calls transfer control
        // but return, so they do not end a block.
        let mut leaders = BTreeSet::new();
        leaders.insert(instructions[0].id);

        for (i, insn) in instructions.iter().enumerate() {
            let is_jump = insn.opcode == Opcode::Nop && insn.pc_update != PcUpdate::Regular;

            if is_jump {
                if let Some(target) = jump_target(insn) {
                    leaders.insert(target);
                }
                if i + 1 < instructions.len() {
                    leaders.insert(instructions[i + 1].id);
                }
            }

            if insn.opcode == Opcode::Ret && i + 1 < instructions.len() {
                leaders.insert(instructions[i + 1].id);
            }
        }

        // Step 2: split the instruction list at leaders.
        let mut blocks: Vec<BasicBlock> = Vec::new();
        let mut id_to_block: BTreeMap<u64, BlockId> = BTreeMap::new();

        for (i, insn) in instructions.iter().enumerate() {
            if blocks.is_empty() || leaders.contains(&insn.id) {
                let block_id = blocks.len();
                id_to_block.insert(insn.id, block_id);
                blocks.push(BasicBlock {
                    id: block_id,
                    start: insn.id,
                    end: insn.id + insn.size as u64,
                    first_insn: i,
                    last_insn: i + 1,
                    succs: vec![],
                    preds: vec![],
                });
            } else {
                let block = blocks.last_mut().expect("non-empty after first push");
                block.end = insn.id + insn.size as u64;
                block.last_insn = i + 1;
            }
        }

        // Step 3: add edges from each block's terminating instruction.
        for bi in 0..blocks.len() {
            let last = &instructions[blocks[bi].last_insn - 1];
            let fallthrough = if bi + 1 < blocks.len() {
                Some(bi + 1)
            } else {
                None
            };

            let mut succs = Vec::new();
            match (last.opcode, last.pc_update) {
                (Opcode::Ret, _) => {}
                (Opcode::Nop, PcUpdate::JumpRel) | (Opcode::Nop, PcUpdate::JumpAbs) => {
                    if let Some(target) = jump_target(last) {
                        if let Some(&b) = id_to_block.get(&target) {
                            succs.push(b);
                        }
                    }
                }
                (Opcode::Nop, PcUpdate::Jnz) => {
                    if let Some(ft) = fallthrough {
                        succs.push(ft);
                    }
                    if let Some(target) = jump_target(last) {
                        if let Some(&b) = id_to_block.get(&target) {
                            if !succs.contains(&b) {
                                succs.push(b);
                            }
                        }
                    }
                }
                _ => {
                    if let Some(ft) = fallthrough {
                        succs.push(ft);
                    }
                }
            }
            blocks[bi].succs = succs;
        }

        // Build predecessor lists.
        for bi in 0..blocks.len() {
            let succs = blocks[bi].succs.clone();
            for s in succs {
                if !blocks[s].preds.contains(&bi) {
                    blocks[s].preds.push(bi);
                }
            }
        }

        Cfg {
            basic_blocks: blocks,
            entry: 0,
        }
    }
}
