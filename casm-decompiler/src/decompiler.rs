use std::fmt::Write;

use casm_ir::felt;
use casm_ir::function::Function;
use casm_ir::instruction::{ApUpdate, Instruction, Op1Source, Opcode, PcUpdate, ResLogic};
use num_traits::ToPrimitive;
use owo_colors::OwoColorize;

use crate::error::{Error, Result};
use crate::format;

const TAB: &str = "    ";

/// Color role of an output line. Purely cosmetic: with color disabled the
/// structural output is byte-identical.
#[derive(Debug, Clone, Copy)]
enum Tint {
    Plain,
    Keyword,
    Assign,
    Comment,
    Prototype,
    ApTick,
    Label,
}

/// Per-function reducer state for structured control-flow recovery.
#[derive(Debug, Default)]
struct FunctionState {
    indent: usize,
    /// Instruction id at which the single pending `if` block closes.
    end_if: Option<u64>,
    /// Instruction ids at which pending `else` blocks close. Append-only;
    /// ids are unique within a function, and several entries matching one id
    /// close that many nested blocks.
    end_else: Vec<u64>,
    /// Open `if` scopes still awaiting their `else` branch.
    open_ifs: usize,
    /// Declared return values of the active function.
    return_values: Option<Vec<String>>,
}

/// Reconstructs pseudo-code for a whole program's functions.
///
/// One instance per run; the control-flow state resets at every function
/// boundary while the output accumulates across all of them.
pub struct Decompiler<'a> {
    functions: &'a [Function],
    color: bool,
    state: FunctionState,
    out: String,
}

impl<'a> Decompiler<'a> {
    pub fn new(functions: &'a [Function]) -> Self {
        Decompiler {
            functions,
            color: false,
            state: FunctionState::default(),
            out: String::new(),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Decompile every non-import function, in program order.
    pub fn decompile(mut self) -> Result<String> {
        let functions = self.functions;
        for function in functions {
            if function.is_import {
                continue;
            }

            self.state = FunctionState {
                return_values: function.ret.clone(),
                ..FunctionState::default()
            };

            self.out.push('\n');
            self.push_line(&function.get_prototype(), Tint::Prototype);
            self.state.indent = 1;

            let cfg = function.generate_cfg();
            let total = function.instructions.len();
            let mut count = 0usize;
            for block in &cfg.basic_blocks {
                for insn in block.instructions(&function.instructions) {
                    self.close_pending(insn.id);
                    count += 1;
                    self.render_instruction(insn, function, count == total)?;
                }
            }
        }
        Ok(self.out)
    }

    /// Emit any `end` lines scheduled for this instruction id: first the
    /// single pending if-close, then every matching else-close entry.
    fn close_pending(&mut self, id: u64) {
        if self.state.end_if == Some(id) {
            self.state.end_if = None;
            self.dedent();
            self.push_line("end", Tint::Keyword);
        }
        let closes = self.state.end_else.iter().filter(|&&e| e == id).count();
        for _ in 0..closes {
            self.dedent();
            self.push_line("end", Tint::Keyword);
        }
    }

    fn render_instruction(
        &mut self,
        insn: &Instruction,
        function: &Function,
        last: bool,
    ) -> Result<()> {
        if let Some(label) = function.labels.get(&insn.id) {
            self.out.push('\n');
            self.push_line(&format!("LABEL : {label}"), Tint::Label);
        }
        if insn.hint.is_some() {
            self.render_hint(insn);
        }

        match insn.opcode {
            Opcode::AssertEq => self.handle_assert_eq(insn),
            Opcode::Nop => self.handle_nop(insn, function),
            Opcode::Call => self.handle_call(insn, function),
            Opcode::Ret => {
                self.handle_ret(last);
                Ok(())
            }
        }
    }

    /// Value assignments and field arithmetic (`ASSERT_EQ`).
    fn handle_assert_eq(&mut self, insn: &Instruction) -> Result<()> {
        let dst = format::dst(insn);
        let stmt = match insn.res {
            ResLogic::Op1 => {
                if insn.op1_source == Op1Source::Imm {
                    let (signed, raw) = self.imm_text(insn)?;
                    if let Some(raw) = raw {
                        self.push_line(&format!("# {raw} -> {signed}"), Tint::Comment);
                    }
                    format!("{dst} = {signed}")
                } else {
                    format!("{dst} = {}", format::op1(insn))
                }
            }
            ResLogic::Add | ResLogic::Mul => {
                let op = if insn.res == ResLogic::Add { "+" } else { "*" };
                let right = if insn.op1_source == Op1Source::Imm {
                    self.imm_text(insn)?.0
                } else {
                    format::op1(insn)
                };
                format!("{dst} = {} {op} {right}", format::op0(insn))
            }
        };

        if insn.ap_update == ApUpdate::Regular {
            self.push_line(&stmt, Tint::Assign);
        } else {
            let ticks = match insn.ap_update {
                ApUpdate::Add1 => 1,
                ApUpdate::Add2 => 2,
                ApUpdate::Add => self.imm_count(insn)?,
                ApUpdate::Regular => 0,
            };
            self.push_line(&format!("{stmt};"), Tint::Assign);
            for _ in 0..ticks {
                self.push_line("ap ++", Tint::ApTick);
            }
        }
        Ok(())
    }

    /// Jump family (`NOP` with a pc update): conditional jumps open `if`
    /// scopes, unconditional relative jumps either introduce `else:` or stay
    /// bare jumps.
    fn handle_nop(&mut self, insn: &Instruction, function: &Function) -> Result<()> {
        match insn.pc_update {
            PcUpdate::Jnz => {
                self.push_line(
                    &format!("if [AP{}] == 0:", format::offset(insn.off_dst)),
                    Tint::Keyword,
                );
                self.indent();

                let target = insn
                    .relative_target()
                    .ok_or(Error::MissingJumpOffset { id: insn.id })?;
                // A JUMP_REL just before the target is the branch skipping an
                // else body; anything else there means this if has no else.
                let closes_plain = function.instructions.iter().any(|other| {
                    (other.id + 2 == target || other.id + 1 == target)
                        && other.pc_update != PcUpdate::JumpRel
                });
                if closes_plain {
                    self.state.end_if = Some(target);
                } else {
                    self.state.open_ifs += 1;
                }
            }
            PcUpdate::JumpRel => {
                if self.state.open_ifs > 0 {
                    let target = insn
                        .relative_target()
                        .ok_or(Error::MissingJumpOffset { id: insn.id })?;
                    self.dedent();
                    self.push_line("else:", Tint::Keyword);
                    self.indent();
                    self.state.end_else.push(target);
                    self.state.open_ifs -= 1;
                } else {
                    let target = match &insn.imm {
                        Some(imm) => imm.to_string(),
                        None => format::op1(insn),
                    };
                    self.push_line(&format!("jmp rel {target}"), Tint::Plain);
                }
            }
            PcUpdate::JumpAbs | PcUpdate::Regular => {}
        }
        Ok(())
    }

    /// `CALL`: direct calls resolve to callee signatures, label calls and
    /// indirect calls stay explicit.
    fn handle_call(&mut self, insn: &Instruction, function: &Function) -> Result<()> {
        let call_kind = if insn.is_call_abs() {
            "call abs"
        } else {
            "call rel"
        };

        if insn.is_call_direct() {
            if let Some(callee) = &insn.callee {
                let slots = match self.functions.iter().find(|f| &f.name == callee) {
                    Some(f) => f.arg_slot_count(),
                    None => {
                        log::warn!("no signature for callee {callee}; rendering zero arguments");
                        0
                    }
                };
                let args: Vec<String> = (1..=slots).rev().map(|k| format!("[ap-{k}]")).collect();
                let short = callee.rsplit('.').next().unwrap_or(callee);
                self.push_line(&format!("{short}({})", args.join(", ")), Tint::Keyword);
            } else {
                let offset = insn
                    .signed_imm()
                    .ok_or(Error::MissingImmediate { id: insn.id })?;
                let mut line = format!("{call_kind} ({offset})");
                if let Some(label) = offset.to_u64().and_then(|id| function.labels.get(&id)) {
                    let _ = write!(line, " # {label}");
                }
                self.push_line(&line, Tint::Keyword);
            }
        } else if insn.is_call_indirect() {
            self.push_line(&format!("{call_kind} {}", format::op1(insn)), Tint::Plain);
        } else {
            return Err(Error::UnsupportedCallShape { id: insn.id });
        }
        Ok(())
    }

    /// `RET`: bare or with the declared return slots; the positionally last
    /// instruction also closes the function body.
    fn handle_ret(&mut self, last: bool) {
        match self.state.return_values.as_ref().map(Vec::len) {
            None => {
                self.push_line("ret", Tint::Keyword);
                if last {
                    self.dedent();
                }
            }
            Some(n) => {
                let slots: Vec<String> = (1..=n).rev().map(|k| format!("[ap-{k}]")).collect();
                self.push_line(&format!("return({})", slots.join(", ")), Tint::Keyword);
            }
        }
        if last {
            self.state.indent = 0;
            self.push_line("end", Tint::Keyword);
        }
    }

    /// Hints render as fenced blocks one level deeper; they never touch
    /// control-flow state.
    fn render_hint(&mut self, insn: &Instruction) {
        let Some(hint) = &insn.hint else {
            return;
        };
        self.push_line("%{", Tint::Plain);
        self.indent();
        for line in hint.lines() {
            self.push_line(line, Tint::Plain);
        }
        self.dedent();
        self.push_line("%}", Tint::Plain);
    }

    /// Signed rendering of the immediate plus its raw form when they differ.
    fn imm_text(&self, insn: &Instruction) -> Result<(String, Option<String>)> {
        let imm = insn
            .imm
            .as_ref()
            .ok_or(Error::MissingImmediate { id: insn.id })?;
        Ok(felt::signed_with_raw(imm, &insn.prime))
    }

    /// Ap increment count taken from the signed immediate.
    fn imm_count(&self, insn: &Instruction) -> Result<usize> {
        let value = insn
            .signed_imm()
            .ok_or(Error::MissingImmediate { id: insn.id })?;
        Ok(value.to_usize().unwrap_or_else(|| {
            log::warn!("ap increment at instruction {} is not a small count", insn.id);
            0
        }))
    }

    fn indent(&mut self) {
        self.state.indent += 1;
    }

    fn dedent(&mut self) {
        self.state.indent = self.state.indent.saturating_sub(1);
    }

    fn push_line(&mut self, text: &str, tint: Tint) {
        let pad = TAB.repeat(self.state.indent);
        let rendered = self.paint(text, tint);
        let _ = writeln!(self.out, "{pad}{rendered}");
    }

    fn paint(&self, text: &str, tint: Tint) -> String {
        if !self.color {
            return text.to_string();
        }
        match tint {
            Tint::Plain => text.to_string(),
            Tint::Keyword => text.red().to_string(),
            Tint::Assign => text.green().to_string(),
            Tint::Comment => text.cyan().to_string(),
            Tint::Prototype => text.blue().to_string(),
            Tint::ApTick => text.yellow().to_string(),
            Tint::Label => text.green().to_string(),
        }
    }
}
