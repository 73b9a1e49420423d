use std::collections::BTreeMap;

use crate::cfg::Cfg;
use crate::instruction::Instruction;

/// A disassembled function with its declared signature and instruction body.
#[derive(Debug, Clone)]
pub struct Function {
    /// Fully qualified dotted name (e.g. `__main__.transfer`).
    pub name: String,
    /// Declared argument names, in order. `None` when undeclared.
    pub args: Option<Vec<String>>,
    /// Implicit argument names (builtin pointers threaded through the call).
    pub implicit_args: Option<Vec<String>>,
    /// Declared return value names.
    pub ret: Option<Vec<String>>,
    /// Declaration pulled in from an imported module; carries no code to
    /// decompile but still resolves call signatures.
    pub is_import: bool,
    pub entry_pc: u64,
    pub decorators: Vec<String>,
    pub instructions: Vec<Instruction>,
    /// Label names keyed by the instruction id they precede.
    pub labels: BTreeMap<u64, String>,
}

impl Function {
    /// Last dotted segment of the qualified name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Stack slots a call to this function consumes: declared plus implicit
    /// arguments.
    pub fn arg_slot_count(&self) -> usize {
        self.args.as_ref().map_or(0, Vec::len) + self.implicit_args.as_ref().map_or(0, Vec::len)
    }

    /// Cairo-style prototype header, decorators included.
    pub fn get_prototype(&self) -> String {
        let mut proto = String::new();
        for decorator in &self.decorators {
            proto.push('@');
            proto.push_str(decorator);
            proto.push(' ');
        }
        proto.push_str("func ");
        proto.push_str(&self.name);
        if let Some(implicits) = &self.implicit_args {
            if !implicits.is_empty() {
                proto.push('{');
                proto.push_str(&implicits.join(", "));
                proto.push('}');
            }
        }
        proto.push('(');
        if let Some(args) = &self.args {
            proto.push_str(&args.join(", "));
        }
        proto.push(')');
        if let Some(ret) = &self.ret {
            if !ret.is_empty() {
                proto.push_str(" -> (");
                proto.push_str(&ret.join(", "));
                proto.push(')');
            }
        }
        proto.push(':');
        proto
    }

    /// Build the control flow graph over this function's instructions.
    pub fn generate_cfg(&self) -> Cfg {
        Cfg::build(&self.instructions)
    }
}
