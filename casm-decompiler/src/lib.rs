pub mod decode;
pub mod decompiler;
pub mod disasm;
pub mod error;
pub mod format;
pub mod program;

pub use decompiler::Decompiler;
pub use error::{Error, Result};
pub use program::build_functions;

use casm_contract::ProgramJson;

/// Decompile a parsed contract program into pseudo-code.
pub fn decompile_program(program: &ProgramJson, color: bool) -> Result<String> {
    let functions = program::build_functions(program)?;
    Decompiler::new(&functions).with_color(color).decompile()
}
