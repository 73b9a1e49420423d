use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use casm_contract::ProgramJson;
use casm_decompiler::Decompiler;

#[derive(Parser)]
#[command(name = "casm", about = "StarkNet Cairo-VM bytecode decompiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decompile a compiled contract to pseudo-code
    Decompile {
        /// Path to the compiled contract JSON
        input: PathBuf,
        /// Also write a plain-text copy to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Disable terminal colors
        #[arg(long)]
        no_color: bool,
    },
    /// Disassemble a compiled contract to an instruction listing
    Disasm {
        /// Path to the compiled contract JSON
        input: PathBuf,
    },
    /// Show program metadata and the function table
    Info {
        /// Path to the compiled contract JSON
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Decompile {
            input,
            output,
            no_color,
        } => cmd_decompile(&input, output.as_deref(), !no_color),
        Commands::Disasm { input } => cmd_disasm(&input),
        Commands::Info { input } => cmd_info(&input),
    }
}

fn load_program(path: &Path) -> ProgramJson {
    match ProgramJson::open(path) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn build_functions(program: &ProgramJson) -> Vec<casm_ir::function::Function> {
    match casm_decompiler::build_functions(program) {
        Ok(functions) => functions,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_decompile(path: &Path, output: Option<&Path>, color: bool) {
    let program = load_program(path);
    let functions = build_functions(&program);

    match Decompiler::new(&functions).with_color(color).decompile() {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    // File copies are always plain text.
    if let Some(out_path) = output {
        match Decompiler::new(&functions).with_color(false).decompile() {
            Ok(text) => {
                if let Err(e) = fs::write(out_path, text) {
                    eprintln!("Error writing {}: {e}", out_path.display());
                    std::process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn cmd_disasm(path: &Path) {
    let program = load_program(path);
    let functions = build_functions(&program);
    print!("{}", casm_decompiler::disasm::disassemble(&functions));
}

fn cmd_info(path: &Path) {
    let program = load_program(path);
    let functions = build_functions(&program);

    println!("=== Program Info ===");
    println!("Prime:       {}", program.prime);
    println!("Words:       {}", program.data.len());
    if !program.builtins.is_empty() {
        println!("Builtins:    {}", program.builtins.join(", "));
    }
    println!("Functions:   {}", functions.len());
    println!();
    for function in &functions {
        let marker = if function.is_import { "  (import)" } else { "" };
        println!("{:>6}  {}{marker}", function.entry_pc, function.name);
    }
}
