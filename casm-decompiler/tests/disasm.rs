mod common;

use casm_decompiler::disasm::disassemble;
use common::*;

#[test]
fn listing_shows_ids_mnemonics_and_operands() {
    let f = func("__main__.main", vec![assert_imm(0, 5), jnz(2, 4), ret(4)]);
    let out = disassemble(&[f]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "",
            "func __main__.main():",
            "     0:  ASSERT_EQ  [AP] = 5",
            "     2:  NOP        jmp rel 4 if [AP] != 0",
            "     4:  RET        ret",
        ]
    );
}

#[test]
fn listing_skips_imports_and_marks_labels() {
    let mut f = func("__main__.main", vec![assert_imm(0, 5), ret(2)]);
    f.labels.insert(2, "done".into());
    let mut import = func("starkware.cairo.common.math.assert_nn", vec![ret(0)]);
    import.is_import = true;

    let out = disassemble(&[import, f]);
    assert!(!out.contains("assert_nn"), "imports are not listed");
    assert!(out.contains("done:\n     2:  RET        ret\n"), "got:\n{out}");
}

#[test]
fn resolved_call_targets_are_annotated() {
    let mut call = call_rel(0, 10);
    call.callee = Some("__main__.helper".into());
    let f = func("__main__.main", vec![call, ret(2)]);
    let out = disassemble(&[f]);
    assert!(
        out.contains("     0:  CALL       call rel 10 # __main__.helper\n"),
        "got:\n{out}"
    );
}
