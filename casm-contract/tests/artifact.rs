use casm_contract::{Error, ProgramJson};
use num_bigint::BigUint;

const PRIME: &str = "0x800000000000011000000000000000000000000000000000000000000000001";

fn minimal(extra_identifiers: &str) -> String {
    format!(
        r#"{{
        "prime": "{PRIME}",
        "data": ["0x480680017fff8000", "0x5"],
        "builtins": ["pedersen", "range_check"],
        "hints": {{"0": [{{"code": "ids.a = 1"}}, {{"code": "ids.b = 2"}}]}},
        "identifiers": {{{extra_identifiers}}}
    }}"#
    )
}

#[test]
fn accepts_bare_program_and_wrapped_contract_forms() {
    let bare = minimal("");
    let program = ProgramJson::from_json(&bare).unwrap();
    assert_eq!(program.data.len(), 2);

    let wrapped = format!(r#"{{"program": {bare}, "abi": []}}"#);
    let program = ProgramJson::from_json(&wrapped).unwrap();
    assert_eq!(program.data.len(), 2);
    assert_eq!(program.builtins, vec!["pedersen", "range_check"]);
}

#[test]
fn parses_the_field_prime_and_data_words() {
    let program = ProgramJson::from_json(&minimal("")).unwrap();
    assert_eq!(
        program.field_prime().unwrap(),
        "3618502788666131213697322783095070105623107215331596699973092056135872020481"
            .parse::<BigUint>()
            .unwrap()
    );
    let words = program.data_words().unwrap();
    assert_eq!(words[1], BigUint::from(5u32));
}

#[test]
fn rejects_malformed_field_elements() {
    let text = format!(
        r#"{{"prime": "{PRIME}", "data": ["0xnope"]}}"#
    );
    let program = ProgramJson::from_json(&text).unwrap();
    let err = program.data_words().unwrap_err();
    assert!(
        matches!(err, Error::InvalidFelt(ref s) if s == "0xnope"),
        "expected InvalidFelt, got {err}"
    );
}

#[test]
fn rejects_a_malformed_prime() {
    let text = r#"{"prime": "p", "data": []}"#;
    let program = ProgramJson::from_json(text).unwrap();
    assert!(matches!(
        program.field_prime().unwrap_err(),
        Error::InvalidPrime(_)
    ));
}

#[test]
fn function_decls_are_ordered_by_entry_pc() {
    let program = ProgramJson::from_json(&minimal(
        r#"
        "__main__.b": {"type": "function", "pc": 10},
        "__main__.a": {"type": "function", "pc": 0, "decorators": ["view"]},
        "__main__.a.Args": {"type": "struct", "members": {}, "size": 0}
    "#,
    ))
    .unwrap();
    let decls = program.function_decls();
    let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["__main__.a", "__main__.b"]);
    assert_eq!(decls[0].decorators, vec!["view"]);
}

#[test]
fn struct_members_come_back_in_offset_order() {
    let program = ProgramJson::from_json(&minimal(
        r#"
        "__main__.f.Args": {
            "type": "struct",
            "members": {"z": {"offset": 0}, "a": {"offset": 1}},
            "size": 2
        }
    "#,
    ))
    .unwrap();
    assert_eq!(
        program.member_names("__main__.f.Args"),
        Some(vec!["z".to_string(), "a".to_string()]),
        "offset order wins over lexical order"
    );
    assert_eq!(program.member_names("__main__.f.Return"), None);
}

#[test]
fn labels_are_shortened_to_their_last_segment() {
    let program = ProgramJson::from_json(&minimal(
        r#"
        "__main__.main.loop_start": {"type": "label", "pc": 14}
    "#,
    ))
    .unwrap();
    let labels = program.labels();
    assert_eq!(labels.get(&14).map(String::as_str), Some("loop_start"));
}

#[test]
fn hints_at_one_pc_join_into_a_single_snippet() {
    let program = ProgramJson::from_json(&minimal("")).unwrap();
    assert_eq!(program.hint_at(0).as_deref(), Some("ids.a = 1\nids.b = 2"));
    assert_eq!(program.hint_at(1), None);
}
