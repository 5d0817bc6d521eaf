//! Full-pipeline integration tests: specification text through compilation,
//! table serialization and reload, and scanning — the same path the driver
//! takes.

use crate::automata::table::DfaTable;
use crate::pipeline::compile;
use crate::scanner::Scanner;

/// A small expression language: classes, keywords, numbers, identifiers,
/// and a couple of operators.
const TINY_LANG: &str = concat!(
    "$DIGIT [0-9]\n",
    "$LOWER [a-z]\n",
    "\n",
    "$WHILE while\n",
    "$ID $LOWER+\n",
    "$NUM $DIGIT+\n",
    "$ASSIGN =\n",
    "$PLUS \\+\n",
    "$LPAREN \\(\n",
    "$RPAREN \\)\n",
);

/// Compile, serialize, reload, and scan — returning `TYPE lexeme` lines.
fn run_lines(spec: &str, input: &[&str]) -> (Vec<String>, usize) {
    let lexer = compile(spec).expect("spec should compile");

    let mut buf = Vec::new();
    lexer.table.write_to(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let table = DfaTable::parse(&text).expect("written table should reparse");

    let scanner = Scanner::new(&table, lexer.dfa.start);
    let mut out = Vec::new();
    let mut errors = 0;
    for line in input {
        if line.trim().is_empty() {
            continue;
        }
        let scan = scanner.scan_line(line);
        for token in &scan.tokens {
            out.push(format!("{} {}", token.token_type, token.lexeme));
        }
        errors += scan.errors.len();
    }
    (out, errors)
}

#[test]
fn test_tiny_language_program() {
    let (out, errors) = run_lines(
        TINY_LANG,
        &["while (i = 0)", "x = y + 41"],
    );
    assert_eq!(
        out,
        vec![
            "WHILE while",
            "LPAREN (",
            "ID i",
            "ASSIGN =",
            "NUM 0",
            "RPAREN )",
            "ID x",
            "ASSIGN =",
            "ID y",
            "PLUS +",
            "NUM 41",
        ]
    );
    assert_eq!(errors, 0);
}

#[test]
fn test_blank_lines_are_skipped() {
    let (out, errors) = run_lines(TINY_LANG, &["", "  ", "a", ""]);
    assert_eq!(out, vec!["ID a"]);
    assert_eq!(errors, 0);
}

#[test]
fn test_keyword_prefix_falls_back_to_identifier() {
    // "whil" and "whiles" are identifiers; only exactly "while" is the
    // keyword (and wins over $ID by declaration order).
    let (out, _) = run_lines(TINY_LANG, &["whil while whiles"]);
    assert_eq!(out, vec!["ID whil", "WHILE while", "ID whiles"]);
}

#[test]
fn test_reloaded_table_is_identical() {
    let lexer = compile(TINY_LANG).unwrap();

    let mut buf = Vec::new();
    lexer.table.write_to(&mut buf).unwrap();
    let reloaded = DfaTable::parse(std::str::from_utf8(&buf).unwrap()).unwrap();

    assert_eq!(reloaded, lexer.table);
}

#[test]
fn test_serialize_is_deterministic() {
    let first = {
        let mut buf = Vec::new();
        compile(TINY_LANG).unwrap().table.write_to(&mut buf).unwrap();
        buf
    };
    let second = {
        let mut buf = Vec::new();
        compile(TINY_LANG).unwrap().table.write_to(&mut buf).unwrap();
        buf
    };
    assert_eq!(first, second, "two compilations of one spec must serialize identically");
}

#[test]
fn test_unmatchable_line_produces_only_errors() {
    let (out, errors) = run_lines(TINY_LANG, &["@#!"]);
    assert!(out.is_empty());
    assert_eq!(errors, 3);
}

#[test]
fn test_end_to_end_digits_scenario() {
    let (out, errors) = run_lines("$DIGIT [0-9]\n\n$INT $DIGIT+\n", &["42 7"]);
    assert_eq!(out, vec!["INT 42", "INT 7"]);
    assert_eq!(errors, 0);
}

#[test]
fn test_dead_end_recovery_scenario() {
    // Rules recognizing exactly "ab" and exactly "a": input "ac" emits the
    // shorter accepted lexeme and reports the trailing "c" without failing.
    let (out, errors) = run_lines("$AB ab\n$A a\n", &["ac"]);
    assert_eq!(out, vec!["A a"]);
    assert_eq!(errors, 1);
}
