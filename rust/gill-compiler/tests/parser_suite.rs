//! Statement-grammar suite: whole programs through the front end.

use gill_compiler::compiler::ast::{BinOp, Node, Number};
use gill_compiler::compiler::tokens::TypeTag;
use gill_compiler::{compile_source, CompileError};

fn stmts(source: &str) -> Vec<Node> {
    match compile_source(source).expect("source should parse") {
        Node::Block(stmts) => stmts,
        other => panic!("expected top-level block, got {:?}", other),
    }
}

#[test]
fn parses_a_full_program() {
    let source = r#"
; a small program exercising most statement forms
import stdlib

define limit int 10
define total int 0

function int double(int n) { return n * 2 }

for (define i int 0, i < limit, i++) {
    if i % 2 == 0 {
        assign total total + exec double(i)
    }
}

out total
"#;
    let statements = stmts(source);
    assert_eq!(statements.len(), 6);
    assert!(matches!(&statements[0], Node::Import(name) if name == "stdlib"));
    assert!(matches!(&statements[3], Node::FunctionDef(def) if def.name == "double"));
    assert!(matches!(&statements[5], Node::Output(_)));
}

#[test]
fn nested_blocks_and_loops() {
    let source = r#"
while a < 10 {
    foreach (define x int : items) {
        switch (x) {
            case (0) { out "zero" }
            default { out x }
        }
    }
}
"#;
    let statements = stmts(source);
    assert_eq!(statements.len(), 1);
    let Node::While { body, .. } = &statements[0] else {
        panic!("expected while");
    };
    let Node::Block(inner) = body.as_ref() else {
        panic!("expected block body");
    };
    assert!(matches!(&inner[0], Node::ForEach { .. }));
}

#[test]
fn namespace_bodies_parse_like_blocks() {
    let source = r#"
namespace util {
    define version string "1.0"
    function int triple(int n) { return n * 3 }
}
"#;
    let statements = stmts(source);
    let Node::Namespace { name, body } = &statements[0] else {
        panic!("expected namespace");
    };
    assert_eq!(name, "util");
    assert!(matches!(body.as_ref(), Node::Block(stmts) if stmts.len() == 2));
}

#[test]
fn chained_comparisons_group_left() {
    let statements = stmts("a < b < c");
    let Node::BinOp { left, op, .. } = &statements[0] else {
        panic!("expected binop");
    };
    assert_eq!(*op, BinOp::Lt);
    assert!(matches!(left.as_ref(), Node::BinOp { op: BinOp::Lt, .. }));
}

#[test]
fn empty_source_parses_to_empty_block() {
    assert!(stmts("").is_empty());
    assert!(stmts("; only a comment\n").is_empty());
}

#[test]
fn define_with_empty_brackets_sizes_from_literal() {
    let statements = stmts("define a[] int [1, 2]");
    let Node::Define { value, .. } = &statements[0] else {
        panic!("expected define");
    };
    assert!(matches!(
        value.as_ref(),
        Node::Array {
            declared_size: 2,
            ..
        }
    ));
}

#[test]
fn for_step_may_be_any_statement() {
    let statements = stmts("for (define i int 0, i < 9, assign i i + 3) { out i }");
    let Node::For { step, .. } = &statements[0] else {
        panic!("expected for");
    };
    assert!(matches!(step.as_ref(), Node::Assign { .. }));
}

#[test]
fn lex_error_surfaces_through_compile() {
    let err = compile_source("define x int @").unwrap_err();
    assert!(matches!(err, CompileError::Lex(_)));
    assert!(err.to_string().starts_with("LexError:"));
}

#[test]
fn parse_error_surfaces_through_compile() {
    let err = compile_source("define x").unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)));
    assert!(err.to_string().starts_with("ParseError:"));
}

#[test]
fn ast_round_trips_through_json() {
    let program = compile_source(
        r#"
function int add(int a, int b default 0) { return a + b }
define n int exec add(1, 2)
"#,
    )
    .unwrap();
    let json = serde_json::to_string(&program).unwrap();
    let back: Node = serde_json::from_str(&json).unwrap();
    assert_eq!(program, back);
}

#[test]
fn number_literals_keep_their_category() {
    let statements = stmts("define a int 1\ndefine b float 1.5");
    let Node::Define { value, .. } = &statements[0] else {
        panic!("expected define");
    };
    assert!(matches!(value.as_ref(), Node::Number(Number::Int(1))));
    let Node::Define {
        declared_type,
        value,
        ..
    } = &statements[1]
    else {
        panic!("expected define");
    };
    assert_eq!(*declared_type, TypeTag::Float);
    assert!(matches!(value.as_ref(), Node::Number(Number::Float(f)) if *f == 1.5));
}
