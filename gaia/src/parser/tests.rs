//! Parser tests

use crate::ast::{BinOp, Expr, Item, Program, Stmt, UnOp};
use crate::error::CompileError;
use crate::lexer::tokenize;
use crate::parser::parse;

/// Helper to parse a source fragment and return the AST
fn parse_source(source: &str) -> crate::error::Result<Program> {
    let tokens = tokenize(source)?;
    parse(tokens)
}

/// Helper to parse and expect success
fn parse_ok(source: &str) -> Program {
    parse_source(source).expect("parse should succeed")
}

/// Helper to parse and return the error
fn parse_err(source: &str) -> CompileError {
    parse_source(source).expect_err("parse should fail")
}

fn first_expr(program: &Program) -> &Expr {
    match &program.items[0] {
        Item::Stmt(Stmt::Expr(e)) => &e.node,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

// ============================================
// Literals and primaries
// ============================================

#[test]
fn test_parse_int_literal() {
    let prog = parse_ok("42");
    assert!(matches!(first_expr(&prog), Expr::IntLit(42)));
}

#[test]
fn test_parse_float_literal() {
    let prog = parse_ok("3.5");
    match first_expr(&prog) {
        Expr::FloatLit(x) => assert_eq!(*x, 3.5),
        other => panic!("expected float literal, got {other:?}"),
    }
}

#[test]
fn test_parse_bool_and_null_literals() {
    assert!(matches!(first_expr(&parse_ok("true")), Expr::BoolLit(true)));
    assert!(matches!(first_expr(&parse_ok("false")), Expr::BoolLit(false)));
    assert!(matches!(first_expr(&parse_ok("null")), Expr::NullLit));
}

#[test]
fn test_parse_string_literal() {
    match first_expr(&parse_ok(r#""hi there""#)) {
        Expr::StringLit(s) => assert_eq!(s, "hi there"),
        other => panic!("expected string literal, got {other:?}"),
    }
}

// ============================================
// Precedence and associativity
// ============================================

#[test]
fn test_mul_binds_tighter_than_add() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    let prog = parse_ok("1 + 2 * 3");
    match first_expr(&prog) {
        Expr::Binary { op: BinOp::Add, rhs, .. } => {
            assert!(matches!(rhs.node, Expr::Binary { op: BinOp::Mul, .. }));
        }
        other => panic!("expected addition at the root, got {other:?}"),
    }
}

#[test]
fn test_left_associativity() {
    // 1 - 2 - 3 parses as (1 - 2) - 3
    let prog = parse_ok("1 - 2 - 3");
    match first_expr(&prog) {
        Expr::Binary { op: BinOp::Sub, lhs, rhs, .. } => {
            assert!(matches!(lhs.node, Expr::Binary { op: BinOp::Sub, .. }));
            assert!(matches!(rhs.node, Expr::IntLit(3)));
        }
        other => panic!("expected subtraction at the root, got {other:?}"),
    }
}

#[test]
fn test_comparison_below_arithmetic() {
    // a + 1 < b * 2 parses as (a + 1) < (b * 2)
    let prog = parse_ok("a + 1 < b * 2");
    match first_expr(&prog) {
        Expr::Binary { op: BinOp::Lt, lhs, rhs, .. } => {
            assert!(matches!(lhs.node, Expr::Binary { op: BinOp::Add, .. }));
            assert!(matches!(rhs.node, Expr::Binary { op: BinOp::Mul, .. }));
        }
        other => panic!("expected comparison at the root, got {other:?}"),
    }
}

#[test]
fn test_parens_override_precedence() {
    let prog = parse_ok("(1 + 2) * 3");
    match first_expr(&prog) {
        Expr::Binary { op: BinOp::Mul, lhs, .. } => {
            assert!(matches!(lhs.node, Expr::Binary { op: BinOp::Add, .. }));
        }
        other => panic!("expected multiplication at the root, got {other:?}"),
    }
}

#[test]
fn test_unary_operators() {
    let prog = parse_ok("-x + !y");
    match first_expr(&prog) {
        Expr::Binary { op: BinOp::Add, lhs, rhs, .. } => {
            assert!(matches!(lhs.node, Expr::Unary { op: UnOp::Neg, .. }));
            assert!(matches!(rhs.node, Expr::Unary { op: UnOp::Not, .. }));
        }
        other => panic!("expected addition at the root, got {other:?}"),
    }
}

// ============================================
// Statements
// ============================================

#[test]
fn test_variable_definition() {
    let prog = parse_ok("answer = 42");
    match &prog.items[0] {
        Item::Stmt(Stmt::VarDef { name, value }) => {
            assert_eq!(name.node, "answer");
            assert!(matches!(value.node, Expr::IntLit(42)));
        }
        other => panic!("expected variable definition, got {other:?}"),
    }
}

#[test]
fn test_equality_is_not_a_definition() {
    let prog = parse_ok("answer == 42");
    assert!(matches!(
        first_expr(&prog),
        Expr::Binary { op: BinOp::Eq, .. }
    ));
}

#[test]
fn test_return_with_and_without_value() {
    let prog = parse_ok("function f() {\n return 1\n}\nfunction g() {\n return\n}");
    let Item::Function(f) = &prog.items[0] else {
        panic!("expected function")
    };
    assert!(matches!(f.body[0], Stmt::Return { value: Some(_), .. }));
    let Item::Function(g) = &prog.items[1] else {
        panic!("expected function")
    };
    assert!(matches!(g.body[0], Stmt::Return { value: None, .. }));
}

// ============================================
// If disambiguation
// ============================================

#[test]
fn test_if_expression_form() {
    let prog = parse_ok("if true then 666 else 777");
    assert!(matches!(first_expr(&prog), Expr::If { .. }));
}

#[test]
fn test_if_statement_form_multiline() {
    let prog = parse_ok("if x == 1 {\n f(1)\n f(2)\n} else {\n f(3)\n}");
    match &prog.items[0] {
        Item::Stmt(Stmt::If { then_block, else_block, .. }) => {
            assert_eq!(then_block.len(), 2);
            assert_eq!(else_block.len(), 1);
        }
        other => panic!("expected if statement, got {other:?}"),
    }
}

#[test]
fn test_if_statement_form_single_line() {
    let prog = parse_ok("if answer == 42 { return 1 } else { return 0 }");
    match &prog.items[0] {
        Item::Stmt(Stmt::If { then_block, else_block, .. }) => {
            assert!(matches!(then_block[0], Stmt::Return { .. }));
            assert!(matches!(else_block[0], Stmt::Return { .. }));
        }
        other => panic!("expected if statement, got {other:?}"),
    }
}

#[test]
fn test_if_expression_nested_in_call() {
    let prog = parse_ok("f(if c then 1 else 2)");
    match first_expr(&prog) {
        Expr::Call { args, .. } => assert!(matches!(args[0].node, Expr::If { .. })),
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_if_expression_branches_must_share_a_line() {
    assert!(matches!(
        parse_err("x = if true then 1\nelse 2"),
        CompileError::UnexpectedToken { .. }
    ));
}

// ============================================
// Prototypes
// ============================================

#[test]
fn test_function_without_types() {
    let prog = parse_ok("function add(a, b) {\n return a + b\n}");
    let Item::Function(f) = &prog.items[0] else {
        panic!("expected function")
    };
    assert_eq!(f.proto.name.node, "add");
    assert_eq!(f.proto.params.len(), 2);
    assert!(f.proto.params[0].ty.is_none());
    assert!(f.proto.ret_ty.is_none());
    assert!(!f.proto.is_extern);
}

#[test]
fn test_function_with_types_and_return() {
    let prog = parse_ok("function inc(n: Int) -> Int {\n return n + 1\n}");
    let Item::Function(f) = &prog.items[0] else {
        panic!("expected function")
    };
    assert_eq!(f.proto.params[0].ty.as_ref().unwrap().node, "Int");
    assert_eq!(f.proto.ret_ty.as_ref().unwrap().node, "Int");
}

#[test]
fn test_extern_prototype() {
    let prog = parse_ok("extern function puts(s: String) -> Int32");
    let Item::Extern(proto) = &prog.items[0] else {
        panic!("expected extern prototype")
    };
    assert_eq!(proto.name.node, "puts");
    assert!(proto.is_extern);
}

#[test]
fn test_operator_overload_prototype() {
    let prog = parse_ok("function == (a: String, b: String) -> Bool {\n return true\n}");
    let Item::Function(f) = &prog.items[0] else {
        panic!("expected function")
    };
    assert_eq!(f.proto.name.node, "==");
}

#[test]
fn test_unary_operator_overload_arity() {
    parse_ok("function ! (a: String) -> Bool {\n return false\n}");
    assert!(matches!(
        parse_err("function ! (a: String, b: String) -> Bool {\n return false\n}"),
        CompileError::InvalidNumberOfParameters { .. }
    ));
}

#[test]
fn test_binary_operator_overload_arity() {
    assert!(matches!(
        parse_err("function == (a: String) -> Bool {\n return true\n}"),
        CompileError::InvalidNumberOfParameters { .. }
    ));
}

#[test]
fn test_minus_overload_is_unary_or_binary() {
    parse_ok("function - (s: String) -> String {\n return s\n}");
    parse_ok("function - (a: String, b: String) -> String {\n return a\n}");
    assert!(matches!(
        parse_err("function - (a: String, b: String, c: String) -> String {\n return a\n}"),
        CompileError::InvalidNumberOfParameters { .. }
    ));
}

#[test]
fn test_greater_than_is_not_overloadable() {
    let err = parse_err("function > (a: String, b: String) -> Bool {\n return true\n}");
    match err {
        CompileError::UnexpectedToken { message } => {
            assert!(message.contains("not overloadable"), "message: {message}");
        }
        other => panic!("expected unexpected token, got {other:?}"),
    }
}

// ============================================
// Calls and misc
// ============================================

#[test]
fn test_call_with_arguments() {
    let prog = parse_ok("wrap(\"hello\", 1 + 2)");
    match first_expr(&prog) {
        Expr::Call { callee, args } => {
            assert_eq!(callee.node, "wrap");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_statements_need_newlines() {
    assert!(matches!(
        parse_err("a = 1 b = 2"),
        CompileError::UnexpectedToken { .. }
    ));
}

#[test]
fn test_multiple_items() {
    let prog = parse_ok("x = 1\n\nfunction f() {\n return x\n}\nf()\n");
    assert_eq!(prog.items.len(), 3);
    assert!(matches!(prog.items[0], Item::Stmt(Stmt::VarDef { .. })));
    assert!(matches!(prog.items[1], Item::Function(_)));
    assert!(matches!(prog.items[2], Item::Stmt(Stmt::Expr(_))));
}
