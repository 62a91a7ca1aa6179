//! AST output for tooling

use super::Program;

/// Serialize a parsed program to pretty-printed JSON (`--dump-ast`)
pub fn to_json(program: &Program) -> serde_json::Result<String> {
    serde_json::to_string_pretty(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Item, Span, Spanned, Stmt};

    #[test]
    fn test_dump_is_valid_json() {
        let program = Program {
            items: vec![Item::Stmt(Stmt::Expr(Spanned::new(
                Expr::IntLit(42),
                Span::new(0, 2),
            )))],
        };
        let json = to_json(&program).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("items").is_some());
    }
}
