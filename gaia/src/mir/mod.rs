//! Typed mid-level representation (MIR)
//!
//! MIR parallels the AST but every expression carries its concrete `Type`
//! and every call holds the prototype it resolved to — the monomorphized
//! one for user functions, the declared one for externs. Primitive
//! operators survive as dedicated nodes after the implicit desugarings
//! (`!=`, `>`, `<=`, `>=` are rewritten in terms of `==`, `<` and `!`).

use crate::ast::{Span, Type};
use std::rc::Rc;

/// A fully checked compilation: monomorphized functions in instantiation
/// order, the statements of the synthesized `main`, and the extern
/// prototypes referenced by any call.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub functions: Vec<Rc<Function>>,
    pub main_body: Vec<Stmt>,
    pub externs: Vec<Rc<Prototype>>,
}

/// One monomorphized function: concrete prototype plus typed body
#[derive(Debug, Clone)]
pub struct Function {
    pub proto: Rc<Prototype>,
    pub body: Vec<Stmt>,
}

/// A concrete, fully typed prototype
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<(String, Type)>,
    pub ret: Type,
    pub is_extern: bool,
}

impl Prototype {
    /// The LLVM symbol for this prototype.
    ///
    /// Extern functions and `main` keep their source names; monomorphized
    /// user functions append their parameter types so distinct
    /// instantiations of one template get distinct symbols. Operator
    /// symbols are mapped to words (`+` becomes `op.add`) to stay inside
    /// LLVM's unquoted identifier alphabet.
    pub fn symbol(&self) -> String {
        if self.is_extern || self.name == "main" {
            return self.name.clone();
        }
        let base = match self.name.as_str() {
            "==" => "op.eq".to_string(),
            "!=" => "op.ne".to_string(),
            "<" => "op.lt".to_string(),
            "<=" => "op.le".to_string(),
            "+" => "op.add".to_string(),
            "-" => "op.sub".to_string(),
            "*" => "op.mul".to_string(),
            "/" => "op.div".to_string(),
            "!" => "op.not".to_string(),
            name => name.to_string(),
        };
        if self.params.is_empty() {
            base
        } else {
            let types: Vec<String> = self.params.iter().map(|(_, t)| t.to_string()).collect();
            format!("{}.{}", base, types.join("."))
        }
    }
}

/// Typed statement
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    VarDef { name: String, value: Expr },
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_block: Vec<Stmt>,
        else_block: Vec<Stmt>,
    },
}

/// Typed expression
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
    Var(String),
    /// Primitive unary operator on `Int`/`Float`/`Bool`
    Unary { op: UnOp, operand: Box<Expr> },
    /// Primitive binary operator; after desugaring only `==`, `<` and the
    /// four arithmetic operators remain
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Call to a resolved prototype (monomorphized user function or extern)
    Call {
        callee: Rc<Prototype>,
        args: Vec<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_val: Box<Expr>,
        else_val: Box<Expr>,
    },
}

/// Primitive binary operators that survive desugaring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
}

/// Primitive unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Prefix `+`; a no-op on its numeric operand
    Plus,
    Neg,
    Not,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proto(name: &str, params: Vec<(&str, Type)>, is_extern: bool) -> Prototype {
        Prototype {
            name: name.to_string(),
            params: params
                .into_iter()
                .map(|(n, t)| (n.to_string(), t))
                .collect(),
            ret: Type::Void,
            is_extern,
        }
    }

    #[test]
    fn test_symbol_mangles_parameter_types() {
        let p = proto("add", vec![("a", Type::Int64), ("b", Type::Int64)], false);
        assert_eq!(p.symbol(), "add.Int.Int");
    }

    #[test]
    fn test_symbol_keeps_extern_names() {
        let p = proto("puts", vec![("s", Type::String)], true);
        assert_eq!(p.symbol(), "puts");
    }

    #[test]
    fn test_symbol_maps_operator_names() {
        let p = proto("+", vec![("a", Type::String), ("b", Type::String)], false);
        assert_eq!(p.symbol(), "op.add.String.String");
    }

    #[test]
    fn test_symbol_distinguishes_instantiations() {
        let a = proto("id", vec![("x", Type::Int64)], false);
        let b = proto("id", vec![("x", Type::Float64)], false);
        assert_ne!(a.symbol(), b.symbol());
    }
}
