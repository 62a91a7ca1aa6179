//! Expression and statement AST nodes

use super::{Span, Spanned};
use serde::{Deserialize, Serialize};

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    IntLit(i64),
    /// Float literal
    FloatLit(f64),
    /// Boolean literal
    BoolLit(bool),
    /// String literal (no escape processing)
    StringLit(String),
    /// The `null` literal
    NullLit,

    /// Variable reference
    Var(String),

    /// Binary operation; `op_span` locates the operator token for diagnostics
    Binary {
        op: BinOp,
        op_span: Span,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },

    /// Unary prefix operation
    Unary {
        op: UnOp,
        op_span: Span,
        operand: Box<Spanned<Expr>>,
    },

    /// Function call
    Call {
        callee: Spanned<String>,
        args: Vec<Spanned<Expr>>,
    },

    /// Expression-form conditional: if cond then a else b
    If {
        cond: Box<Spanned<Expr>>,
        then_val: Box<Spanned<Expr>>,
        else_val: Box<Spanned<Expr>>,
    },
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// Bare expression used as a statement
    Expr(Spanned<Expr>),

    /// Variable definition: `name = value` (binds exactly once per scope)
    VarDef {
        name: Spanned<String>,
        value: Spanned<Expr>,
    },

    /// `return` with optional value
    Return {
        value: Option<Spanned<Expr>>,
        span: Span,
    },

    /// Statement-form conditional with braced blocks
    If {
        cond: Spanned<Expr>,
        then_block: Vec<Stmt>,
        else_block: Vec<Stmt>,
    },
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Precedence for the climbing parser; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Assign => 1,
            BinOp::Eq | BinOp::Ne => 2,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 3,
            BinOp::Add | BinOp::Sub => 4,
            BinOp::Mul | BinOp::Div => 5,
        }
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Assign => "=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        write!(f, "{s}")
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Prefix `+`
    Plus,
    /// Prefix `-`
    Neg,
    /// Logical `!`
    Not,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnOp::Plus => "+",
            UnOp::Neg => "-",
            UnOp::Not => "!",
        };
        write!(f, "{s}")
    }
}
