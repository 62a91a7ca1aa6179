//! Abstract Syntax Tree definitions

mod expr;
pub mod output;
mod span;
mod types;

pub use expr::*;
pub use span::*;
pub use types::*;

use serde::{Deserialize, Serialize};

/// A parsed source file: declarations and top-level statements in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Item {
    /// `function` definition (user function or operator overload)
    Function(FnDecl),
    /// `extern function` prototype
    Extern(Prototype),
    /// Top-level statement, appended to the synthesized `main`
    Stmt(Stmt),
}

/// Function definition: prototype plus body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnDecl {
    pub proto: Prototype,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Function prototype.
///
/// `name` may be an operator symbol for overload definitions. Parameter and
/// return types are source-level type names; resolution happens in the type
/// checker so that extern declarations and templates share one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prototype {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub ret_ty: Option<Spanned<String>>,
    pub is_extern: bool,
}

/// Function parameter with optional declared type name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Option<Spanned<String>>,
}
