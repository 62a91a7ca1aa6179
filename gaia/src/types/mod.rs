//! Type checking and monomorphization
//!
//! The checker lowers the AST into typed MIR. Function declarations are
//! registered as templates; each call site instantiates a template for its
//! concrete argument types, so one declaration can produce several
//! monomorphized functions. Primitive operators are checked against the
//! built-in table before any overload lookup, and the implicitly defined
//! operators are rewritten in terms of `==`, `<` and `!`.

pub mod scope;


use crate::ast::{self, FnDecl, Item, Param, Span, Spanned, Type};
use crate::error::{CompileError, Result};
use crate::mir;
use scope::SymbolTable;
use std::collections::HashMap;
use std::rc::Rc;

/// Instantiation cache key: template name plus concrete argument types
type InstantiationKey = (String, Vec<Type>);

pub struct TypeChecker {
    symbols: SymbolTable,
    /// Finished instantiations, keyed structurally
    instantiated: HashMap<InstantiationKey, Rc<mir::Function>>,
    /// Completion order, for emission
    finished: Vec<Rc<mir::Function>>,
    /// How many finished functions have been handed out via
    /// `take_new_functions` (REPL incremental sync)
    synced: usize,
    /// In-flight instantiations; `None` when the template declared no
    /// return type, which makes recursion into it an error
    in_progress: HashMap<InstantiationKey, Option<Rc<mir::Prototype>>>,
    /// Extern prototypes referenced by some call, in first-use order
    used_externs: Vec<Rc<mir::Prototype>>,
    /// One frame of observed `(type, span)` returns per function being
    /// checked; frame 0 belongs to the synthesized `main`
    return_types: Vec<Vec<(Type, Span)>>,
    /// Top-level statements accumulated across files
    main_body: Vec<mir::Stmt>,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self::with_mode(false)
    }

    /// REPL mode: redefinitions replace instead of erroring
    pub fn new_repl() -> Self {
        Self::with_mode(true)
    }

    fn with_mode(repl_mode: bool) -> Self {
        TypeChecker {
            symbols: SymbolTable::new(repl_mode),
            instantiated: HashMap::new(),
            finished: Vec::new(),
            synced: 0,
            in_progress: HashMap::new(),
            used_externs: Vec::new(),
            return_types: vec![Vec::new()],
            main_body: Vec::new(),
        }
    }

    /// Check one source file; declarations register, top-level statements
    /// append to the synthesized `main`.
    pub fn check_file(&mut self, program: &ast::Program) -> Result<()> {
        let stmts = self.check_items(program)?;
        self.main_body.extend(stmts);
        Ok(())
    }

    /// Check a file fragment and return its top-level statements (the REPL
    /// evaluates these immediately instead of appending them to `main`).
    pub fn check_items(&mut self, program: &ast::Program) -> Result<Vec<mir::Stmt>> {
        let mut stmts = Vec::new();
        for item in &program.items {
            let result = match item {
                Item::Function(decl) => self.register_function(decl),
                Item::Extern(proto) => self.register_extern(proto),
                Item::Stmt(stmt) => self.check_stmt(stmt).map(|s| stmts.push(s)),
            };
            if let Err(err) = result {
                // A failed statement may leave pushed scopes behind
                self.symbols.truncate_to_global();
                return Err(err);
            }
        }
        Ok(stmts)
    }

    /// Finish the compilation
    pub fn finish(self) -> mir::Program {
        mir::Program {
            functions: self.finished,
            main_body: self.main_body,
            externs: self.used_externs,
        }
    }

    /// Functions instantiated since the previous call (REPL sync)
    pub fn take_new_functions(&mut self) -> Vec<Rc<mir::Function>> {
        let new = self.finished[self.synced..].to_vec();
        self.synced = self.finished.len();
        new
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn register_function(&mut self, decl: &FnDecl) -> Result<()> {
        for param in &decl.proto.params {
            if let Some(ty) = &param.ty {
                self.resolve_type_name(ty)?;
            }
        }
        if let Some(ret) = &decl.proto.ret_ty {
            self.resolve_type_name(ret)?;
        }
        self.symbols.define_function(Rc::new(decl.clone()));
        Ok(())
    }

    fn register_extern(&mut self, proto: &ast::Prototype) -> Result<()> {
        let mut params = Vec::new();
        for param in &proto.params {
            let Some(ty_name) = &param.ty else {
                return Err(CompileError::invalid_type(
                    format!(
                        "extern function parameter '{}' requires a type",
                        param.name.node
                    ),
                    param.name.span,
                ));
            };
            let ty = self.resolve_type_name(ty_name)?;
            if ty == Type::Void {
                return Err(CompileError::invalid_type(
                    format!("parameter '{}' cannot have type 'Void'", param.name.node),
                    param.name.span,
                ));
            }
            params.push((param.name.node.clone(), ty));
        }
        let ret = match &proto.ret_ty {
            Some(name) => self.resolve_type_name(name)?,
            None => Type::Void,
        };
        self.symbols.define_extern(Rc::new(mir::Prototype {
            name: proto.name.node.clone(),
            params,
            ret,
            is_extern: true,
        }));
        Ok(())
    }

    fn resolve_type_name(&self, name: &Spanned<String>) -> Result<Type> {
        Type::from_name(&name.node).ok_or_else(|| {
            CompileError::invalid_type(format!("unknown type '{}'", name.node), name.span)
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn check_stmt(&mut self, stmt: &ast::Stmt) -> Result<mir::Stmt> {
        match stmt {
            ast::Stmt::Expr(expr) => Ok(mir::Stmt::Expr(self.check_expr(expr)?)),

            ast::Stmt::VarDef { name, value } => {
                let value = self.check_expr(value)?;
                if value.ty == Type::Void {
                    return Err(CompileError::invalid_type(
                        format!("variable '{}' cannot have type 'Void'", name.node),
                        value.span,
                    ));
                }
                self.symbols
                    .define_variable(&name.node, value.ty.clone(), name.span)?;
                Ok(mir::Stmt::VarDef {
                    name: name.node.clone(),
                    value,
                })
            }

            ast::Stmt::Return { value, span } => {
                let value = match value {
                    Some(expr) => Some(self.check_expr(expr)?),
                    None => None,
                };
                let ty = value.as_ref().map(|v| v.ty.clone()).unwrap_or(Type::Void);
                if self.return_types.len() == 1 {
                    // Returning from the synthesized main sets the process
                    // exit status, so only integer-like values work.
                    if !matches!(ty, Type::Void | Type::Int64 | Type::Int32 | Type::Bool) {
                        return Err(CompileError::invalid_type(
                            format!("cannot return a value of type '{ty}' from the top level"),
                            *span,
                        ));
                    }
                }
                self.return_types
                    .last_mut()
                    .expect("return frame")
                    .push((ty, *span));
                Ok(mir::Stmt::Return(value))
            }

            ast::Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.check_expr(cond)?;
                if cond.ty != Type::Bool {
                    return Err(CompileError::invalid_type(
                        "'if' condition requires a Bool expression",
                        cond.span,
                    ));
                }
                self.symbols.push_scope();
                let then_block: Result<Vec<_>> =
                    then_block.iter().map(|s| self.check_stmt(s)).collect();
                self.symbols.pop_scope();
                self.symbols.push_scope();
                let else_block: Result<Vec<_>> =
                    else_block.iter().map(|s| self.check_stmt(s)).collect();
                self.symbols.pop_scope();
                Ok(mir::Stmt::If {
                    cond,
                    then_block: then_block?,
                    else_block: else_block?,
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn check_expr(&mut self, expr: &Spanned<ast::Expr>) -> Result<mir::Expr> {
        let span = expr.span;
        match &expr.node {
            ast::Expr::IntLit(n) => Ok(literal(mir::ExprKind::Int(*n), Type::Int64, span)),
            ast::Expr::FloatLit(x) => Ok(literal(mir::ExprKind::Float(*x), Type::Float64, span)),
            ast::Expr::BoolLit(b) => Ok(literal(mir::ExprKind::Bool(*b), Type::Bool, span)),
            ast::Expr::StringLit(s) => {
                Ok(literal(mir::ExprKind::Str(s.clone()), Type::String, span))
            }
            ast::Expr::NullLit => Ok(literal(mir::ExprKind::Null, Type::Null, span)),

            ast::Expr::Var(name) => match self.symbols.lookup_variable(name) {
                Some(ty) => Ok(mir::Expr {
                    kind: mir::ExprKind::Var(name.clone()),
                    ty: ty.clone(),
                    span,
                }),
                None => Err(CompileError::unknown_identifier(name, span)),
            },

            ast::Expr::Unary {
                op,
                op_span,
                operand,
            } => self.check_unary(*op, *op_span, operand, span),

            ast::Expr::Binary {
                op,
                op_span,
                lhs,
                rhs,
            } => self.check_binary(*op, *op_span, lhs, rhs, span),

            ast::Expr::Call { callee, args } => self.check_call(callee, args, span),

            ast::Expr::If {
                cond,
                then_val,
                else_val,
            } => {
                let cond = self.check_expr(cond)?;
                if cond.ty != Type::Bool {
                    return Err(CompileError::invalid_type(
                        "'if' condition requires a Bool expression",
                        cond.span,
                    ));
                }
                let then_val = self.check_expr(then_val)?;
                let else_val = self.check_expr(else_val)?;
                if then_val.ty != else_val.ty {
                    return Err(CompileError::mismatching_types(
                        format!(
                            "'then' and 'else' branches have mismatching types '{}' and '{}'",
                            then_val.ty, else_val.ty
                        ),
                        span,
                    ));
                }
                let ty = then_val.ty.clone();
                Ok(mir::Expr {
                    kind: mir::ExprKind::If {
                        cond: Box::new(cond),
                        then_val: Box::new(then_val),
                        else_val: Box::new(else_val),
                    },
                    ty,
                    span,
                })
            }
        }
    }

    fn check_unary(
        &mut self,
        op: ast::UnOp,
        op_span: Span,
        operand_ast: &Spanned<ast::Expr>,
        span: Span,
    ) -> Result<mir::Expr> {
        let operand = self.check_expr(operand_ast)?;

        // Primitive semantics come first
        match op {
            ast::UnOp::Not if operand.ty == Type::Bool => {
                return Ok(unary(mir::UnOp::Not, operand, Type::Bool, span));
            }
            ast::UnOp::Plus | ast::UnOp::Neg if operand.ty.is_arithmetic() => {
                let mir_op = if op == ast::UnOp::Neg {
                    mir::UnOp::Neg
                } else {
                    mir::UnOp::Plus
                };
                let ty = operand.ty.clone();
                return Ok(unary(mir_op, operand, ty, span));
            }
            _ => {}
        }

        // Then user-defined operator overloads
        let symbol = op.to_string();
        let arg_types = [operand.ty.clone()];
        if let Some(proto) = self.resolve_user_call(&symbol, &arg_types, op_span)? {
            let ty = proto.ret.clone();
            return Ok(mir::Expr {
                kind: mir::ExprKind::Call {
                    callee: proto,
                    args: vec![operand],
                },
                ty,
                span,
            });
        }

        if is_primitive(&operand.ty) {
            Err(CompileError::invalid_type(
                format!("invalid type '{}' for operator '{}'", operand.ty, op),
                op_span,
            ))
        } else {
            Err(CompileError::no_matching_function(
                format!(
                    "no matching function for call to '{}' with argument types ({})",
                    op, operand.ty
                ),
                span,
            ))
        }
    }

    fn check_binary(
        &mut self,
        op: ast::BinOp,
        op_span: Span,
        lhs_ast: &Spanned<ast::Expr>,
        rhs_ast: &Spanned<ast::Expr>,
        span: Span,
    ) -> Result<mir::Expr> {
        match op {
            ast::BinOp::Assign => {
                return Err(CompileError::invalid_type(
                    "'=' is not an expression; variables are immutable",
                    op_span,
                ));
            }
            // a > b  =>  b < a
            ast::BinOp::Gt => {
                return self.check_binary(ast::BinOp::Lt, op_span, rhs_ast, lhs_ast, span);
            }
            // a >= b  =>  !(a < b)
            ast::BinOp::Ge => {
                let inner = self.check_binary(ast::BinOp::Lt, op_span, lhs_ast, rhs_ast, span)?;
                return self.negate(inner, op_span);
            }
            _ => {}
        }

        let mut lhs = self.check_expr(lhs_ast)?;
        let mut rhs = self.check_expr(rhs_ast)?;

        // An integer literal compared against a Float is read as a Float
        // literal.
        if matches!(
            op,
            ast::BinOp::Eq | ast::BinOp::Ne | ast::BinOp::Lt | ast::BinOp::Le
        ) {
            if lhs.ty.is_float()
                && let ast::Expr::IntLit(n) = rhs_ast.node
            {
                rhs = literal(mir::ExprKind::Float(n as f64), Type::Float64, rhs.span);
            } else if rhs.ty.is_float()
                && let ast::Expr::IntLit(n) = lhs_ast.node
            {
                lhs = literal(mir::ExprKind::Float(n as f64), Type::Float64, lhs.span);
            }
        }

        // Primitive operator table
        let same = lhs.ty == rhs.ty;
        match op {
            ast::BinOp::Eq | ast::BinOp::Ne
                if same && matches!(lhs.ty, Type::Int64 | Type::Bool | Type::Float64) =>
            {
                let eq = binary(mir::BinOp::Eq, lhs, rhs, Type::Bool, span);
                return if op == ast::BinOp::Ne {
                    // a != b  =>  !(a == b)
                    self.negate(eq, op_span)
                } else {
                    Ok(eq)
                };
            }
            ast::BinOp::Lt | ast::BinOp::Le if same && lhs.ty.is_arithmetic() => {
                return if op == ast::BinOp::Lt {
                    Ok(binary(mir::BinOp::Lt, lhs, rhs, Type::Bool, span))
                } else {
                    // a <= b  =>  !(b < a)
                    let swapped = binary(mir::BinOp::Lt, rhs, lhs, Type::Bool, span);
                    self.negate(swapped, op_span)
                };
            }
            ast::BinOp::Add | ast::BinOp::Sub | ast::BinOp::Mul | ast::BinOp::Div
                if same && lhs.ty.is_arithmetic() =>
            {
                let mir_op = match op {
                    ast::BinOp::Add => mir::BinOp::Add,
                    ast::BinOp::Sub => mir::BinOp::Sub,
                    ast::BinOp::Mul => mir::BinOp::Mul,
                    _ => mir::BinOp::Div,
                };
                let ty = lhs.ty.clone();
                return Ok(binary(mir_op, lhs, rhs, ty, span));
            }
            _ => {}
        }

        // Operator overloads
        let symbol = op.to_string();
        let arg_types = [lhs.ty.clone(), rhs.ty.clone()];
        if let Some(proto) = self.resolve_user_call(&symbol, &arg_types, op_span)? {
            let ty = proto.ret.clone();
            return Ok(mir::Expr {
                kind: mir::ExprKind::Call {
                    callee: proto,
                    args: vec![lhs, rhs],
                },
                ty,
                span,
            });
        }

        if is_primitive(&lhs.ty) && is_primitive(&rhs.ty) {
            let operation = match op {
                ast::BinOp::Add | ast::BinOp::Sub | ast::BinOp::Mul | ast::BinOp::Div => {
                    "arithmetic"
                }
                _ => "comparison",
            };
            Err(CompileError::invalid_type(
                format!(
                    "invalid types '{}' and '{}' for {} operation",
                    lhs.ty, rhs.ty, operation
                ),
                op_span,
            ))
        } else {
            Err(CompileError::no_matching_function(
                format!(
                    "no matching function for call to '{}' with argument types ({}, {})",
                    op, lhs.ty, rhs.ty
                ),
                span,
            ))
        }
    }

    /// Wrap a Bool expression in a primitive `!`
    fn negate(&self, value: mir::Expr, op_span: Span) -> Result<mir::Expr> {
        if value.ty != Type::Bool {
            return Err(CompileError::invalid_type(
                format!("invalid type '{}' for operator '!'", value.ty),
                op_span,
            ));
        }
        let span = value.span;
        Ok(unary(mir::UnOp::Not, value, Type::Bool, span))
    }

    // ------------------------------------------------------------------
    // Calls and overload resolution
    // ------------------------------------------------------------------

    fn check_call(
        &mut self,
        callee: &Spanned<String>,
        args: &[Spanned<ast::Expr>],
        span: Span,
    ) -> Result<mir::Expr> {
        let args: Vec<mir::Expr> = args
            .iter()
            .map(|a| self.check_expr(a))
            .collect::<Result<_>>()?;
        let arg_types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();

        // User function templates, innermost scope first
        if let Some(proto) = self.resolve_user_call(&callee.node, &arg_types, callee.span)? {
            let ty = proto.ret.clone();
            return Ok(mir::Expr {
                kind: mir::ExprKind::Call {
                    callee: proto,
                    args,
                },
                ty,
                span,
            });
        }

        // Extern prototypes
        let externs = self.symbols.externs(&callee.node);
        if !externs.is_empty() {
            let mut arity_matched = false;
            for proto in &externs {
                if proto.params.len() != arg_types.len() {
                    continue;
                }
                arity_matched = true;
                let matches_all = proto
                    .params
                    .iter()
                    .zip(&arg_types)
                    .all(|((_, declared), actual)| types_match(declared, actual));
                if matches_all {
                    self.record_used_extern(proto);
                    let ty = proto.ret.clone();
                    return Ok(mir::Expr {
                        kind: mir::ExprKind::Call {
                            callee: proto.clone(),
                            args,
                        },
                        ty,
                        span,
                    });
                }
            }
            if !arity_matched {
                return Err(CompileError::argument_mismatch(format!(
                    "wrong number of arguments to '{}': expected {}, got {}",
                    callee.node,
                    externs[0].params.len(),
                    arg_types.len()
                )));
            }
            let expected: Vec<String> = externs
                .iter()
                .filter(|p| p.params.len() == arg_types.len())
                .map(|p| {
                    let tys: Vec<String> = p.params.iter().map(|(_, t)| t.to_string()).collect();
                    format!("({})", tys.join(", "))
                })
                .collect();
            return Err(CompileError::no_matching_function(
                format!(
                    "extern function '{}' expects {} but was called with ({})",
                    callee.node,
                    expected.join(" or "),
                    type_list(&arg_types)
                ),
                span,
            ));
        }

        Err(CompileError::no_matching_function(
            format!(
                "no matching function for call to '{}' with argument types ({})",
                callee.node,
                type_list(&arg_types)
            ),
            span,
        ))
    }

    /// Find the first visible template matching by arity and declared
    /// parameter types, and monomorphize it for the argument types.
    fn resolve_user_call(
        &mut self,
        name: &str,
        arg_types: &[Type],
        call_span: Span,
    ) -> Result<Option<Rc<mir::Prototype>>> {
        let candidates = self.symbols.functions(name);
        for decl in candidates {
            if decl.proto.params.len() != arg_types.len() {
                continue;
            }
            let matches_all = decl
                .proto
                .params
                .iter()
                .zip(arg_types)
                .all(|(param, actual)| match &param.ty {
                    Some(name) => match Type::from_name(&name.node) {
                        Some(declared) => types_match(&declared, actual),
                        None => false,
                    },
                    None => true,
                });
            if matches_all {
                let proto = self.instantiate(&decl, arg_types.to_vec(), call_span)?;
                return Ok(Some(proto));
            }
        }
        Ok(None)
    }

    /// Monomorphize a template for one concrete argument-type vector.
    ///
    /// The scope stack is popped to the global scope for the duration so
    /// the caller's variables cannot leak into the instantiated body.
    fn instantiate(
        &mut self,
        decl: &Rc<FnDecl>,
        arg_types: Vec<Type>,
        call_span: Span,
    ) -> Result<Rc<mir::Prototype>> {
        let name = decl.proto.name.node.clone();
        let key: InstantiationKey = (name.clone(), arg_types.clone());

        if let Some(done) = self.instantiated.get(&key) {
            return Ok(done.proto.clone());
        }
        if let Some(pending) = self.in_progress.get(&key) {
            return match pending {
                Some(proto) => Ok(proto.clone()),
                None => Err(CompileError::invalid_type(
                    format!("recursive call to '{name}' requires a declared return type"),
                    call_span,
                )),
            };
        }

        let params: Vec<(String, Type)> = decl
            .proto
            .params
            .iter()
            .zip(&arg_types)
            .map(|(param, ty)| (param.name.node.clone(), self.param_type(param, ty)))
            .collect();

        let declared_ret = match &decl.proto.ret_ty {
            Some(ret) => Some(self.resolve_type_name(ret)?),
            None => None,
        };

        // A declared return type is registered up front so recursive calls
        // resolve against it.
        let pre_proto = declared_ret.clone().map(|ret| {
            Rc::new(mir::Prototype {
                name: name.clone(),
                params: params.clone(),
                ret,
                is_extern: false,
            })
        });
        self.in_progress.insert(key.clone(), pre_proto.clone());

        let saved = self.symbols.detach_local_scopes();
        self.symbols.push_scope();
        let mut body_result: Result<Vec<mir::Stmt>> = params
            .iter()
            .map(|(pname, ty)| {
                self.symbols
                    .define_variable(pname, ty.clone(), decl.proto.name.span)
            })
            .collect::<Result<Vec<()>>>()
            .map(|_| Vec::new());
        if body_result.is_ok() {
            self.return_types.push(Vec::new());
            body_result = decl.body.iter().map(|s| self.check_stmt(s)).collect();
        } else {
            self.return_types.push(Vec::new());
        }
        let returns = self.return_types.pop().expect("return frame");

        self.symbols.truncate_to_global();
        self.symbols.restore_local_scopes(saved);
        self.in_progress.remove(&key);
        let body = body_result?;

        let ret = match &declared_ret {
            Some(declared) => {
                for (observed, span) in &returns {
                    if observed != declared {
                        return Err(CompileError::mismatching_types(
                            format!(
                                "function '{name}' is declared to return '{declared}' but returns '{observed}'"
                            ),
                            *span,
                        ));
                    }
                }
                declared.clone()
            }
            None => match returns.split_first() {
                Some(((first, _), rest)) => {
                    for (observed, span) in rest {
                        if observed != first {
                            return Err(CompileError::mismatching_types(
                                format!(
                                    "function '{name}' returns both '{first}' and '{observed}'"
                                ),
                                *span,
                            ));
                        }
                    }
                    first.clone()
                }
                None => Type::Void,
            },
        };

        let proto = match pre_proto {
            Some(proto) => proto,
            None => Rc::new(mir::Prototype {
                name,
                params,
                ret,
                is_extern: false,
            }),
        };
        let function = Rc::new(mir::Function {
            proto: proto.clone(),
            body,
        });
        self.instantiated.insert(key, function.clone());
        self.finished.push(function);
        Ok(proto)
    }

    /// A declared parameter keeps its declared type (which the match step
    /// verified); an undeclared one takes the argument type.
    fn param_type(&self, param: &Param, arg: &Type) -> Type {
        param
            .ty
            .as_ref()
            .and_then(|name| Type::from_name(&name.node))
            .unwrap_or_else(|| arg.clone())
    }

    fn record_used_extern(&mut self, proto: &Rc<mir::Prototype>) {
        if !self.used_externs.iter().any(|p| p.name == proto.name) {
            self.used_externs.push(proto.clone());
        }
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------

/// Does an argument satisfy a declared parameter type? `null` satisfies any
/// pointer-shaped parameter.
fn types_match(declared: &Type, actual: &Type) -> bool {
    declared == actual
        || (*actual == Type::Null && matches!(declared, Type::String | Type::Pointer(_)))
}

/// The primitive-operator domain: Int, Float and Bool
fn is_primitive(ty: &Type) -> bool {
    matches!(ty, Type::Int64 | Type::Float64 | Type::Bool)
}

fn type_list(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn literal(kind: mir::ExprKind, ty: Type, span: Span) -> mir::Expr {
    mir::Expr { kind, ty, span }
}

fn unary(op: mir::UnOp, operand: mir::Expr, ty: Type, span: Span) -> mir::Expr {
    mir::Expr {
        kind: mir::ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        ty,
        span,
    }
}

fn binary(op: mir::BinOp, lhs: mir::Expr, rhs: mir::Expr, ty: Type, span: Span) -> mir::Expr {
    mir::Expr {
        kind: mir::ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        ty,
        span,
    }
}
