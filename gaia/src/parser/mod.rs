//! Parser: token stream to AST
//!
//! Recursive descent over the token vector. The cursor index doubles as the
//! pushback buffer: disambiguating statement-form from expression-form `if`
//! scans ahead without consuming and rewinds by restoring the index.

#[cfg(test)]
mod tests;

use crate::ast::{
    BinOp, Expr, FnDecl, Item, Param, Program, Prototype, Span, Spanned, Stmt, UnOp,
};
use crate::error::{CompileError, Result};
use crate::lexer::Token;

/// Stack headroom for deeply nested expressions
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Parse one source file
pub fn parse(tokens: Vec<(Token, Span)>) -> Result<Program> {
    Parser::new(&tokens).parse_program()
}

struct Parser<'a> {
    tokens: &'a [(Token, Span)],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [(Token, Span)]) -> Self {
        Parser { tokens, pos: 0 }
    }

    // ------------------------------------------------------------------
    // Cursor primitives
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|(_, s)| *s)
            .unwrap_or_else(|| {
                self.tokens
                    .last()
                    .map(|(_, s)| Span::new(s.end, s.end))
                    .unwrap_or_else(Span::dummy)
            })
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(t) => format!("'{t}'"),
            None => "end of input".to_string(),
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<Span> {
        match self.peek() {
            Some(t) if t == expected => Ok(self.advance().unwrap().1),
            _ => Err(CompileError::unexpected_token(format!(
                "expected {what}, found {}",
                self.found()
            ))),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<Spanned<String>> {
        match self.peek() {
            Some(Token::Ident(_)) => {
                let (tok, span) = self.advance().unwrap();
                let Token::Ident(name) = tok else { unreachable!() };
                Ok(Spanned::new(name, span))
            }
            _ => Err(CompileError::unexpected_token(format!(
                "expected {what}, found {}",
                self.found()
            ))),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Some(Token::Newline)) {
            self.pos += 1;
        }
    }

    /// A statement ends at a newline, a closing brace, or end of input
    fn expect_terminator(&mut self) -> Result<()> {
        match self.peek() {
            Some(Token::Newline) => {
                self.skip_newlines();
                Ok(())
            }
            Some(Token::RBrace) | None => Ok(()),
            _ => Err(CompileError::unexpected_token(format!(
                "expected newline, found {}",
                self.found()
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Top level
    // ------------------------------------------------------------------

    fn parse_program(&mut self) -> Result<Program> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            let Some(token) = self.peek() else { break };
            let item = match token {
                Token::Function => Item::Function(self.parse_function()?),
                Token::Extern => Item::Extern(self.parse_extern()?),
                _ => Item::Stmt(self.parse_stmt()?),
            };
            self.expect_terminator()?;
            items.push(item);
        }
        Ok(Program { items })
    }

    fn parse_function(&mut self) -> Result<FnDecl> {
        let start = self.expect(&Token::Function, "'function'")?;
        let proto = self.parse_prototype(false)?;
        let body = self.parse_block()?;
        let end = self.tokens[self.pos - 1].1;
        Ok(FnDecl {
            proto,
            body,
            span: start.to(end),
        })
    }

    fn parse_extern(&mut self) -> Result<Prototype> {
        self.expect(&Token::Extern, "'extern'")?;
        self.expect(&Token::Function, "'function'")?;
        self.parse_prototype(true)
    }

    /// The overloadable operator symbols, or an error for other operator tokens
    fn operator_name(token: &Token) -> Option<std::result::Result<&'static str, ()>> {
        let name = match token {
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Not => "!",
            Token::Gt | Token::GtEq | Token::Assign => return Some(Err(())),
            _ => return None,
        };
        Some(Ok(name))
    }

    fn parse_prototype(&mut self, is_extern: bool) -> Result<Prototype> {
        let name = match self.peek() {
            Some(Token::Ident(_)) => self.expect_ident("function name")?,
            Some(token) => match Self::operator_name(token) {
                Some(Ok(symbol)) => {
                    let span = self.advance().unwrap().1;
                    Spanned::new(symbol.to_string(), span)
                }
                Some(Err(())) => {
                    return Err(CompileError::unexpected_token(format!(
                        "operator {} is not overloadable",
                        self.found()
                    )));
                }
                None => {
                    return Err(CompileError::unexpected_token(format!(
                        "expected function name, found {}",
                        self.found()
                    )));
                }
            },
            None => {
                return Err(CompileError::unexpected_token(
                    "expected function name, found end of input",
                ));
            }
        };

        self.expect(&Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen)) {
            loop {
                let pname = self.expect_ident("parameter name")?;
                let ty = if matches!(self.peek(), Some(Token::Colon)) {
                    self.advance();
                    Some(self.expect_ident("type name")?)
                } else {
                    None
                };
                params.push(Param { name: pname, ty });
                match self.peek() {
                    Some(Token::Comma) => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;

        let ret_ty = if matches!(self.peek(), Some(Token::Arrow)) {
            self.advance();
            Some(self.expect_ident("return type name")?)
        } else {
            None
        };

        self.check_operator_arity(&name, params.len())?;

        Ok(Prototype {
            name,
            params,
            ret_ty,
            is_extern,
        })
    }

    /// Operator overloads must match the operator's arity: `!` is unary,
    /// `+`/`-` are unary or binary, everything else is binary.
    fn check_operator_arity(&self, name: &Spanned<String>, arity: usize) -> Result<()> {
        let ok = match name.node.as_str() {
            "!" => arity == 1,
            "+" | "-" => arity == 1 || arity == 2,
            "==" | "!=" | "<" | "<=" | "*" | "/" => arity == 2,
            _ => return Ok(()),
        };
        if ok {
            Ok(())
        } else {
            Err(CompileError::invalid_parameter_count(
                format!(
                    "invalid number of parameters for operator '{}': got {}",
                    name.node, arity
                ),
                name.span,
            ))
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                Some(Token::RBrace) => {
                    self.advance();
                    return Ok(stmts);
                }
                Some(_) => {
                    stmts.push(self.parse_stmt()?);
                    // Statements are newline-separated; the closing brace may
                    // share the last statement's line.
                    match self.peek() {
                        Some(Token::Newline) => self.skip_newlines(),
                        Some(Token::RBrace) => {}
                        _ => {
                            return Err(CompileError::unexpected_token(format!(
                                "expected newline or '}}', found {}",
                                self.found()
                            )));
                        }
                    }
                }
                None => {
                    return Err(CompileError::unexpected_token(
                        "expected '}', found end of input",
                    ));
                }
            }
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            Some(Token::Return) => {
                let span = self.advance().unwrap().1;
                let value = match self.peek() {
                    Some(Token::Newline) | Some(Token::RBrace) | None => None,
                    _ => Some(self.parse_expr()?),
                };
                Ok(Stmt::Return { value, span })
            }
            Some(Token::If) if self.if_is_statement() => self.parse_if_stmt(),
            Some(Token::Ident(_)) if matches!(self.peek_second(), Some(Token::Assign)) => {
                let name = self.expect_ident("variable name")?;
                self.expect(&Token::Assign, "'='")?;
                let value = self.parse_expr()?;
                Ok(Stmt::VarDef { name, value })
            }
            Some(_) => Ok(Stmt::Expr(self.parse_expr()?)),
            None => Err(CompileError::unexpected_token(
                "expected statement, found end of input",
            )),
        }
    }

    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    /// Decide between statement-form and expression-form `if` by scanning
    /// ahead without consuming: `then` before a newline means expression
    /// form, a newline or `{` means statement form.
    fn if_is_statement(&self) -> bool {
        for (token, _) in &self.tokens[self.pos + 1..] {
            match token {
                Token::Then => return false,
                Token::Newline | Token::LBrace => return true,
                _ => {}
            }
        }
        true
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        self.expect(&Token::If, "'if'")?;
        let cond = self.parse_expr()?;
        let then_block = self.parse_block()?;
        self.expect(&Token::Else, "'else'")?;
        let else_block = self.parse_block()?;
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr(&mut self) -> Result<Spanned<Expr>> {
        let lhs = self.parse_unary()?;
        self.parse_binary_rhs(0, lhs)
    }

    fn peek_binop(&self) -> Option<(BinOp, Span)> {
        let op = match self.peek()? {
            Token::Assign => BinOp::Assign,
            Token::EqEq => BinOp::Eq,
            Token::NotEq => BinOp::Ne,
            Token::Lt => BinOp::Lt,
            Token::LtEq => BinOp::Le,
            Token::Gt => BinOp::Gt,
            Token::GtEq => BinOp::Ge,
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Star => BinOp::Mul,
            Token::Slash => BinOp::Div,
            _ => return None,
        };
        Some((op, self.peek_span()))
    }

    /// Precedence climbing; the right-hand side absorbs the next operator
    /// only when it binds strictly tighter, which makes every operator
    /// left-associative.
    fn parse_binary_rhs(
        &mut self,
        min_prec: u8,
        mut lhs: Spanned<Expr>,
    ) -> Result<Spanned<Expr>> {
        loop {
            let Some((op, op_span)) = self.peek_binop() else {
                return Ok(lhs);
            };
            let prec = op.precedence();
            if prec < min_prec {
                return Ok(lhs);
            }
            self.advance();

            let mut rhs = self.parse_unary()?;
            if let Some((next_op, _)) = self.peek_binop()
                && prec < next_op.precedence()
            {
                rhs = self.parse_binary_rhs(prec + 1, rhs)?;
            }

            let span = lhs.span.to(rhs.span);
            lhs = Spanned::new(
                Expr::Binary {
                    op,
                    op_span,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
    }

    fn parse_unary(&mut self) -> Result<Spanned<Expr>> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            let op = match self.peek() {
                Some(Token::Not) => Some(UnOp::Not),
                Some(Token::Plus) => Some(UnOp::Plus),
                Some(Token::Minus) => Some(UnOp::Neg),
                _ => None,
            };
            if let Some(op) = op {
                let op_span = self.advance().unwrap().1;
                let operand = self.parse_unary()?;
                let span = op_span.to(operand.span);
                return Ok(Spanned::new(
                    Expr::Unary {
                        op,
                        op_span,
                        operand: Box::new(operand),
                    },
                    span,
                ));
            }
            self.parse_primary()
        })
    }

    fn parse_primary(&mut self) -> Result<Spanned<Expr>> {
        match self.peek() {
            Some(Token::IntLit(_)) => {
                let (tok, span) = self.advance().unwrap();
                let Token::IntLit(n) = tok else { unreachable!() };
                Ok(Spanned::new(Expr::IntLit(n), span))
            }
            Some(Token::FloatLit(_)) => {
                let (tok, span) = self.advance().unwrap();
                let Token::FloatLit(x) = tok else { unreachable!() };
                Ok(Spanned::new(Expr::FloatLit(x), span))
            }
            Some(Token::True) => {
                let span = self.advance().unwrap().1;
                Ok(Spanned::new(Expr::BoolLit(true), span))
            }
            Some(Token::False) => {
                let span = self.advance().unwrap().1;
                Ok(Spanned::new(Expr::BoolLit(false), span))
            }
            Some(Token::StringLit(_)) => {
                let (tok, span) = self.advance().unwrap();
                let Token::StringLit(s) = tok else { unreachable!() };
                Ok(Spanned::new(Expr::StringLit(s), span))
            }
            Some(Token::Null) => {
                let span = self.advance().unwrap().1;
                Ok(Spanned::new(Expr::NullLit, span))
            }
            Some(Token::Ident(_)) => {
                let name = self.expect_ident("identifier")?;
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.parse_call(name)
                } else {
                    let span = name.span;
                    Ok(Spanned::new(Expr::Var(name.node), span))
                }
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::If) => self.parse_if_expr(),
            _ => Err(CompileError::unexpected_token(format!(
                "expected expression, found {}",
                self.found()
            ))),
        }
    }

    fn parse_call(&mut self, callee: Spanned<String>) -> Result<Spanned<Expr>> {
        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen)) {
            loop {
                args.push(self.parse_expr()?);
                match self.peek() {
                    Some(Token::Comma) => {
                        self.advance();
                    }
                    _ => break,
                }
            }
        }
        let end = self.expect(&Token::RParen, "')'")?;
        let span = callee.span.to(end);
        Ok(Spanned::new(Expr::Call { callee, args }, span))
    }

    /// `if cond then a else b` — both branches on one line, yields a value
    fn parse_if_expr(&mut self) -> Result<Spanned<Expr>> {
        let start = self.expect(&Token::If, "'if'")?;
        let cond = self.parse_expr()?;
        self.expect(&Token::Then, "'then'")?;
        let then_val = self.parse_expr()?;
        self.expect(&Token::Else, "'else'")?;
        let else_val = self.parse_expr()?;
        let span = start.to(else_val.span);
        Ok(Spanned::new(
            Expr::If {
                cond: Box::new(cond),
                then_val: Box::new(then_val),
                else_val: Box::new(else_val),
            },
            span,
        ))
    }
}
