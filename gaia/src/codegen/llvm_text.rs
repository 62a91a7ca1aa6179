//! Text-based LLVM IR generation
//!
//! Every monomorphized function is emitted exactly once under its mangled
//! symbol. Parameters get a stack slot in the entry block (store on entry,
//! load at each use) so the promote-memory-to-register pass sees a uniform
//! surface. `if` expressions lower to three blocks plus a `phi`; `if`
//! statements lower the same way without the `phi`.

use std::collections::HashMap;
use std::fmt::Write;
use thiserror::Error;

use crate::ast::Type;
use crate::mir;

/// Code generation error
#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type CodeGenResult<T> = Result<T, CodeGenError>;

/// Text-based LLVM IR generator
pub struct TextCodeGen {
    module_name: String,
    target_triple: String,
}

impl TextCodeGen {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            target_triple: Self::default_target_triple(),
        }
    }

    /// Create with a custom target triple
    pub fn with_target(module_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            target_triple: target.into(),
        }
    }

    fn default_target_triple() -> String {
        #[cfg(target_os = "linux")]
        {
            "x86_64-unknown-linux-gnu".to_string()
        }
        #[cfg(target_os = "macos")]
        {
            "x86_64-apple-darwin".to_string()
        }
        #[cfg(target_os = "windows")]
        {
            "x86_64-pc-windows-msvc".to_string()
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            "x86_64-unknown-linux-gnu".to_string()
        }
    }

    /// Generate the complete module as text
    pub fn generate(&self, program: &mir::Program) -> CodeGenResult<String> {
        let mut out = String::new();

        writeln!(out, "; ModuleID = '{}'", self.module_name)?;
        writeln!(out, "target triple = \"{}\"", self.target_triple)?;
        writeln!(out)?;

        let strings = collect_string_constants(program);
        self.emit_string_globals(&mut out, &strings)?;
        self.emit_extern_declarations(&mut out, program)?;

        for func in &program.functions {
            self.emit_function(&mut out, func, &strings)?;
        }
        self.emit_main(&mut out, &program.main_body, &strings)?;

        Ok(out)
    }

    fn emit_string_globals(
        &self,
        out: &mut String,
        strings: &HashMap<String, String>,
    ) -> CodeGenResult<()> {
        if strings.is_empty() {
            return Ok(());
        }
        writeln!(out, "; String constants")?;
        for (content, name) in strings {
            let escaped = escape_string_for_llvm(content);
            let len = content.len() + 1;
            writeln!(
                out,
                "@{} = private unnamed_addr constant [{} x i8] c\"{}\\00\"",
                name, len, escaped
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn emit_extern_declarations(
        &self,
        out: &mut String,
        program: &mir::Program,
    ) -> CodeGenResult<()> {
        if program.externs.is_empty() {
            return Ok(());
        }
        writeln!(out, "; External declarations")?;
        for proto in &program.externs {
            let params: Vec<&str> = proto.params.iter().map(|(_, t)| t.llvm_name()).collect();
            writeln!(
                out,
                "declare {} @{}({})",
                proto.ret.llvm_name(),
                proto.name,
                params.join(", ")
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn emit_function(
        &self,
        out: &mut String,
        func: &mir::Function,
        strings: &HashMap<String, String>,
    ) -> CodeGenResult<()> {
        let proto = &func.proto;
        let params: Vec<String> = proto
            .params
            .iter()
            .map(|(name, ty)| format!("{} %{}", ty.llvm_name(), name))
            .collect();
        writeln!(
            out,
            "define {} @{}({}) nounwind {{",
            proto.ret.llvm_name(),
            proto.symbol(),
            params.join(", ")
        )?;

        let mut emitter = FunctionEmitter::new(strings, false);
        writeln!(emitter.out, "entry:")?;
        for (name, ty) in &proto.params {
            let slot = emitter.new_slot(name, ty.clone());
            writeln!(emitter.out, "  %{} = alloca {}", slot, ty.llvm_name())?;
            writeln!(
                emitter.out,
                "  store {} %{}, ptr %{}",
                ty.llvm_name(),
                name,
                slot
            )?;
        }
        emitter.emit_stmts(&func.body)?;
        if !emitter.terminated {
            if proto.ret == Type::Void {
                writeln!(emitter.out, "  ret void")?;
            } else {
                // Only reachable when every path through the body returned
                writeln!(emitter.out, "  unreachable")?;
            }
        }

        out.push_str(&emitter.out);
        writeln!(out, "}}")?;
        writeln!(out)?;
        Ok(())
    }

    /// `main` holds the top-level statements and always returns i32
    fn emit_main(
        &self,
        out: &mut String,
        body: &[mir::Stmt],
        strings: &HashMap<String, String>,
    ) -> CodeGenResult<()> {
        writeln!(out, "define i32 @main() {{")?;
        let mut emitter = FunctionEmitter::new(strings, true);
        writeln!(emitter.out, "entry:")?;
        emitter.emit_stmts(body)?;
        if !emitter.terminated {
            writeln!(emitter.out, "  ret i32 0")?;
        }
        out.push_str(&emitter.out);
        writeln!(out, "}}")?;
        Ok(())
    }
}

/// Per-function emission state
struct FunctionEmitter<'a> {
    strings: &'a HashMap<String, String>,
    out: String,
    /// Temporary value counter (%t0, %t1, ...)
    tmp: usize,
    /// Basic-block label counter
    label: usize,
    /// Stack slots by source name, one map per scope
    slots: Vec<HashMap<String, Slot>>,
    /// Disambiguates slots when inner scopes reuse a name
    slot_seq: HashMap<String, usize>,
    current_label: String,
    /// The current block already has a terminator
    terminated: bool,
    is_main: bool,
}

#[derive(Clone)]
struct Slot {
    name: String,
    ty: Type,
}

impl<'a> FunctionEmitter<'a> {
    fn new(strings: &'a HashMap<String, String>, is_main: bool) -> Self {
        FunctionEmitter {
            strings,
            out: String::new(),
            tmp: 0,
            label: 0,
            slots: vec![HashMap::new()],
            slot_seq: HashMap::new(),
            current_label: "entry".to_string(),
            terminated: false,
            is_main,
        }
    }

    fn fresh_tmp(&mut self) -> String {
        let name = format!("t{}", self.tmp);
        self.tmp += 1;
        name
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let label = format!("{}{}", prefix, self.label);
        self.label += 1;
        label
    }

    /// Emit a block label and reset the terminator flag
    fn start_block(&mut self, label: &str) -> CodeGenResult<()> {
        writeln!(self.out, "{label}:")?;
        self.current_label = label.to_string();
        self.terminated = false;
        Ok(())
    }

    fn push_scope(&mut self) {
        self.slots.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.slots.pop();
    }

    /// Allocate a slot name for a variable and register it in the current
    /// scope
    fn new_slot(&mut self, name: &str, ty: Type) -> String {
        let seq = self.slot_seq.entry(name.to_string()).or_insert(0);
        *seq += 1;
        let slot = if *seq == 1 {
            format!("{name}.addr")
        } else {
            format!("{}.addr{}", name, *seq - 1)
        };
        self.slots
            .last_mut()
            .expect("at least one scope")
            .insert(name.to_string(), Slot { name: slot.clone(), ty });
        slot
    }

    fn lookup_slot(&self, name: &str) -> Option<Slot> {
        self.slots
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
    }

    fn emit_stmts(&mut self, stmts: &[mir::Stmt]) -> CodeGenResult<()> {
        for stmt in stmts {
            if self.terminated {
                break;
            }
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &mir::Stmt) -> CodeGenResult<()> {
        match stmt {
            mir::Stmt::Expr(expr) => {
                self.emit_expr(expr)?;
                Ok(())
            }

            mir::Stmt::VarDef { name, value } => {
                let v = self.emit_expr(value)?;
                let ty = value.ty.llvm_name();
                let slot = self.new_slot(name, value.ty.clone());
                writeln!(self.out, "  %{slot} = alloca {ty}")?;
                writeln!(self.out, "  store {ty} {v}, ptr %{slot}")?;
                Ok(())
            }

            mir::Stmt::Return(value) => self.emit_return(value),

            mir::Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                let c = self.emit_expr(cond)?;
                let then_label = self.fresh_label("then");
                let else_label = self.fresh_label("else");
                let cont_label = self.fresh_label("ifcont");
                writeln!(
                    self.out,
                    "  br i1 {c}, label %{then_label}, label %{else_label}"
                )?;

                self.start_block(&then_label)?;
                self.push_scope();
                self.emit_stmts(then_block)?;
                self.pop_scope();
                if !self.terminated {
                    writeln!(self.out, "  br label %{cont_label}")?;
                }

                self.start_block(&else_label)?;
                self.push_scope();
                self.emit_stmts(else_block)?;
                self.pop_scope();
                if !self.terminated {
                    writeln!(self.out, "  br label %{cont_label}")?;
                }

                self.start_block(&cont_label)
            }
        }
    }

    fn emit_return(&mut self, value: &Option<mir::Expr>) -> CodeGenResult<()> {
        if self.is_main {
            // Top-level returns feed the process exit status
            match value {
                None => writeln!(self.out, "  ret i32 0")?,
                Some(expr) => {
                    let v = self.emit_expr(expr)?;
                    match expr.ty {
                        Type::Int32 => writeln!(self.out, "  ret i32 {v}")?,
                        Type::Int64 => {
                            let t = self.fresh_tmp();
                            writeln!(self.out, "  %{t} = trunc i64 {v} to i32")?;
                            writeln!(self.out, "  ret i32 %{t}")?;
                        }
                        Type::Bool => {
                            let t = self.fresh_tmp();
                            writeln!(self.out, "  %{t} = zext i1 {v} to i32")?;
                            writeln!(self.out, "  ret i32 %{t}")?;
                        }
                        _ => writeln!(self.out, "  ret i32 0")?,
                    }
                }
            }
        } else {
            match value {
                None => writeln!(self.out, "  ret void")?,
                Some(expr) if expr.ty == Type::Void => {
                    self.emit_expr(expr)?;
                    writeln!(self.out, "  ret void")?;
                }
                Some(expr) => {
                    let v = self.emit_expr(expr)?;
                    writeln!(self.out, "  ret {} {}", expr.ty.llvm_name(), v)?;
                }
            }
        }
        self.terminated = true;
        Ok(())
    }

    /// Emit an expression and return the value reference (an immediate, a
    /// global, or a %temporary)
    fn emit_expr(&mut self, expr: &mir::Expr) -> CodeGenResult<String> {
        match &expr.kind {
            mir::ExprKind::Int(n) => Ok(n.to_string()),
            // Hexadecimal bit pattern: exact for every f64
            mir::ExprKind::Float(x) => Ok(format!("0x{:016X}", x.to_bits())),
            mir::ExprKind::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
            mir::ExprKind::Null => Ok("null".to_string()),
            mir::ExprKind::Str(s) => {
                let global = self
                    .strings
                    .get(s)
                    .ok_or_else(|| CodeGenError::UnknownVariable(format!("string {s:?}")))?;
                Ok(format!("@{global}"))
            }

            mir::ExprKind::Var(name) => {
                let slot = self
                    .lookup_slot(name)
                    .ok_or_else(|| CodeGenError::UnknownVariable(name.clone()))?;
                let t = self.fresh_tmp();
                writeln!(
                    self.out,
                    "  %{} = load {}, ptr %{}",
                    t,
                    slot.ty.llvm_name(),
                    slot.name
                )?;
                Ok(format!("%{t}"))
            }

            mir::ExprKind::Unary { op, operand } => {
                let v = self.emit_expr(operand)?;
                match op {
                    mir::UnOp::Plus => Ok(v),
                    mir::UnOp::Neg => {
                        let t = self.fresh_tmp();
                        if operand.ty.is_float() {
                            writeln!(self.out, "  %{t} = fsub double 0.0, {v}")?;
                        } else {
                            writeln!(self.out, "  %{t} = sub i64 0, {v}")?;
                        }
                        Ok(format!("%{t}"))
                    }
                    mir::UnOp::Not => {
                        let t = self.fresh_tmp();
                        writeln!(self.out, "  %{t} = xor i1 {v}, true")?;
                        Ok(format!("%{t}"))
                    }
                }
            }

            mir::ExprKind::Binary { op, lhs, rhs } => {
                let a = self.emit_expr(lhs)?;
                let b = self.emit_expr(rhs)?;
                let operand_ty = lhs.ty.llvm_name();
                // Signed integer instructions, unordered float relations,
                // ordered float equality
                let inst = match (op, lhs.ty.is_float()) {
                    (mir::BinOp::Add, false) => "add",
                    (mir::BinOp::Add, true) => "fadd",
                    (mir::BinOp::Sub, false) => "sub",
                    (mir::BinOp::Sub, true) => "fsub",
                    (mir::BinOp::Mul, false) => "mul",
                    (mir::BinOp::Mul, true) => "fmul",
                    (mir::BinOp::Div, false) => "sdiv",
                    (mir::BinOp::Div, true) => "fdiv",
                    (mir::BinOp::Eq, false) => "icmp eq",
                    (mir::BinOp::Eq, true) => "fcmp oeq",
                    (mir::BinOp::Lt, false) => "icmp slt",
                    (mir::BinOp::Lt, true) => "fcmp ult",
                };
                let t = self.fresh_tmp();
                writeln!(self.out, "  %{t} = {inst} {operand_ty} {a}, {b}")?;
                Ok(format!("%{t}"))
            }

            mir::ExprKind::Call { callee, args } => {
                let mut operands = Vec::with_capacity(args.len());
                for (arg, (_, param_ty)) in args.iter().zip(&callee.params) {
                    let v = self.emit_expr(arg)?;
                    operands.push(format!("{} {}", param_ty.llvm_name(), v));
                }
                let joined = operands.join(", ");
                if callee.ret == Type::Void {
                    writeln!(self.out, "  call void @{}({})", callee.symbol(), joined)?;
                    Ok("void".to_string())
                } else {
                    let t = self.fresh_tmp();
                    writeln!(
                        self.out,
                        "  %{} = call {} @{}({})",
                        t,
                        callee.ret.llvm_name(),
                        callee.symbol(),
                        joined
                    )?;
                    Ok(format!("%{t}"))
                }
            }

            mir::ExprKind::If {
                cond,
                then_val,
                else_val,
            } => {
                let c = self.emit_expr(cond)?;
                let then_label = self.fresh_label("then");
                let else_label = self.fresh_label("else");
                let cont_label = self.fresh_label("ifcont");
                writeln!(
                    self.out,
                    "  br i1 {c}, label %{then_label}, label %{else_label}"
                )?;

                self.start_block(&then_label)?;
                let tv = self.emit_expr(then_val)?;
                // Nested conditionals move the insertion block; the phi
                // needs the block the value actually arrives from.
                let then_end = self.current_label.clone();
                writeln!(self.out, "  br label %{cont_label}")?;

                self.start_block(&else_label)?;
                let ev = self.emit_expr(else_val)?;
                let else_end = self.current_label.clone();
                writeln!(self.out, "  br label %{cont_label}")?;

                self.start_block(&cont_label)?;
                if expr.ty == Type::Void {
                    Ok("void".to_string())
                } else {
                    let t = self.fresh_tmp();
                    writeln!(
                        self.out,
                        "  %{} = phi {} [ {}, %{} ], [ {}, %{} ]",
                        t,
                        expr.ty.llvm_name(),
                        tv,
                        then_end,
                        ev,
                        else_end
                    )?;
                    Ok(format!("%{t}"))
                }
            }
        }
    }
}

/// Collect every string literal in the program into a global table
fn collect_string_constants(program: &mir::Program) -> HashMap<String, String> {
    let mut table = HashMap::new();
    let mut counter = 0usize;
    for func in &program.functions {
        for stmt in &func.body {
            collect_stmt(stmt, &mut table, &mut counter);
        }
    }
    for stmt in &program.main_body {
        collect_stmt(stmt, &mut table, &mut counter);
    }
    table
}

fn collect_stmt(stmt: &mir::Stmt, table: &mut HashMap<String, String>, counter: &mut usize) {
    match stmt {
        mir::Stmt::Expr(e) => collect_expr(e, table, counter),
        mir::Stmt::VarDef { value, .. } => collect_expr(value, table, counter),
        mir::Stmt::Return(Some(e)) => collect_expr(e, table, counter),
        mir::Stmt::Return(None) => {}
        mir::Stmt::If {
            cond,
            then_block,
            else_block,
        } => {
            collect_expr(cond, table, counter);
            for s in then_block.iter().chain(else_block) {
                collect_stmt(s, table, counter);
            }
        }
    }
}

fn collect_expr(expr: &mir::Expr, table: &mut HashMap<String, String>, counter: &mut usize) {
    match &expr.kind {
        mir::ExprKind::Str(s) => {
            if !table.contains_key(s) {
                table.insert(s.clone(), format!(".str.{counter}"));
                *counter += 1;
            }
        }
        mir::ExprKind::Unary { operand, .. } => collect_expr(operand, table, counter),
        mir::ExprKind::Binary { lhs, rhs, .. } => {
            collect_expr(lhs, table, counter);
            collect_expr(rhs, table, counter);
        }
        mir::ExprKind::Call { args, .. } => {
            for arg in args {
                collect_expr(arg, table, counter);
            }
        }
        mir::ExprKind::If {
            cond,
            then_val,
            else_val,
        } => {
            collect_expr(cond, table, counter);
            collect_expr(then_val, table, counter);
            collect_expr(else_val, table, counter);
        }
        _ => {}
    }
}

/// Escape a string for an LLVM IR constant
fn escape_string_for_llvm(s: &str) -> String {
    let mut result = String::new();
    for c in s.bytes() {
        match c {
            0x20..=0x21 | 0x23..=0x5B | 0x5D..=0x7E => result.push(c as char),
            0x5C => result.push_str("\\5C"),
            0x22 => result.push_str("\\22"),
            _ => result.push_str(&format!("\\{c:02X}")),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::types::TypeChecker;

    fn compile(source: &str) -> String {
        let tokens = tokenize(source).expect("tokenize");
        let program = parse(tokens).expect("parse");
        let mut checker = TypeChecker::new();
        checker.check_file(&program).expect("check");
        TextCodeGen::new("test")
            .generate(&checker.finish())
            .expect("generate")
    }

    fn count_defines(ir: &str) -> usize {
        ir.lines().filter(|l| l.starts_with("define ")).count()
    }

    #[test]
    fn test_empty_program_has_only_main() {
        let ir = compile("");
        assert!(ir.contains("define i32 @main() {"));
        assert!(ir.contains("ret i32 0"));
        assert_eq!(count_defines(&ir), 1);
    }

    #[test]
    fn test_one_definition_per_monomorphization() {
        let ir = compile(
            "function guess(answer) {\n if answer == 42 { return 1 } else { return 0 }\n}\nguess(42)\nguess(0)",
        );
        assert_eq!(count_defines(&ir), 2);
        assert_eq!(
            ir.lines()
                .filter(|l| l.starts_with("define i64 @guess.Int"))
                .count(),
            1
        );
    }

    #[test]
    fn test_two_instantiations_get_two_definitions() {
        let ir = compile("function id(x) {\n return x\n}\nid(1)\nid(1.5)");
        assert!(ir.contains("define i64 @id.Int(i64 %x)"));
        assert!(ir.contains("define double @id.Float(double %x)"));
        assert_eq!(count_defines(&ir), 3);
    }

    #[test]
    fn test_parameter_stack_slots() {
        let ir = compile("function inc(n: Int) -> Int {\n return n + 1\n}\ninc(1)");
        assert!(ir.contains("%n.addr = alloca i64"));
        assert!(ir.contains("store i64 %n, ptr %n.addr"));
        assert!(ir.contains("load i64, ptr %n.addr"));
    }

    #[test]
    fn test_string_literal_and_extern_call() {
        let ir = compile("extern function puts(s: String) -> Int32\nputs(\"Hello, World!\")");
        assert!(ir.contains("declare i32 @puts(ptr)"));
        assert!(ir.contains("c\"Hello, World!\\00\""));
        assert!(ir.contains("call i32 @puts(ptr @.str.0)"));
    }

    #[test]
    fn test_if_expression_lowers_to_phi() {
        let ir = compile("x = if true then 666 else 777");
        assert!(ir.contains("br i1 true, label %then0, label %else1"));
        assert!(ir.contains("phi i64 [ 666, %then0 ], [ 777, %else1 ]"));
    }

    #[test]
    fn test_if_statement_has_no_phi() {
        let ir = compile("if true {\n 1\n} else {\n 2\n}");
        assert!(ir.contains("br i1 true"));
        assert!(!ir.contains("phi"));
    }

    #[test]
    fn test_integer_and_float_instructions() {
        let ir = compile("1 + 2\n1.5 * 2.5\n1 < 2\n1.5 < 2.5\n1 == 1\n1.5 == 1.5");
        assert!(ir.contains("add i64 1, 2"));
        assert!(ir.contains("fmul double"));
        assert!(ir.contains("icmp slt i64 1, 2"));
        assert!(ir.contains("fcmp ult double"));
        assert!(ir.contains("icmp eq i64 1, 1"));
        assert!(ir.contains("fcmp oeq double"));
    }

    #[test]
    fn test_float_constants_use_bit_patterns() {
        let ir = compile("x = 1.5");
        assert!(ir.contains(&format!("0x{:016X}", 1.5f64.to_bits())));
    }

    #[test]
    fn test_top_level_return_truncates_to_i32() {
        let ir = compile("return 42");
        assert!(ir.contains("trunc i64 42 to i32"));
    }

    #[test]
    fn test_void_function_returns_void() {
        let ir = compile(
            "extern function puts(s: String) -> Int32\nfunction greet(name: String) {\n puts(name)\n}\ngreet(\"hi\")",
        );
        assert!(ir.contains("define void @greet.String(ptr %name)"));
        assert!(ir.contains("call void @greet.String(ptr"));
        assert!(ir.contains("ret void"));
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(escape_string_for_llvm("a\"b\\c\nd"), "a\\22b\\5Cc\\0Ad");
    }

    #[test]
    fn test_desugared_comparison_negates_with_xor() {
        let ir = compile("1 != 2");
        assert!(ir.contains("icmp eq i64 1, 2"));
        assert!(ir.contains("xor i1"));
    }
}
