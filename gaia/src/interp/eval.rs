//! MIR evaluator

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use crate::mir;
use std::collections::HashMap;
use std::io::{BufRead, Read, Write};
use std::rc::Rc;

/// Maximum call depth before reporting a stack overflow
const MAX_RECURSION_DEPTH: usize = 10_000;

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// The interpreter
pub struct Interpreter {
    /// Monomorphized functions by mangled symbol
    functions: HashMap<String, Rc<mir::Function>>,
    /// Top-level variable bindings, shared with every function body
    globals: HashMap<String, Value>,
    /// Current call depth
    depth: usize,
}

/// Function-local scopes. Top-level statements run with no scopes, which
/// routes their bindings to the interpreter globals.
#[derive(Default)]
struct Env {
    scopes: Vec<HashMap<String, Value>>,
}

impl Env {
    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
    }
}

/// Statement outcome
enum Control {
    Continue,
    Return(Value),
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            functions: HashMap::new(),
            globals: HashMap::new(),
            depth: 0,
        }
    }

    /// Make monomorphized functions callable
    pub fn register_functions(&mut self, functions: &[Rc<mir::Function>]) {
        for func in functions {
            self.functions.insert(func.proto.symbol(), func.clone());
        }
    }

    /// Run a whole program: execute the main body and derive the exit
    /// status the emitted executable would produce.
    pub fn run(&mut self, program: &mir::Program) -> InterpResult<i32> {
        self.register_functions(&program.functions);
        let mut env = Env::default();
        for stmt in &program.main_body {
            if let Control::Return(value) = self.exec_stmt(stmt, &mut env)? {
                return Ok(match value {
                    Value::Int(n) => n as i32,
                    Value::Bool(b) => i32::from(b),
                    _ => 0,
                });
            }
        }
        Ok(0)
    }

    /// Execute one top-level statement and return the value the REPL
    /// should echo, if any.
    pub fn eval_repl_stmt(&mut self, stmt: &mir::Stmt) -> InterpResult<Option<Value>> {
        let mut env = Env::default();
        match stmt {
            mir::Stmt::Expr(expr) => {
                let value = self.eval_expr(expr, &mut env)?;
                Ok(match value {
                    Value::Void => None,
                    other => Some(other),
                })
            }
            other => {
                self.exec_stmt(other, &mut env)?;
                Ok(None)
            }
        }
    }

    fn exec_block(&mut self, stmts: &[mir::Stmt], env: &mut Env) -> InterpResult<Control> {
        for stmt in stmts {
            if let Control::Return(value) = self.exec_stmt(stmt, env)? {
                return Ok(Control::Return(value));
            }
        }
        Ok(Control::Continue)
    }

    fn exec_stmt(&mut self, stmt: &mir::Stmt, env: &mut Env) -> InterpResult<Control> {
        match stmt {
            mir::Stmt::Expr(expr) => {
                self.eval_expr(expr, env)?;
                Ok(Control::Continue)
            }

            mir::Stmt::VarDef { name, value } => {
                let value = self.eval_expr(value, env)?;
                match env.scopes.last_mut() {
                    Some(scope) => {
                        scope.insert(name.clone(), value);
                    }
                    None => {
                        self.globals.insert(name.clone(), value);
                    }
                }
                Ok(Control::Continue)
            }

            mir::Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Void,
                };
                Ok(Control::Return(value))
            }

            mir::Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.eval_bool(cond, env)?;
                env.push_scope();
                let result = if cond {
                    self.exec_block(then_block, env)
                } else {
                    self.exec_block(else_block, env)
                };
                env.pop_scope();
                result
            }
        }
    }

    fn eval_bool(&mut self, expr: &mir::Expr, env: &mut Env) -> InterpResult<bool> {
        match self.eval_expr(expr, env)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::type_error(format!(
                "expected Bool, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_expr(&mut self, expr: &mir::Expr, env: &mut Env) -> InterpResult<Value> {
        match &expr.kind {
            mir::ExprKind::Int(n) => Ok(Value::Int(*n)),
            mir::ExprKind::Float(x) => Ok(Value::Float(*x)),
            mir::ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            mir::ExprKind::Str(s) => Ok(Value::Str(Rc::new(s.clone()))),
            mir::ExprKind::Null => Ok(Value::Null),

            mir::ExprKind::Var(name) => env
                .get(name)
                .or_else(|| self.globals.get(name).cloned())
                .ok_or_else(|| RuntimeError::undefined_variable(name)),

            mir::ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand, env)?;
                match (op, value) {
                    (mir::UnOp::Plus, value) => Ok(value),
                    (mir::UnOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
                    (mir::UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
                    (mir::UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (op, value) => Err(RuntimeError::type_error(format!(
                        "invalid operand {} for {op:?}",
                        value.type_name()
                    ))),
                }
            }

            mir::ExprKind::Binary { op, lhs, rhs } => {
                let a = self.eval_expr(lhs, env)?;
                let b = self.eval_expr(rhs, env)?;
                self.eval_binary(*op, a, b)
            }

            mir::ExprKind::Call { callee, args } => {
                let args: Vec<Value> = args
                    .iter()
                    .map(|arg| self.eval_expr(arg, env))
                    .collect::<InterpResult<_>>()?;
                self.call(callee, args)
            }

            mir::ExprKind::If {
                cond,
                then_val,
                else_val,
            } => {
                if self.eval_bool(cond, env)? {
                    self.eval_expr(then_val, env)
                } else {
                    self.eval_expr(else_val, env)
                }
            }
        }
    }

    fn eval_binary(&self, op: mir::BinOp, a: Value, b: Value) -> InterpResult<Value> {
        use mir::BinOp::*;
        match (op, a, b) {
            // Integer arithmetic wraps, matching the emitted LLVM
            // instructions
            (Add, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(b))),
            (Sub, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(b))),
            (Mul, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(b))),
            (Div, Value::Int(_), Value::Int(0)) => Err(RuntimeError::division_by_zero()),
            (Div, Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_div(b))),

            (Add, Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Sub, Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
            (Mul, Value::Float(a), Value::Float(b)) => Ok(Value::Float(a * b)),
            (Div, Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),

            (Eq, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a == b)),
            (Eq, Value::Float(a), Value::Float(b)) => Ok(Value::Bool(a == b)),
            (Eq, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a == b)),
            (Lt, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a < b)),
            (Lt, Value::Float(a), Value::Float(b)) => Ok(Value::Bool(a < b)),

            (op, a, b) => Err(RuntimeError::type_error(format!(
                "invalid operands {} and {} for {op:?}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }

    fn call(&mut self, callee: &mir::Prototype, args: Vec<Value>) -> InterpResult<Value> {
        if callee.is_extern {
            return call_extern(callee, args);
        }
        let symbol = callee.symbol();
        let func = self
            .functions
            .get(&symbol)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_function(&callee.name))?;

        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RuntimeError::stack_overflow());
        }
        self.depth += 1;

        // A fresh environment per call: the callee sees its parameters and
        // the globals, never the caller's locals.
        let mut env = Env::default();
        env.push_scope();
        for ((name, _), value) in func.proto.params.iter().zip(args) {
            env.scopes
                .last_mut()
                .expect("parameter scope")
                .insert(name.clone(), value);
        }

        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.exec_block(&func.body, &mut env)
        });
        self.depth -= 1;

        match result? {
            Control::Return(value) => Ok(value),
            Control::Continue => Ok(Value::Void),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Shims for the C functions the core library declares
fn call_extern(callee: &mir::Prototype, args: Vec<Value>) -> InterpResult<Value> {
    match callee.name.as_str() {
        "puts" => match args.first() {
            Some(Value::Str(s)) => {
                println!("{s}");
                Ok(Value::Int(0))
            }
            _ => Err(RuntimeError::type_error("puts expects a String")),
        },
        "putchar" => match args.first() {
            Some(Value::Int(c)) => {
                print!("{}", (*c as u8) as char);
                std::io::stdout().flush().ok();
                Ok(Value::Int(*c))
            }
            _ => Err(RuntimeError::type_error("putchar expects an Int")),
        },
        "getchar" => {
            let mut byte = [0u8; 1];
            match std::io::stdin().lock().read(&mut byte) {
                Ok(1) => Ok(Value::Int(byte[0] as i64)),
                _ => Ok(Value::Int(-1)),
            }
        }
        // The interpreter's strings manage their own storage; malloc only
        // exists so core-library source type-checks identically.
        "malloc" => Ok(Value::Str(Rc::new(String::new()))),
        "gets" => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| RuntimeError::io_error(e.to_string()))?;
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            Ok(Value::Str(Rc::new(line)))
        }
        name => Err(RuntimeError::undefined_function(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::types::TypeChecker;

    fn compile(source: &str) -> mir::Program {
        let tokens = tokenize(source).expect("tokenize");
        let program = parse(tokens).expect("parse");
        let mut checker = TypeChecker::new();
        checker.check_file(&program).expect("check");
        checker.finish()
    }

    /// Run a program and return its exit status
    fn run(source: &str) -> i32 {
        let program = compile(source);
        Interpreter::new().run(&program).expect("run")
    }

    /// Evaluate top-level statements the way the REPL does and return the
    /// last echoed value
    fn eval(source: &str) -> Option<Value> {
        let program = compile(source);
        let mut interp = Interpreter::new();
        interp.register_functions(&program.functions);
        let mut last = None;
        for stmt in &program.main_body {
            if let Some(value) = interp.eval_repl_stmt(stmt).expect("eval") {
                last = Some(value);
            }
        }
        last
    }

    #[test]
    fn test_addition() {
        assert_eq!(eval("4 + 4"), Some(Value::Int(8)));
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(eval("2 + 3 * 4 - 6 / 2"), Some(Value::Int(11)));
        assert_eq!(eval("100 - 10 - 5"), Some(Value::Int(85)));
        assert_eq!(eval("(2 + 3) * 4"), Some(Value::Int(20)));
    }

    #[test]
    fn test_literal_round_trips() {
        assert_eq!(
            eval("9223372036854775807"),
            Some(Value::Int(i64::MAX))
        );
        assert_eq!(eval("-9223372036854775807"), Some(Value::Int(-i64::MAX)));
        assert_eq!(eval("true"), Some(Value::Bool(true)));
        assert_eq!(eval("1.5"), Some(Value::Float(1.5)));
    }

    #[test]
    fn test_if_expression() {
        assert_eq!(eval("if true then 666 else 777"), Some(Value::Int(666)));
        assert_eq!(eval("if false then 666 else 777"), Some(Value::Int(777)));
    }

    #[test]
    fn test_desugared_comparisons() {
        assert_eq!(eval("7 >= 7"), Some(Value::Bool(true)));
        assert_eq!(eval("3 > 4"), Some(Value::Bool(false)));
        assert_eq!(eval("3 <= 4"), Some(Value::Bool(true)));
        assert_eq!(eval("3 != 4"), Some(Value::Bool(true)));
        assert_eq!(eval("5.0 == 5"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_exit_status_from_function() {
        let source = "function guess(answer) {\n if answer == 42 { return 1 } else { return 0 }\n}\n";
        assert_eq!(run(&format!("{source}return guess(42)")), 1);
        assert_eq!(run(&format!("{source}return guess(0)")), 0);
    }

    #[test]
    fn test_recursion() {
        let source = "function fib(n: Int) -> Int {\n if n < 2 { return n } else { return fib(n - 1) + fib(n - 2) }\n}\nfib(10)";
        assert_eq!(eval(source), Some(Value::Int(55)));
    }

    #[test]
    fn test_monomorphized_calls() {
        let source = "function double(x) {\n return x + x\n}\na = double(21)\nb = double(0.5)\na";
        assert_eq!(eval(source), Some(Value::Int(42)));
    }

    #[test]
    fn test_globals_visible_in_functions() {
        let source = "base = 10\nfunction above(n) {\n return base + n\n}\nabove(5)";
        assert_eq!(eval(source), Some(Value::Int(15)));
    }

    #[test]
    fn test_division_by_zero() {
        let program = compile("1 / 0");
        let err = Interpreter::new().run(&program).unwrap_err();
        assert_eq!(err.kind, crate::interp::ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_variable_definition_and_use() {
        assert_eq!(eval("x = 6\ny = 7\nx * y"), Some(Value::Int(42)));
    }

    #[test]
    fn test_if_statement_branch_scopes() {
        let source = "r = if 1 < 2 then 10 else 20\nr";
        assert_eq!(eval(source), Some(Value::Int(10)));
    }

    #[test]
    fn test_operator_overload_call() {
        let source = "function == (a: String, b: String) {\n return true\n}\n\"x\" == \"y\"";
        assert_eq!(eval(source), Some(Value::Bool(true)));
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(
            eval("9223372036854775807 + 1"),
            Some(Value::Int(i64::MIN))
        );
    }
}
