//! Tree-walking evaluator over MIR
//!
//! Backs the REPL: MIR is already typed and every call is resolved, so
//! evaluation is a single match per node. Extern calls are served by
//! built-in shims for the C functions the core library declares.

mod error;
mod eval;
mod value;

pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use value::Value;
