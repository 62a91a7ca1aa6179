//! Code generation
//!
//! MIR is lowered to textual LLVM IR (.ll) that clang or llc can compile.
//! Emitting text needs no LLVM C API, which keeps the toolchain portable
//! and the output easy to inspect.

mod llvm_text;

pub use llvm_text::{CodeGenError, CodeGenResult, TextCodeGen};
