//! Build pipeline
//!
//! Orchestrates a whole compilation: core-library sources first, user
//! files with `main.gaia` last, one LLVM module out. Executables are
//! produced by handing the textual IR to clang.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::codegen::{CodeGenError, TextCodeGen};
use crate::error::CompileError;
use crate::lexer::tokenize;
use crate::mir;
use crate::parser::parse;
use crate::types::TypeChecker;

/// Embedded core-library sources, used when `GAIA_HOME` is not set
const CORE_SOURCES: &[(&str, &str)] = &[("core/io.gaia", include_str!("../../core/io.gaia"))];

/// Build configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Input source files
    pub inputs: Vec<PathBuf>,
    /// Output path; derived from the first input when absent
    pub output: Option<PathBuf>,
    /// Stop after writing the `.ll` artifact
    pub emit_llvm: bool,
    /// Verbose output
    pub verbose: bool,
}

impl BuildConfig {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        BuildConfig {
            inputs,
            output: None,
            emit_llvm: false,
            verbose: false,
        }
    }

    pub fn output(mut self, path: Option<PathBuf>) -> Self {
        self.output = path;
        self
    }

    pub fn emit_llvm(mut self, emit: bool) -> Self {
        self.emit_llvm = emit;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Build error
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file failed to compile; carries what the diagnostic
    /// renderer needs
    #[error("{filename}: {error}")]
    Compile {
        filename: String,
        source: String,
        #[source]
        error: CompileError,
    },

    #[error("code generation error: {0}")]
    CodeGen(#[from] CodeGenError),

    #[error("linker error: {0}")]
    Linker(String),
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Core-library sources: `$GAIA_HOME/Core/*.gaia` when the environment
/// names an installation, the embedded copies otherwise.
pub fn core_sources() -> BuildResult<Vec<(String, String)>> {
    match std::env::var("GAIA_HOME") {
        Ok(home) => {
            let dir = Path::new(&home).join("Core");
            let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "gaia"))
                .collect();
            files.sort();
            let mut sources = Vec::new();
            for path in files {
                let text = std::fs::read_to_string(&path)?;
                sources.push((path.display().to_string(), text));
            }
            Ok(sources)
        }
        Err(_) => Ok(CORE_SOURCES
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect()),
    }
}

/// Load the core library into a checker (also used by the REPL)
pub fn load_core(checker: &mut TypeChecker) -> BuildResult<()> {
    for (name, text) in core_sources()? {
        compile_source(checker, &name, &text)?;
    }
    Ok(())
}

/// Order inputs so `main.gaia` (case-insensitive base name) compiles last;
/// everything else keeps its given order.
pub fn order_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let (mains, others): (Vec<PathBuf>, Vec<PathBuf>) =
        inputs.iter().cloned().partition(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.eq_ignore_ascii_case("main.gaia"))
        });
    others.into_iter().chain(mains).collect()
}

/// Module name: the single input's file name, or the parent directory name
/// when several files form the module.
pub fn module_name(inputs: &[PathBuf]) -> String {
    let fallback = || "gaia".to_string();
    if inputs.len() == 1 {
        inputs[0]
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(fallback)
    } else {
        inputs
            .first()
            .and_then(|path| path.parent())
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(fallback)
    }
}

/// Compile core plus user sources into one MIR program
pub fn compile(config: &BuildConfig) -> BuildResult<mir::Program> {
    let mut checker = TypeChecker::new();
    load_core(&mut checker)?;
    for path in order_inputs(&config.inputs) {
        let text = std::fs::read_to_string(&path)?;
        compile_source(&mut checker, &path.display().to_string(), &text)?;
    }
    Ok(checker.finish())
}

fn compile_source(checker: &mut TypeChecker, filename: &str, source: &str) -> BuildResult<()> {
    tokenize(source)
        .and_then(parse)
        .and_then(|program| checker.check_file(&program))
        .map_err(|error| BuildError::Compile {
            filename: filename.to_string(),
            source: source.to_string(),
            error,
        })
}

/// Full build. Returns the produced artifact: the `.ll` file under
/// `emit_llvm`, the linked executable otherwise.
pub fn build(config: &BuildConfig) -> BuildResult<PathBuf> {
    let program = compile(config)?;
    let ir = TextCodeGen::new(module_name(&config.inputs)).generate(&program)?;

    let output = config
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config.inputs));
    let ir_path = output.with_extension("ll");
    std::fs::write(&ir_path, &ir)?;
    if config.verbose {
        println!("wrote {}", ir_path.display());
    }
    if config.emit_llvm {
        return Ok(ir_path);
    }

    let clang = find_clang().map_err(BuildError::Linker)?;
    let result = Command::new(&clang)
        .args([
            "-O0",
            "-w",
            ir_path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .output()?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(BuildError::Linker(format!("clang failed: {stderr}")));
    }
    let _ = std::fs::remove_file(&ir_path);

    if config.verbose {
        println!("created {}", output.display());
    }
    Ok(output)
}

fn default_output(inputs: &[PathBuf]) -> PathBuf {
    inputs
        .first()
        .map(|path| path.with_extension(""))
        .unwrap_or_else(|| PathBuf::from("a.out"))
}

/// Run the produced executable and report its exit status
pub fn run_executable(path: &Path) -> BuildResult<i32> {
    let absolute = path.canonicalize()?;
    let status = Command::new(absolute).status()?;
    Ok(status.code().unwrap_or(1))
}

/// Find a clang to compile the textual IR
fn find_clang() -> Result<String, String> {
    let candidates = ["clang", "clang-19", "clang-18", "clang-17", "clang-16"];
    for candidate in candidates {
        if Command::new(candidate)
            .arg("--version")
            .output()
            .is_ok()
        {
            return Ok(candidate.to_string());
        }
    }
    Err("clang not found; install LLVM/clang".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_gaia_is_ordered_last() {
        let inputs = vec![
            PathBuf::from("src/Main.gaia"),
            PathBuf::from("src/util.gaia"),
            PathBuf::from("src/extra.gaia"),
        ];
        let ordered = order_inputs(&inputs);
        assert_eq!(ordered[0], PathBuf::from("src/util.gaia"));
        assert_eq!(ordered[1], PathBuf::from("src/extra.gaia"));
        assert_eq!(ordered[2], PathBuf::from("src/Main.gaia"));
    }

    #[test]
    fn test_module_name_single_input() {
        assert_eq!(module_name(&[PathBuf::from("demo/hello.gaia")]), "hello.gaia");
    }

    #[test]
    fn test_module_name_multiple_inputs() {
        let inputs = vec![
            PathBuf::from("demo/a.gaia"),
            PathBuf::from("demo/main.gaia"),
        ];
        assert_eq!(module_name(&inputs), "demo");
    }

    #[test]
    fn test_functions_from_one_file_visible_in_the_next() {
        let mut checker = TypeChecker::new();
        compile_source(
            &mut checker,
            "wrap.gaia",
            "extern function puts(s: String) -> Int32\nfunction wrap(s: String) {\n puts(s)\n}\n",
        )
        .expect("library file should compile");
        compile_source(&mut checker, "main.gaia", "wrap(\"hello\")\n")
            .expect("main should see wrap");
        let program = checker.finish();
        assert!(program
            .functions
            .iter()
            .any(|f| f.proto.symbol() == "wrap.String"));
    }

    #[test]
    fn test_core_library_compiles() {
        let mut checker = TypeChecker::new();
        for (name, text) in CORE_SOURCES {
            compile_source(&mut checker, name, text).expect("embedded core should compile");
        }
        // Wrappers only instantiate at their first call site
        compile_source(&mut checker, "main.gaia", "print(\"hi\")\n").expect("print call");
        let program = checker.finish();
        assert!(program
            .functions
            .iter()
            .any(|f| f.proto.symbol() == "print.String"));
    }

    #[test]
    fn test_compile_error_carries_filename() {
        let mut checker = TypeChecker::new();
        let err = compile_source(&mut checker, "bad.gaia", "foo = 1\nfoo = 2\n").unwrap_err();
        match err {
            BuildError::Compile { filename, error, .. } => {
                assert_eq!(filename, "bad.gaia");
                assert!(matches!(error, CompileError::Redefinition { .. }));
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }
}
