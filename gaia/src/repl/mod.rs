//! REPL (Read-Eval-Print Loop)
//!
//! Each line runs through the full front end: lexer, parser, REPL-mode
//! type checker. Newly monomorphized functions are synced into the
//! interpreter, and the value of a non-Void expression is echoed. A failed
//! line prints one diagnostic and is discarded.

use crate::build;
use crate::error::format_diagnostic;
use crate::interp::Interpreter;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::types::TypeChecker;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "gaia> ";
const HISTORY_FILE: &str = ".gaia_history";
const REPL_FILENAME: &str = "<repl>";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    checker: TypeChecker,
    interp: Interpreter,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL with the core library preloaded
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let mut checker = TypeChecker::new_repl();
        if let Err(err) = build::load_core(&mut checker) {
            eprintln!("warning: failed to load core library: {err}");
        }

        let history_path = home_dir().map(|home| home.join(HISTORY_FILE));
        let mut repl = Repl {
            editor,
            checker,
            interp: Interpreter::new(),
            history_path,
        };
        if let Some(path) = &repl.history_path {
            let _ = repl.editor.load_history(path);
        }
        Ok(repl)
    }

    /// Run until :quit or end of input
    pub fn run(&mut self) -> RlResult<()> {
        println!("Gaia REPL");
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.eval_line(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("error: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }
        Ok(())
    }

    /// Handle REPL commands (starting with :). Returns true to exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => true,
            ":help" | ":h" | ":?" => {
                self.print_help();
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    fn print_help(&self) {
        println!("Gaia REPL commands:");
        println!("  :help, :h, :?   Show this help");
        println!("  :quit, :q       Exit the REPL");
        println!("  :clear          Clear the screen");
        println!();
        println!("You can enter:");
        println!("  - Expressions: 4 + 4, if true then 666 else 777");
        println!("  - Definitions: x = 42, function double(n) {{ return n + n }}");
        println!("  - Calls: double(21), print(\"hi\")");
    }

    /// Compile and evaluate one line
    fn eval_line(&mut self, line: &str) {
        let mut source = line.to_string();
        source.push('\n');

        let stmts = match tokenize(&source)
            .and_then(parse)
            .and_then(|program| self.checker.check_items(&program))
        {
            Ok(stmts) => stmts,
            Err(err) => {
                eprintln!("{}", format_diagnostic(REPL_FILENAME, &source, &err));
                return;
            }
        };

        self.interp
            .register_functions(&self.checker.take_new_functions());

        for stmt in &stmts {
            match self.interp.eval_repl_stmt(stmt) {
                Ok(Some(value)) => println!("{value}"),
                Ok(None) => {}
                Err(err) => {
                    eprintln!("runtime error: {err}");
                    return;
                }
            }
        }
    }
}

/// Home directory for the history file
fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
