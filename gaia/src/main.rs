//! Gaia compiler CLI
//!
//! `gaia a.gaia b.gaia main.gaia` compiles the inputs (core library first,
//! `main.gaia` last), links with clang, runs the executable, and exits with
//! the program's status. With no files the REPL starts.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use gaia::ast::output;
use gaia::build::{self, BuildConfig, BuildError};
use gaia::error::{report_error, report_error_pretty};
use gaia::repl::Repl;

#[derive(Parser)]
#[command(name = "gaia", version, about = "Gaia compiler")]
struct Cli {
    /// Source files; main.gaia is compiled last. No files starts the REPL.
    files: Vec<PathBuf>,

    /// Emit the LLVM IR artifact instead of building and running
    #[arg(long)]
    emit_llvm: bool,

    /// Output path for the executable (or the IR artifact)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render diagnostics with source labels
    #[arg(long)]
    pretty: bool,

    /// Dump the parsed AST as JSON and exit
    #[arg(long)]
    dump_ast: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.files.is_empty() {
        return start_repl();
    }

    if cli.dump_ast {
        return dump_ast(&cli.files, cli.pretty);
    }

    let emit_llvm = cli.emit_llvm;
    let config = BuildConfig::new(cli.files)
        .output(cli.output)
        .emit_llvm(emit_llvm)
        .verbose(cli.verbose);

    match build::build(&config) {
        Ok(artifact) => {
            if emit_llvm {
                println!("{}", artifact.display());
                return ExitCode::SUCCESS;
            }
            match build::run_executable(&artifact) {
                Ok(code) => ExitCode::from(code as u8),
                Err(err) => {
                    eprintln!("error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(BuildError::Compile {
            filename,
            source,
            error,
        }) => {
            if cli.pretty {
                report_error_pretty(&filename, &source, &error);
            } else {
                report_error(&filename, &source, &error);
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn start_repl() -> ExitCode {
    match Repl::new().and_then(|mut repl| repl.run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn dump_ast(files: &[PathBuf], pretty: bool) -> ExitCode {
    for path in files {
        let filename = path.display().to_string();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: cannot read {filename}: {err}");
                return ExitCode::FAILURE;
            }
        };
        let parsed = gaia::lexer::tokenize(&source).and_then(gaia::parser::parse);
        match parsed {
            Ok(program) => match output::to_json(&program) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            },
            Err(error) => {
                if pretty {
                    report_error_pretty(&filename, &source, &error);
                } else {
                    report_error(&filename, &source, &error);
                }
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
