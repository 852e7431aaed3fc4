//! resguard CLI

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use resguard::analysis::CancelToken;
use resguard::diagnostics::{report_diagnostic, DiagnosticSink, FileReport};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser)]
#[command(
    name = "resguard",
    version,
    about = "Exhaustive Result-handling analysis for .res sources"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze source files and report unhandled Result variants
    Check {
        /// Source files to analyze
        files: Vec<PathBuf>,
        /// Emit reports as JSON instead of rendered diagnostics
        #[arg(long)]
        json: bool,
    },
    /// Parse and dump AST (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Check { files, json } => check_files(&files, json),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
    };

    std::process::exit(exit_code);
}

fn check_files(files: &[PathBuf], json: bool) -> i32 {
    let sink = DiagnosticSink::new();
    let cancel = CancelToken::new();
    let failed = AtomicBool::new(false);

    // Files are independent; the sink is the only shared state.
    files.par_iter().for_each(|path| {
        if cancel.is_cancelled() {
            return;
        }
        let filename = path.display().to_string();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Error: cannot read {filename}: {e}");
                failed.store(true, Ordering::Relaxed);
                return;
            }
        };

        let analysis = match run_frontend(&filename, &source) {
            Ok(program) => resguard::analysis::analyze(&program, &cancel),
            Err(e) => {
                resguard::error::report_error(&filename, &source, &e);
                failed.store(true, Ordering::Relaxed);
                return;
            }
        };

        let report = FileReport {
            filename: filename.clone(),
            diagnostics: analysis.diagnostics,
            suppressions: analysis.suppressions,
        };

        if !json {
            for diagnostic in report.active_diagnostics() {
                report_diagnostic(&filename, &source, diagnostic);
            }
        }

        sink.push(report);
    });

    let reports = sink.into_reports();
    let unsuppressed: usize = reports
        .iter()
        .map(|report| report.active_diagnostics().count())
        .sum();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports).unwrap());
    } else if unsuppressed == 0 && !failed.load(Ordering::Relaxed) {
        println!("checked {} file(s), no unhandled results", reports.len());
    }

    if unsuppressed > 0 || failed.load(Ordering::Relaxed) {
        1
    } else {
        0
    }
}

fn run_frontend(filename: &str, source: &str) -> resguard::Result<resguard::ast::Program> {
    let tokens = resguard::lexer::tokenize(source)?;
    resguard::parser::parse(filename, source, tokens)
}

fn parse_file(path: &PathBuf) -> i32 {
    let filename = path.display().to_string();
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read {filename}: {e}");
            return 1;
        }
    };

    match run_frontend(&filename, &source) {
        Ok(program) => {
            println!("{}", serde_json::to_string_pretty(&program).unwrap());
            0
        }
        Err(e) => {
            resguard::error::report_error(&filename, &source, &e);
            1
        }
    }
}

fn tokenize_file(path: &PathBuf) -> i32 {
    let filename = path.display().to_string();
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read {filename}: {e}");
            return 1;
        }
    };

    match resguard::lexer::tokenize(&source) {
        Ok(tokens) => {
            for (token, span) in &tokens {
                println!("{span}: {token:?}");
            }
            0
        }
        Err(e) => {
            resguard::error::report_error(&filename, &source, &e);
            1
        }
    }
}
