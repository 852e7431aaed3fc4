//! Result-handling analysis pipeline
//!
//! Per-file, stateless and synchronous: locate the outcome bindings,
//! collect each binding's retained occurrences, classify and aggregate
//! them, then run the host exhaustiveness check and the suppressor over
//! its output. Nothing here performs I/O or keeps state across files, so
//! callers may analyze arbitrarily many files in parallel.

pub mod bindings;
pub mod coverage;
pub mod outcome;
pub mod refs;
pub mod report;
pub mod suppress;

use crate::ast::{Item, Program};
use crate::diagnostics::{Diagnostic, Suppression};
use crate::exhaust;
use crate::sema::SemanticModel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal, checked between top-level items and
/// between files.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// All findings for one file's syntax tree.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub diagnostics: Vec<Diagnostic>,
    pub suppressions: Vec<Suppression>,
}

/// Analyze one parsed file.
///
/// Recomputes everything from the tree; no state survives between calls,
/// so re-running on an unchanged tree yields an identical result.
pub fn analyze(program: &Program, cancel: &CancelToken) -> FileAnalysis {
    let model = SemanticModel::build(program);

    let mut diagnostics = Vec::new();
    for item in &program.items {
        if cancel.is_cancelled() {
            break;
        }
        let Item::FnDef(def) = item else { continue };
        for binding in bindings::locate(def, &model) {
            let occurrences = refs::collect(&binding, &model);
            if let Some(diagnostic) = report::aggregate(&binding, &occurrences, &model) {
                diagnostics.push(diagnostic);
            }
        }
    }

    let host_diagnostics = exhaust::check(program);
    let suppressions = suppress::suppress(program, &model, &host_diagnostics);
    diagnostics.extend(host_diagnostics);

    FileAnalysis {
        diagnostics,
        suppressions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn analyze_source(source: &str) -> FileAnalysis {
        let tokens = tokenize(source).unwrap();
        let program = parse("test.res", source, tokens).unwrap();
        analyze(&program, &CancelToken::new())
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let source = "use results;\n\
                      fn main() {\n\
                          let r: Result = f();\n\
                          if r is Ok { g(); }\n\
                          match h() { Ok => 0, };\n\
                      }";
        let tokens = tokenize(source).unwrap();
        let program = parse("test.res", source, tokens).unwrap();
        let first = analyze(&program, &CancelToken::new());
        let second = analyze(&program, &CancelToken::new());
        assert_eq!(first.diagnostics, second.diagnostics);
        assert_eq!(first.suppressions, second.suppressions);
    }

    #[test]
    fn test_cancelled_analysis_reports_no_binding_diagnostics() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let source = "use results;\n\
                      fn main() { let r: Result = f(); if r is Ok { g(); } }";
        let tokens = tokenize(source).unwrap();
        let program = parse("test.res", source, tokens).unwrap();
        let analysis = analyze(&program, &cancel);
        assert!(analysis
            .diagnostics
            .iter()
            .all(|d| d.rule_id == crate::diagnostics::rules::HOST_NON_EXHAUSTIVE_SWITCH));
    }
}
