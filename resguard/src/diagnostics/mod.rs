//! Analysis diagnostics
//!
//! Unlike `CompileError`, these are findings about well-formed code: the
//! analyzer's own rules, the host-style exhaustiveness check, and the
//! suppressions retracting the latter. Reports for many files accumulate in
//! a shared append-only sink so files can be analyzed in parallel.

use crate::ast::Span;
use serde::Serialize;
use std::sync::Mutex;

/// Rule ids and the fixed message templates they render.
pub mod rules {
    /// Unhandled variant of the generic `Result<T>` type.
    pub const RESULT_HANDLING_GENERIC: &str = "TBTRA001";
    /// Unhandled variant of the non-generic `Result` type.
    pub const RESULT_HANDLING_PLAIN: &str = "TBTRA002";
    /// Suppression of the host exhaustiveness warning on outcome matches.
    pub const SWITCH_SUPPRESSOR: &str = "TBTRA901";
    /// The host's own generic non-exhaustive-match warning.
    pub const HOST_NON_EXHAUSTIVE_SWITCH: &str = "CS8509";

    pub const SWITCH_SUPPRESSOR_JUSTIFICATION: &str =
        "Switch expression is exhaustive for the outcome Result type, otherwise there's an error.";
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// One finding at one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule_id: &'static str,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn new(rule_id: &'static str, span: Span, message: impl Into<String>) -> Self {
        Self {
            rule_id,
            span,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self.rule_id {
            rules::HOST_NON_EXHAUSTIVE_SWITCH => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Retraction of one specific host diagnostic instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suppression {
    pub id: &'static str,
    pub justification: &'static str,
    pub suppressed: Diagnostic,
}

/// All findings for one analyzed file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub diagnostics: Vec<Diagnostic>,
    pub suppressions: Vec<Suppression>,
}

impl FileReport {
    /// Diagnostics that survive suppression.
    pub fn active_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| !self.suppressions.iter().any(|s| &s.suppressed == *diag))
    }
}

/// Append-only, thread-safe collection of per-file reports.
///
/// The only shared state between concurrently analyzed files; writes are
/// order-independent.
#[derive(Default)]
pub struct DiagnosticSink {
    reports: Mutex<Vec<FileReport>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, report: FileReport) {
        self.reports.lock().unwrap().push(report);
    }

    pub fn into_reports(self) -> Vec<FileReport> {
        self.reports.into_inner().unwrap()
    }
}

/// Render one diagnostic with ariadne
pub fn report_diagnostic(filename: &str, source: &str, diagnostic: &Diagnostic) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let (kind, color) = match diagnostic.severity() {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
    };
    let span = diagnostic.span;

    Report::build(kind, (filename, span.start..span.end))
        .with_code(diagnostic.rule_id)
        .with_message(&diagnostic.message)
        .with_label(
            Label::new((filename, span.start..span.end))
                .with_message(&diagnostic.message)
                .with_color(color),
        )
        .finish()
        .print((filename, Source::from(source)))
        .unwrap();
}
