//! Coverage aggregation and diagnostic rendering
//!
//! Folds the per-occurrence coverage contributions for one binding and,
//! when a variant remains unaccounted for, renders exactly one diagnostic
//! naming the missing variant(s) with the correct linking verb.

use super::bindings::Binding;
use super::coverage::classify;
use super::outcome::{Coverage, OutcomeKind, Variant};
use super::refs::Occurrence;
use crate::diagnostics::{rules, Diagnostic};
use crate::sema::SemanticModel;

/// Aggregate all occurrence contributions for `binding` and report.
///
/// A binding with zero retained occurrences is fully covered by policy:
/// an unused outcome value is not an exhaustiveness violation.
pub fn aggregate(
    binding: &Binding<'_>,
    occurrences: &[Occurrence<'_>],
    model: &SemanticModel,
) -> Option<Diagnostic> {
    if occurrences.is_empty() {
        return None;
    }

    let coverage = occurrences
        .iter()
        .fold(Coverage::EMPTY, |acc, occ| acc.union(classify(occ, model)));

    report(binding, coverage)
}

fn report(binding: &Binding<'_>, coverage: Coverage) -> Option<Diagnostic> {
    let missing = coverage.missing();
    let (missing_text, linking_verb) = match missing.as_slice() {
        [] => return None,
        [one] => (one.quoted_name().to_string(), "is"),
        _ => (
            format!(
                "{} and {}",
                Variant::Ok.quoted_name(),
                Variant::Error.quoted_name()
            ),
            "are",
        ),
    };

    let (rule_id, type_display) = match binding.kind {
        OutcomeKind::Generic => (rules::RESULT_HANDLING_GENERIC, "Result<T>"),
        OutcomeKind::Plain => (rules::RESULT_HANDLING_PLAIN, "Result"),
    };

    let message = format!(
        "You must handle all possible cases of the result of type `{type_display}`. \
         {missing_text} {linking_verb} unhandled."
    );

    Some(Diagnostic::new(rule_id, binding.name_span, message))
}
