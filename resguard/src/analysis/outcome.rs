//! Outcome-family type identity
//!
//! Central place deciding whether a resolved type is one of the tracked
//! outcome types. Identity is exact name plus declaring module; structural
//! look-alikes from other origins never match. The zero-arity and
//! one-arity `Result` forms are distinct and never conflated.

use crate::sema::{Origin, ResolvedType};

/// Which form of the outcome family a binding has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// `Result` (no type argument)
    Plain,
    /// `Result<T>`
    Generic,
}

/// The two closed variants of the outcome family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Ok,
    Error,
}

impl Variant {
    /// The type name rendered in diagnostics, quoted as the messages
    /// expect it.
    pub fn quoted_name(self) -> &'static str {
        match self {
            Variant::Ok => "'Ok'",
            Variant::Error => "'Error'",
        }
    }
}

/// Set of variants proven handled.
///
/// Immutable value type; occurrences each produce one and the aggregator
/// unions them, so there are no shared mutable flags anywhere in the
/// classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    ok: bool,
    error: bool,
}

impl Coverage {
    pub const EMPTY: Coverage = Coverage {
        ok: false,
        error: false,
    };
    pub const FULL: Coverage = Coverage {
        ok: true,
        error: true,
    };

    pub fn of(variant: Variant) -> Coverage {
        match variant {
            Variant::Ok => Coverage {
                ok: true,
                error: false,
            },
            Variant::Error => Coverage {
                ok: false,
                error: true,
            },
        }
    }

    #[must_use]
    pub fn union(self, other: Coverage) -> Coverage {
        Coverage {
            ok: self.ok || other.ok,
            error: self.error || other.error,
        }
    }

    pub fn is_full(self) -> bool {
        self.ok && self.error
    }

    /// The variants still unaccounted for, in reporting order.
    pub fn missing(self) -> Vec<Variant> {
        let mut missing = Vec::new();
        if !self.ok {
            missing.push(Variant::Ok);
        }
        if !self.error {
            missing.push(Variant::Error);
        }
        missing
    }
}

/// Does `ty` denote one of the tracked outcome forms?
pub fn outcome_kind(ty: &ResolvedType) -> Option<OutcomeKind> {
    if ty.origin != Origin::Results || ty.name != "Result" {
        return None;
    }
    match ty.arity {
        0 => Some(OutcomeKind::Plain),
        1 => Some(OutcomeKind::Generic),
        _ => None,
    }
}

/// Does `ty` denote one of the two variant types?
pub fn variant_of(ty: &ResolvedType) -> Option<Variant> {
    if ty.origin != Origin::Results {
        return None;
    }
    match ty.name.as_str() {
        "Ok" => Some(Variant::Ok),
        "Error" => Some(Variant::Error),
        _ => None,
    }
}
