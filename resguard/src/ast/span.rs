//! Source location tracking

use serde::{Deserialize, Serialize};

/// A byte range in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether `other` lies entirely within this span.
    ///
    /// Used by the suppressor to find the match expression a host
    /// diagnostic points at.
    pub fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A node paired with its source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_spans() {
        let merged = Span::new(3, 7).merge(Span::new(10, 12));
        assert_eq!(merged, Span::new(3, 12));
    }

    #[test]
    fn test_merge_is_commutative() {
        let a = Span::new(0, 4);
        let b = Span::new(2, 9);
        assert_eq!(a.merge(b), b.merge(a));
    }

    #[test]
    fn test_contains_inner_span() {
        assert!(Span::new(0, 10).contains(Span::new(2, 8)));
        assert!(Span::new(0, 10).contains(Span::new(0, 10)));
    }

    #[test]
    fn test_contains_rejects_overlap() {
        assert!(!Span::new(0, 10).contains(Span::new(8, 12)));
        assert!(!Span::new(5, 10).contains(Span::new(0, 6)));
    }
}
