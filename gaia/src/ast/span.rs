//! Source spans

use serde::{Deserialize, Serialize};

/// A byte range into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Zero-width span for synthesized nodes
    pub fn dummy() -> Self {
        Span { start: 0, end: 0 }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Derive the 1-based line and column of the span start.
    ///
    /// Columns count Unicode scalars, matching what the caret line in a
    /// diagnostic points at.
    pub fn location(&self, source: &str) -> (usize, usize) {
        let upto = &source[..self.start.min(source.len())];
        let line = upto.matches('\n').count() + 1;
        let line_start = upto.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = upto[line_start..].chars().count() + 1;
        (line, column)
    }
}

/// A node paired with the span it was parsed from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Spanned { node, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location() {
        let source = "abc\ndef\nghi";
        assert_eq!(Span::new(0, 1).location(source), (1, 1));
        assert_eq!(Span::new(5, 6).location(source), (2, 2));
        assert_eq!(Span::new(8, 9).location(source), (3, 1));
    }

    #[test]
    fn test_merge() {
        let a = Span::new(2, 5);
        let b = Span::new(4, 9);
        assert_eq!(a.to(b), Span::new(2, 9));
    }
}
