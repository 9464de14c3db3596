//! Source positions attached to tokens, AST nodes and diagnostics.

use std::fmt;

/// Where a token or node starts in the compilation unit, plus its length.
///
/// The file name is not stored here: a compilation handles exactly one
/// unit, so the name lives once on [`Diagnostics`](crate::Diagnostics).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-length span, used for end of input and synthesized nodes.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Extend `self` so that it also covers `other`.
    ///
    /// Spans on different lines keep the start of `self` and only
    /// accumulate length.
    pub fn to(self, other: Span) -> Span {
        if self.line != other.line {
            return Span::new(self.line, self.col, self.len + other.len);
        }
        let start = self.col.min(other.col);
        let end = (self.col + self.len).max(other.col + other.len);
        Span::new(self.line, start, end - start)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_line_spans_cover_both_ends() {
        let lhs = Span::new(3, 5, 1);
        let rhs = Span::new(3, 9, 2);
        assert_eq!(lhs.to(rhs), Span::new(3, 5, 6));
        assert_eq!(rhs.to(lhs), Span::new(3, 5, 6));
    }

    #[test]
    fn multi_line_spans_keep_first_position() {
        let joined = Span::new(1, 4, 3).to(Span::new(2, 1, 5));
        assert_eq!((joined.line, joined.col, joined.len), (1, 4, 8));
    }

    #[test]
    fn display_is_line_and_column() {
        assert_eq!(Span::point(12, 7).to_string(), "12:7");
    }
}
