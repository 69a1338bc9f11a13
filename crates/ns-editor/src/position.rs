//! Text position and range types.
//!
//! All coordinates are **0-indexed** and columns count chars, matching how
//! `ropey` indexes text. The status bar shows 1-indexed `Ln`/`Col` values;
//! that conversion happens at display time, never here.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A (line, column) position in a document.
///
/// Ordered line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open range `[start, end)` with `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a range. Panics in debug if `start > end`.
    #[inline]
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "Range::new requires start <= end");
        Self { start, end }
    }

    /// Build a range from two positions in either order, e.g. the anchor and
    /// head of a selection dragged backwards.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Zero-width range at `pos`.
    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// True when `pos` falls within `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// The lines this range touches, inclusive. A selection that ends at
    /// column 0 of a line does not touch that line.
    #[must_use]
    pub fn lines(self) -> std::ops::RangeInclusive<usize> {
        let last = if self.end.col == 0 && self.end.line > self.start.line {
            self.end.line - 1
        } else {
            self.end.line
        };
        self.start.line..=last
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Range({:?} .. {:?})", self.start, self.end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_line_then_col() {
        assert!(Position::new(0, 100) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
    }

    #[test]
    fn display_is_1_indexed() {
        assert_eq!(Position::new(0, 0).to_string(), "1:1");
        assert_eq!(Position::new(9, 14).to_string(), "10:15");
        let r = Range::new(Position::ZERO, Position::new(2, 5));
        assert_eq!(r.to_string(), "1:1-3:6");
    }

    #[test]
    fn ordered_swaps_backwards_selection() {
        let a = Position::new(5, 0);
        let b = Position::new(2, 3);
        let r = Range::ordered(a, b);
        assert_eq!((r.start, r.end), (b, a));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Range::new(Position::new(1, 0), Position::new(1, 5));
        assert!(r.contains(Position::new(1, 0)));
        assert!(!r.contains(Position::new(1, 5)));
        assert!(!Range::point(Position::new(1, 1)).contains(Position::new(1, 1)));
    }

    #[test]
    fn lines_excludes_trailing_column_zero() {
        let r = Range::new(Position::new(1, 2), Position::new(3, 0));
        assert_eq!(r.lines(), 1..=2);
        let r = Range::new(Position::new(1, 2), Position::new(3, 1));
        assert_eq!(r.lines(), 1..=3);
        assert_eq!(Range::point(Position::new(4, 0)).lines(), 4..=4);
    }
}
