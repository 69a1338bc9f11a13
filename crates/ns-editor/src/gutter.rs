//! Line-number gutter.
//!
//! The gutter is a read-only column beside the text that scrolls in
//! lockstep with it. [`Gutter`] holds the shared scroll offset; both the
//! text view and the gutter read `top_line` from it, so they can never
//! disagree about which document line a row shows.
//!
//! ```text
//!  gutter   text
//! ┌─────┬──────────────────┐
//! │  12 │ def foo():       │ ← top_line = 11
//! │  13 │     pass         │
//! │  14 │                  │
//! └─────┴──────────────────┘
//! ```

use std::ops::RangeInclusive;

use crate::document::Document;

/// Line numbers for a document: `1..=line_count`. An empty document still
/// has line 1.
#[must_use]
pub fn line_numbers(doc: &Document) -> RangeInclusive<usize> {
    1..=doc.line_count()
}

/// Columns needed for the widest line number.
///
/// | Lines     | Width |
/// |-----------|-------|
/// | 1–999     | 3     |
/// | 1000–9999 | 4     |
#[must_use]
pub fn gutter_width(line_count: usize) -> usize {
    let digits = line_count.max(1).ilog10() as usize + 1;
    digits.max(3)
}

/// Scroll state shared by the text view and the gutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gutter {
    /// First visible document line (0-indexed).
    top_line: usize,
    /// Rows in the viewport.
    height: usize,
    /// Lines in the document at the last sync.
    line_count: usize,
}

impl Default for Gutter {
    fn default() -> Self {
        Self::new(24)
    }
}

impl Gutter {
    #[must_use]
    pub const fn new(height: usize) -> Self {
        Self {
            top_line: 0,
            height,
            line_count: 1,
        }
    }

    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_count
    }

    #[must_use]
    pub fn width(&self) -> usize {
        gutter_width(self.line_count)
    }

    /// Re-read the line count after an edit and keep the scroll valid.
    pub fn sync(&mut self, doc: &Document) {
        self.line_count = doc.line_count();
        self.top_line = self.top_line.min(self.max_top());
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.top_line = self.top_line.min(self.max_top());
    }

    /// Scroll so `top` is the first visible line, clamped to the document.
    pub fn scroll_to(&mut self, top: usize) {
        self.top_line = top.min(self.max_top());
    }

    /// Scroll by a signed number of lines.
    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_to(self.top_line.saturating_add_signed(delta));
    }

    /// Scroll the minimum amount that puts `line` on screen.
    pub fn ensure_visible(&mut self, line: usize) {
        if line < self.top_line {
            self.top_line = line;
        } else if self.height > 0 && line >= self.top_line + self.height {
            self.top_line = line + 1 - self.height;
        }
        self.top_line = self.top_line.min(self.max_top());
    }

    /// Document lines on screen, 0-indexed.
    #[must_use]
    pub fn visible_lines(&self) -> std::ops::Range<usize> {
        let end = (self.top_line + self.height).min(self.line_count);
        self.top_line..end
    }

    /// Right-aligned labels for the rows on screen, one per visible line.
    #[must_use]
    pub fn visible(&self) -> Vec<String> {
        let w = self.width();
        self.visible_lines()
            .map(|l| format!("{:>w$}", l + 1))
            .collect()
    }

    const fn max_top(&self) -> usize {
        self.line_count.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with_lines(n: usize) -> Document {
        Document::from_text(&"x\n".repeat(n - 1))
    }

    #[test]
    fn empty_document_has_line_one() {
        let doc = Document::new();
        assert_eq!(line_numbers(&doc).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn numbers_track_newlines() {
        let doc = Document::from_text("a\nb\n\nc");
        assert_eq!(line_numbers(&doc).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        let doc = Document::from_text("trailing\n");
        assert_eq!(*line_numbers(&doc).end(), 2);
    }

    #[test]
    fn width_has_a_floor() {
        assert_eq!(gutter_width(0), 3);
        assert_eq!(gutter_width(9), 3);
        assert_eq!(gutter_width(999), 3);
        assert_eq!(gutter_width(1000), 4);
        assert_eq!(gutter_width(123_456), 6);
    }

    #[test]
    fn labels_follow_scroll() {
        let doc = doc_with_lines(10);
        let mut g = Gutter::new(3);
        g.sync(&doc);
        assert_eq!(g.visible(), vec!["  1", "  2", "  3"]);
        g.scroll_to(5);
        assert_eq!(g.visible(), vec!["  6", "  7", "  8"]);
        g.scroll_by(-2);
        assert_eq!(g.top_line(), 3);
    }

    #[test]
    fn scroll_is_clamped() {
        let doc = doc_with_lines(4);
        let mut g = Gutter::new(10);
        g.sync(&doc);
        g.scroll_to(100);
        assert_eq!(g.top_line(), 3);
        assert_eq!(g.visible(), vec!["  4"]);
        g.scroll_by(-100);
        assert_eq!(g.top_line(), 0);
    }

    #[test]
    fn sync_after_shrink() {
        let mut g = Gutter::new(2);
        g.sync(&doc_with_lines(20));
        g.scroll_to(15);
        g.sync(&doc_with_lines(5));
        assert_eq!(g.top_line(), 4);
    }

    #[test]
    fn ensure_visible_scrolls_minimally() {
        let mut g = Gutter::new(5);
        g.sync(&doc_with_lines(50));
        g.ensure_visible(7);
        assert_eq!(g.top_line(), 3);
        g.ensure_visible(4);
        assert_eq!(g.top_line(), 3);
        g.ensure_visible(1);
        assert_eq!(g.top_line(), 1);
    }
}
