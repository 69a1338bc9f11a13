//! Status bar counts.
//!
//! [`Stats`] is a pure function of the document text, the selection and the
//! cursor; it is recomputed after every edit and every selection change.
//! [`StatusLine`] formats it into the two halves of the status bar.

use std::fmt;

use unicode_width::UnicodeWidthChar;

use crate::document::Document;
use crate::position::Position;

/// Tab stop used when converting the cursor column for display.
pub const TAB_WIDTH: usize = 4;

/// Counts shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Chars, not counting trailing newlines.
    pub chars: usize,
    /// `count('\n') + 1`.
    pub lines: usize,
    /// Whitespace-delimited tokens.
    pub words: usize,
    /// Blank-line separators + 1.
    pub paragraphs: usize,
    /// Chars in the selection; 0 without one.
    pub selected: usize,
}

impl Stats {
    /// Count `text` with `selected` chars selected.
    #[must_use]
    pub fn compute(text: &str, selected: usize) -> Self {
        Self {
            chars: text.trim_end_matches('\n').chars().count(),
            lines: text.matches('\n').count() + 1,
            words: text.split_whitespace().count(),
            paragraphs: text.matches("\n\n").count() + 1,
            selected,
        }
    }

    /// Count a document, including its current selection.
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        let selected = doc
            .selection()
            .and_then(|r| {
                let start = doc.pos_to_char_idx(r.start)?;
                let end = doc.pos_to_char_idx(r.end)?;
                Some(end - start)
            })
            .unwrap_or(0);
        Self::compute(&doc.text(), selected)
    }
}

/// Convert a char column to a display column.
///
/// Tabs advance to the next tab stop; wide chars take two columns. Stops at
/// `char_col` or at the end of the line.
#[must_use]
pub fn char_col_to_display_col<I: Iterator<Item = char>>(
    chars: I,
    char_col: usize,
    tab_width: usize,
) -> usize {
    let tab_w = tab_width.max(1);
    let mut display_col = 0;
    for (i, ch) in chars.enumerate() {
        if i >= char_col {
            break;
        }
        match ch {
            '\n' | '\r' => break,
            '\t' => display_col = (display_col / tab_w + 1) * tab_w,
            _ => display_col += ch.width().unwrap_or(0),
        }
    }
    display_col
}

/// Char indices where a word-wrapped line starts a new row.
///
/// A row breaks after the last space that fits in `width` cells, or inside
/// the word when no space does. Tabs take [`TAB_WIDTH`] cells. Empty for a
/// line that fits.
#[must_use]
pub fn wrap_breaks(chars: &[char], width: usize) -> Vec<usize> {
    let cells = |ch: char| if ch == '\t' { TAB_WIDTH } else { ch.width().unwrap_or(0) };
    let width = width.max(1);
    let mut breaks = Vec::new();
    let (mut row_start, mut col, mut after_space) = (0, 0, None);
    for (i, &ch) in chars.iter().enumerate() {
        let w = cells(ch);
        if col + w > width && i > row_start {
            let at = after_space.filter(|s| *s > row_start).unwrap_or(i);
            breaks.push(at);
            row_start = at;
            col = chars[at..i].iter().map(|c| cells(*c)).sum();
            after_space = None;
        }
        col += w;
        if ch == ' ' {
            after_space = Some(i + 1);
        }
    }
    breaks
}

/// Markers shown after the language name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusMarkers {
    pub read_only: bool,
    pub locked: bool,
}

/// The two halves of the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub left: String,
    pub right: String,
}

impl StatusLine {
    /// Format the status bar for a document.
    #[must_use]
    pub fn new(doc: &Document, stats: &Stats, markers: StatusMarkers) -> Self {
        let mut left = format!(
            "Lines: {} | Words: {} | Characters: {}",
            stats.lines, stats.words, stats.chars
        );
        if stats.selected > 0 {
            left.push_str(&format!(" | Selected: {}", stats.selected));
        }

        let cursor = doc.cursor();
        let mut right = format!("Ln {}, Col {}", cursor.line + 1, display_col(doc, cursor) + 1);
        if doc.path().is_some() {
            right.push_str(" | UTF-8");
        }
        right.push_str(" | ");
        right.push_str(doc.language().display_name());
        if markers.read_only {
            right.push_str(" [RO]");
        }
        if markers.locked {
            right.push_str(" [Locked]");
        }
        Self { left, right }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}    {}", self.left, self.right)
    }
}

fn display_col(doc: &Document, cursor: Position) -> usize {
    doc.line(cursor.line)
        .map_or(0, |line| char_col_to_display_col(line.chars(), cursor.col, TAB_WIDTH))
}
