//! Document — the live text of one open file.
//!
//! A `Document` wraps a [`ropey::Rope`] with the editing operations the rest
//! of the core needs, coordinate conversion between [`Position`] and rope
//! char indices, whole-file I/O, and the metadata a tab displays: path,
//! dirty flag, language, cursor, selection.
//!
//! # Design choices
//!
//! - **Columns are char offsets.** Byte offsets never leak into the API.
//!
//! - **Only `\n` breaks lines.** The rope is built without CR or Unicode line
//!   breaks, so `line_count() == text.count('\n') + 1` always holds. A
//!   `\r\n` file keeps its `\r` at the end of each line's content.
//!
//! - **Reads are lossy, writes are strict.** Invalid UTF-8 on load becomes
//!   U+FFFD instead of an error; the in-memory text is always valid UTF-8, so
//!   writes cannot fail on encoding.
//!
//! - **Dirty tracking is a single flag.** Any mutation sets it; a successful
//!   load or save clears it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ropey::{Rope, RopeSlice};
use tracing::{debug, info};

use crate::error::{EditorError, Result};
use crate::language::Language;
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of a file, detected from its first line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect the style of the first line break. Defaults to `Lf`.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The mutable text of one open file plus its metadata.
///
/// # Coordinate system
///
/// Positions are 0-indexed `(line, col)` pairs with `col` in chars. Use
/// [`pos_to_char_idx`](Self::pos_to_char_idx) and
/// [`char_idx_to_pos`](Self::char_idx_to_pos) to convert to absolute char
/// offsets, which is what highlighting and search work in.
pub struct Document {
    rope: Rope,
    path: Option<PathBuf>,
    dirty: bool,
    language: Language,
    cursor: Position,
    selection: Option<Range>,
    line_ending: LineEnding,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// An empty, untitled, clean document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            path: None,
            dirty: false,
            language: Language::Text,
            cursor: Position::ZERO,
            selection: None,
            line_ending: LineEnding::Lf,
        }
    }

    /// A clean, untitled document holding `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            line_ending: LineEnding::detect(text),
            ..Self::new()
        }
    }

    /// Load a document from disk.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD. The language is detected from
    /// the file extension. The document starts clean.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Io`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| EditorError::io(path, e))?;
        let text = String::from_utf8_lossy(&bytes);
        info!(path = %path.display(), bytes = bytes.len(), "loaded file");
        Ok(Self {
            path: Some(path.to_path_buf()),
            language: Language::from_path(path),
            ..Self::from_text(&text)
        })
    }

    // -- Text access --------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of lines: `count('\n') + 1`. An empty document has one line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// A line including its trailing `\n`, if any.
    #[inline]
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        (line < self.rope.len_lines()).then(|| self.rope.line(line))
    }

    /// A line's text without its line break (`\n` or `\r\n`).
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<String> {
        self.line(line).map(|l| {
            let mut s = l.to_string();
            if s.ends_with('\n') {
                s.pop();
                if s.ends_with('\r') {
                    s.pop();
                }
            }
            s
        })
    }

    /// Chars in a line excluding its line break.
    #[must_use]
    pub fn line_content_len(&self, line: usize) -> Option<usize> {
        self.line(line).map(|l| {
            let total = l.len_chars();
            if total > 0 && l.char(total - 1) == '\n' {
                if total >= 2 && l.char(total - 2) == '\r' {
                    total - 2
                } else {
                    total - 1
                }
            } else {
                total
            }
        })
    }

    /// All text as a `String`. Allocates.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of a range, if both ends are valid.
    #[must_use]
    pub fn slice(&self, range: Range) -> Option<String> {
        let start = self.pos_to_char_idx(range.start)?;
        let end = self.pos_to_char_idx(range.end)?;
        Some(self.rope.slice(start..end).to_string())
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Convert a position to an absolute char index.
    ///
    /// `col` may equal the line's full length (including the line break),
    /// which addresses the slot just past the last char.
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        if pos.line >= self.rope.len_lines() {
            return None;
        }
        let line_start = self.rope.line_to_char(pos.line);
        let line_len = self.rope.line(pos.line).len_chars();
        (pos.col <= line_len).then_some(line_start + pos.col)
    }

    /// Convert an absolute char index to a position. `len_chars()` is valid.
    #[must_use]
    pub fn char_idx_to_pos(&self, char_idx: usize) -> Option<Position> {
        if char_idx > self.rope.len_chars() {
            return None;
        }
        let line = self.rope.char_to_line(char_idx);
        Some(Position::new(line, char_idx - self.rope.line_to_char(line)))
    }

    /// Clamp a position to the nearest valid cursor position.
    #[must_use]
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        let max_col = self.line_content_len(line).unwrap_or(0);
        Position::new(line, pos.col.min(max_col))
    }

    // -- Editing ------------------------------------------------------------

    /// Insert text at a position.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidPosition`] if `pos` is outside the
    /// document; nothing changes in that case.
    pub fn insert(&mut self, pos: Position, text: &str) -> Result<()> {
        let idx = self
            .pos_to_char_idx(pos)
            .ok_or(EditorError::InvalidPosition(pos))?;
        self.insert_at(idx, text);
        Ok(())
    }

    /// Delete the text in a range. An empty range is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidPosition`] if either end is outside the
    /// document.
    pub fn delete(&mut self, range: Range) -> Result<()> {
        let (start, end) = self.char_bounds(range)?;
        self.replace_chars(start, end, "");
        Ok(())
    }

    /// Replace the text in a range.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidPosition`] if either end is outside the
    /// document.
    pub fn replace(&mut self, range: Range, text: &str) -> Result<()> {
        let (start, end) = self.char_bounds(range)?;
        self.replace_chars(start, end, text);
        Ok(())
    }

    /// Insert at an absolute char index. Callers have already validated it.
    pub(crate) fn insert_at(&mut self, idx: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.rope.insert(idx, text);
        self.touch();
    }

    /// Replace `[start, end)` in char indices. Callers have already
    /// validated the bounds.
    pub(crate) fn replace_chars(&mut self, start: usize, end: usize, text: &str) {
        if start == end && text.is_empty() {
            return;
        }
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.touch();
    }

    /// Replace the whole text. Marks the document dirty.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.touch();
    }

    fn char_bounds(&self, range: Range) -> Result<(usize, usize)> {
        let start = self
            .pos_to_char_idx(range.start)
            .ok_or(EditorError::InvalidPosition(range.start))?;
        let end = self
            .pos_to_char_idx(range.end)
            .ok_or(EditorError::InvalidPosition(range.end))?;
        Ok((start, end))
    }

    /// After any mutation: dirty, and cursor/selection still inside the text.
    fn touch(&mut self) {
        self.dirty = true;
        self.cursor = self.clamp_position(self.cursor);
        if let Some(sel) = self.selection {
            let a = self.clamp_position(sel.start);
            let b = self.clamp_position(sel.end);
            self.selection = (a != b).then(|| Range::ordered(a, b));
        }
    }

    // -- Cursor & selection -------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor, clamped to the document.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = self.clamp_position(pos);
    }

    #[inline]
    #[must_use]
    pub const fn selection(&self) -> Option<Range> {
        self.selection
    }

    /// Select between two positions (any order). An empty selection clears it.
    pub fn select(&mut self, a: Position, b: Position) {
        let a = self.clamp_position(a);
        let b = self.clamp_position(b);
        self.selection = (a != b).then(|| Range::ordered(a, b));
        self.cursor = b;
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// The selected text, or an empty string when nothing is selected.
    #[must_use]
    pub fn selected_text(&self) -> String {
        self.selection
            .and_then(|r| self.slice(r))
            .unwrap_or_default()
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The file name shown in tab titles, or `None` when untitled.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// True once the text diverges from the last load or save.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub const fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Override the highlighting language. Does not dirty the document.
    #[inline]
    pub const fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    // -- File I/O -----------------------------------------------------------

    /// Write the document to its path.
    ///
    /// # Errors
    ///
    /// [`EditorError::NoPath`] for an untitled document, or
    /// [`EditorError::Io`] if the write fails (the document stays dirty).
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(EditorError::NoPath)?;
        self.save_as(&path)
    }

    /// Write the document to `path` and adopt it as the document's path.
    ///
    /// The bytes written are exactly [`text`](Self::text); line breaks are
    /// not rewritten. The language is re-detected when the document had no
    /// path before.
    ///
    /// # Errors
    ///
    /// [`EditorError::Io`] if the write fails; path, dirty flag and language
    /// are left untouched in that case.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        fs::write(path, self.text().as_bytes()).map_err(|e| EditorError::io(path, e))?;
        if self.path.is_none() {
            self.language = Language::from_path(path);
        }
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        debug!(path = %path.display(), chars = self.len_chars(), "saved file");
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("dirty", &self.dirty)
            .field("language", &self.language)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
