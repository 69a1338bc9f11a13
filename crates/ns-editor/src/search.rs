//! Find and replace.
//!
//! Matching is literal and case-insensitive unless asked otherwise: the
//! term is escaped and compiled with the regex crate, so there is no user
//! regex mode. Every operation works on the whole document text.
//!
//! # Anchor
//!
//! [`Finder`] remembers where the last hit ended. [`Finder::find_again`]
//! continues from there; a miss resets the anchor to the document start so
//! the next attempt wraps around.
//!
//! [`Finder::replace_next`] always searches from the document start, not
//! from the anchor or the cursor.

use std::fmt;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::document::Document;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A rejected search request. A term that is simply absent is not an
/// error; it is `Ok(None)` / `Ok(0)`.
#[derive(Debug)]
pub enum SearchError {
    /// The search term is empty.
    EmptyTerm,
    /// The term could not be compiled (it exceeded the regex size limit).
    Pattern(regex::Error),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTerm => f.write_str("Search term is empty"),
            Self::Pattern(e) => write!(f, "invalid search term: {e}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyTerm => None,
            Self::Pattern(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// One occurrence of the search term.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    /// Start position of the match (line, col).
    pub start: Position,
    /// Absolute char index of the start.
    pub char_start: usize,
    /// Length of the match in characters.
    pub len: usize,
}

impl Match {
    /// Char index just past the match.
    #[inline]
    #[must_use]
    pub const fn char_end(&self) -> usize {
        self.char_start + self.len
    }
}

// ---------------------------------------------------------------------------
// Finder
// ---------------------------------------------------------------------------

/// Search anchor plus the case setting used by replace.
#[derive(Debug, Clone)]
pub struct Finder {
    anchor: usize,
    case_insensitive: bool,
}

impl Default for Finder {
    fn default() -> Self {
        Self::new()
    }
}

impl Finder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchor: 0,
            case_insensitive: true,
        }
    }

    /// Char index the next [`find_again`](Self::find_again) starts from.
    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> usize {
        self.anchor
    }

    pub const fn reset(&mut self) {
        self.anchor = 0;
    }

    #[inline]
    #[must_use]
    pub const fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Case setting for `replace_next` / `replace_all`.
    pub const fn set_case_insensitive(&mut self, on: bool) {
        self.case_insensitive = on;
    }

    /// First occurrence of `term` at or after `from`, clamped into the document.
    ///
    /// On a hit the anchor moves to the end of the match; on a miss it
    /// resets to the document start. The document is never modified.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyTerm`] when `term` is empty.
    pub fn find_next(
        &mut self,
        doc: &Document,
        term: &str,
        from: Position,
        case_insensitive: bool,
    ) -> Result<Option<Match>, SearchError> {
        let from = doc
            .pos_to_char_idx(doc.clamp_position(from))
            .unwrap_or_else(|| doc.len_chars());
        self.find_from(doc, term, from, case_insensitive)
    }

    /// Continue from the anchor.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyTerm`] when `term` is empty.
    pub fn find_again(
        &mut self,
        doc: &Document,
        term: &str,
        case_insensitive: bool,
    ) -> Result<Option<Match>, SearchError> {
        let from = self.anchor.min(doc.len_chars());
        self.find_from(doc, term, from, case_insensitive)
    }

    fn find_from(
        &mut self,
        doc: &Document,
        term: &str,
        from: usize,
        case_insensitive: bool,
    ) -> Result<Option<Match>, SearchError> {
        let re = compile(term, case_insensitive)?;
        let text = doc.text();
        let byte_from = doc.rope().char_to_byte(from);
        let found = re
            .find_at(&text, byte_from)
            .map(|m| to_match(doc, m.start(), m.end()));
        match found {
            Some(m) => self.anchor = m.char_end(),
            None => {
                debug!(term, "no further occurrences");
                self.anchor = 0;
            }
        }
        Ok(found)
    }

    /// Replace the first occurrence of `term` in the document. Returns
    /// whether anything was replaced.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyTerm`] when `term` is empty.
    pub fn replace_next(
        &mut self,
        doc: &mut Document,
        term: &str,
        replacement: &str,
    ) -> Result<bool, SearchError> {
        let re = compile(term, self.case_insensitive)?;
        let text = doc.text();
        let Some(m) = re.find(&text) else {
            return Ok(false);
        };
        let found = to_match(doc, m.start(), m.end());
        doc.replace_chars(found.char_start, found.char_end(), replacement);
        self.anchor = found.char_start + replacement.chars().count();
        Ok(true)
    }

    /// Replace every occurrence of `term` and return how many were
    /// replaced.
    ///
    /// One forward scan over the original text: inserted replacement text is
    /// never searched again, so a replacement that contains `term` cannot
    /// loop.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyTerm`] when `term` is empty.
    pub fn replace_all(
        &mut self,
        doc: &mut Document,
        term: &str,
        replacement: &str,
    ) -> Result<usize, SearchError> {
        let re = compile(term, self.case_insensitive)?;
        let text = doc.text();
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut count = 0;
        for m in re.find_iter(&text) {
            out.push_str(&text[last..m.start()]);
            out.push_str(replacement);
            last = m.end();
            count += 1;
        }
        if count > 0 {
            out.push_str(&text[last..]);
            doc.set_text(&out);
            self.anchor = 0;
        }
        debug!(term, count, "replace all");
        Ok(count)
    }
}

/// Every occurrence of `term`, in document order.
///
/// # Errors
///
/// [`SearchError::EmptyTerm`] when `term` is empty.
pub fn find_all(
    doc: &Document,
    term: &str,
    case_insensitive: bool,
) -> Result<Vec<Match>, SearchError> {
    let re = compile(term, case_insensitive)?;
    let text = doc.text();
    Ok(re
        .find_iter(&text)
        .map(|m| to_match(doc, m.start(), m.end()))
        .collect())
}

fn compile(term: &str, case_insensitive: bool) -> Result<Regex, SearchError> {
    if term.is_empty() {
        return Err(SearchError::EmptyTerm);
    }
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(case_insensitive)
        .build()
        .map_err(SearchError::Pattern)
}

fn to_match(doc: &Document, byte_start: usize, byte_end: usize) -> Match {
    let rope = doc.rope();
    let char_start = rope.byte_to_char(byte_start);
    let char_end = rope.byte_to_char(byte_end);
    let line = rope.char_to_line(char_start);
    Match {
        start: Position::new(line, char_start - rope.line_to_char(line)),
        char_start,
        len: char_end - char_start,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
