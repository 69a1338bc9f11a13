//! Pattern-based syntax highlighting.
//!
//! [`highlight`] runs a language's rules over a text in order and returns
//! one [`HighlightSpan`] per match. Spans are layered, not exclusive: when
//! two rules cover the same char, the later rule wins at paint time
//! ([`paint`]). That is how a string rule hides keywords inside the string
//! and how a comment rule hides everything inside the comment.
//!
//! [`HighlightState`] is the per-tab span set. It supports a full pass and
//! a windowed pass over the edited line and its two neighbors; between the
//! edit and the windowed pass, [`HighlightState::apply_edit`] keeps the
//! spans outside the window pointing at the right chars.

use std::ops::Range as StdRange;

use ns_theme::Rgb;
use ns_theme::syntax::SyntaxPalette;
use ropey::Rope;

use crate::language::{Category, Rule};

/// A tagged half-open char range `[start, end)` over the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub category: Category,
}

impl HighlightSpan {
    #[must_use]
    pub const fn new(start: usize, end: usize, category: Category) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

// ---------------------------------------------------------------------------
// One pass
// ---------------------------------------------------------------------------

/// Run `rules` over `text` in order. Offsets are chars from the start of
/// `text`. Deterministic: the same text and rules always give the same
/// spans in the same order.
#[must_use]
pub fn highlight(text: &str, rules: &[Rule]) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    highlight_into(text, rules, 0, &mut spans);
    spans
}

/// Append the spans for `text` to `out`, shifted by `base` chars.
fn highlight_into(text: &str, rules: &[Rule], base: usize, out: &mut Vec<HighlightSpan>) {
    for rule in rules {
        // Match offsets only grow within one rule, so a forward-only
        // byte→char cursor converts them in a single sweep.
        let mut cursor = CharCursor::new(text);
        for caps in rule.regex.captures_iter(text) {
            let Some(m) = caps.get(rule.group) else {
                continue;
            };
            if m.start() == m.end() {
                continue;
            }
            let start = cursor.advance_to(m.start());
            let end = cursor.advance_to(m.end());
            out.push(HighlightSpan::new(base + start, base + end, rule.category));
        }
    }
}

/// Converts increasing byte offsets into char offsets.
struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn advance_to(&mut self, byte: usize) -> usize {
        if byte > self.byte {
            self.chars += self.text[self.byte..byte].chars().count();
            self.byte = byte;
        }
        self.chars
    }
}

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

/// Resolve layered spans to one category per char of `range`.
///
/// Spans are applied in order; a later span overwrites an earlier one.
#[must_use]
pub fn paint(spans: &[HighlightSpan], range: StdRange<usize>) -> Vec<Option<Category>> {
    let mut cells = vec![None; range.len()];
    for span in spans {
        let start = span.start.max(range.start);
        let end = span.end.min(range.end);
        if start >= end {
            continue;
        }
        for cell in &mut cells[start - range.start..end - range.start] {
            *cell = Some(span.category);
        }
    }
    cells
}

/// Theme color for a category.
#[must_use]
pub const fn category_color(category: Category, palette: &SyntaxPalette) -> Rgb {
    match category {
        Category::Keyword => palette.keyword,
        Category::Builtin => palette.builtin,
        Category::String => palette.string,
        Category::Comment => palette.comment,
        Category::Number => palette.number,
        Category::Function => palette.function,
        Category::Class => palette.class,
        Category::Operator => palette.operator,
        Category::Bracket => palette.bracket,
        Category::Tag => palette.tag,
        Category::Attribute => palette.attribute,
        Category::CssProperty => palette.css_property,
        Category::CssValue => palette.css_value,
    }
}

// ---------------------------------------------------------------------------
// Per-tab state
// ---------------------------------------------------------------------------

/// The current span set of one document.
#[derive(Debug, Clone, Default)]
pub struct HighlightState {
    spans: Vec<HighlightSpan>,
}

impl HighlightState {
    #[must_use]
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// Spans in application order.
    #[must_use]
    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Recompute every span over the whole text.
    pub fn refresh_all(&mut self, rope: &Rope, rules: &[Rule]) {
        self.spans.clear();
        if rules.is_empty() {
            return;
        }
        let text = rope.to_string();
        highlight_into(&text, rules, 0, &mut self.spans);
    }

    /// Recompute lines `line - 1 ..= line + 1`, each scanned on its own.
    ///
    /// Old spans inside the window are dropped; spans straddling its edges
    /// are clipped (or split in two) so nothing outside the window changes.
    pub fn refresh_window(&mut self, rope: &Rope, line: usize, rules: &[Rule]) {
        let last = rope.len_lines().saturating_sub(1);
        let line = line.min(last);
        let first = line.saturating_sub(1);
        let end_line = (line + 1).min(last);

        let window_start = rope.line_to_char(first);
        let window_end = line_content_end(rope, end_line);
        self.clip_out(window_start, window_end);

        if rules.is_empty() {
            return;
        }
        for l in first..=end_line {
            let start = rope.line_to_char(l);
            let end = line_content_end(rope, l);
            let text = rope.slice(start..end).to_string();
            highlight_into(&text, rules, start, &mut self.spans);
        }
    }

    /// Shift spans for an edit that replaced `removed` chars at `at` with
    /// `inserted` chars. Spans inside the removed text shrink or vanish.
    pub fn apply_edit(&mut self, at: usize, removed: usize, inserted: usize) {
        let old_end = at + removed;
        let shift = |p: usize| p - removed + inserted;
        self.spans.retain_mut(|span| {
            span.start = if span.start < at {
                span.start
            } else if span.start >= old_end {
                shift(span.start)
            } else {
                at + inserted
            };
            span.end = if span.end <= at {
                span.end
            } else if span.end >= old_end {
                shift(span.end)
            } else {
                at
            };
            !span.is_empty()
        });
    }

    /// Remove `[start, end)` from every span, splitting spans that cover it.
    fn clip_out(&mut self, start: usize, end: usize) {
        let mut kept = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if span.end <= start || span.start >= end {
                kept.push(span);
                continue;
            }
            if span.start < start {
                kept.push(HighlightSpan::new(span.start, start, span.category));
            }
            if span.end > end {
                kept.push(HighlightSpan::new(end, span.end, span.category));
            }
        }
        self.spans = kept;
    }

    /// Per-char categories for one line's content (no line break).
    #[must_use]
    pub fn line_categories(&self, rope: &Rope, line: usize) -> Vec<Option<Category>> {
        if line >= rope.len_lines() {
            return Vec::new();
        }
        let start = rope.line_to_char(line);
        paint(&self.spans, start..line_content_end(rope, line))
    }
}

/// Char index just past a line's content, before its `\n` / `\r\n`.
fn line_content_end(rope: &Rope, line: usize) -> usize {
    let start = rope.line_to_char(line);
    let slice = rope.line(line);
    let mut len = slice.len_chars();
    if len > 0 && slice.char(len - 1) == '\n' {
        len -= 1;
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
    }
    start + len
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Language, LanguageRegistry};
    use pretty_assertions::assert_eq;

    fn registry() -> LanguageRegistry {
        LanguageRegistry::builtin().unwrap()
    }

    fn tagged(text: &str, spans: &[HighlightSpan], category: Category) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        spans
            .iter()
            .filter(|s| s.category == category)
            .map(|s| chars[s.start..s.end].iter().collect())
            .collect()
    }

    /// Resolved category of every char, for comparing two span sets.
    fn resolved(rope: &Rope, spans: &[HighlightSpan]) -> Vec<Option<Category>> {
        paint(spans, 0..rope.len_chars())
    }

    #[test]
    fn python_def_scenario() {
        let reg = registry();
        let text = "def foo():\n    pass\n";
        let spans = highlight(text, reg.rules(Language::Python));

        assert_eq!(tagged(text, &spans, Category::Keyword), vec!["def", "pass"]);
        assert!(tagged(text, &spans, Category::String).is_empty());
        assert!(tagged(text, &spans, Category::Comment).is_empty());

        let cells = paint(&spans, 0..text.chars().count());
        // "foo" is chars 4..7
        assert_eq!(&cells[4..7], &[None, None, None]);
    }

    #[test]
    fn highlight_is_idempotent() {
        let reg = registry();
        let text = "class A:\n    x = 'a#b'  # note\n";
        let rules = reg.rules(Language::Python);
        assert_eq!(highlight(text, rules), highlight(text, rules));
    }

    #[test]
    fn later_rules_win() {
        let reg = registry();
        let text = "x = \"if\"";
        let spans = highlight(text, reg.rules(Language::Python));
        // The keyword rule tags `if`, the string rule runs later and covers it.
        assert_eq!(tagged(text, &spans, Category::Keyword), vec!["if"]);
        let cells = paint(&spans, 0..text.chars().count());
        assert_eq!(cells[5], Some(Category::String));
    }

    #[test]
    fn capture_group_is_tagged() {
        let reg = registry();
        let text = "<a href=\"x\">";
        let spans = highlight(text, reg.rules(Language::Html));
        assert_eq!(tagged(text, &spans, Category::Attribute), vec!["href"]);

        let css = "p { color: red; }";
        let spans = highlight(css, reg.rules(Language::Css));
        assert_eq!(tagged(css, &spans, Category::CssProperty), vec!["color"]);
    }

    #[test]
    fn offsets_are_chars_not_bytes() {
        let reg = registry();
        let text = "é = 'ü' # ok";
        let spans = highlight(text, reg.rules(Language::Python));
        assert_eq!(tagged(text, &spans, Category::String), vec!["'ü'"]);
        assert_eq!(tagged(text, &spans, Category::Comment), vec!["# ok"]);
    }

    #[test]
    fn multiline_block_comment() {
        let reg = registry();
        let text = "a /* one\ntwo */ b";
        let spans = highlight(text, reg.rules(Language::C));
        assert_eq!(tagged(text, &spans, Category::Comment), vec!["/* one\ntwo */"]);
    }

    #[test]
    fn plain_text_has_no_spans() {
        let reg = registry();
        assert!(highlight("def if while", reg.rules(Language::Text)).is_empty());
    }

    #[test]
    fn paint_clips_to_range() {
        let spans = [
            HighlightSpan::new(0, 4, Category::Keyword),
            HighlightSpan::new(2, 6, Category::String),
        ];
        assert_eq!(
            paint(&spans, 1..5),
            vec![
                Some(Category::Keyword),
                Some(Category::String),
                Some(Category::String),
                Some(Category::String),
            ]
        );
    }

    #[test]
    fn apply_edit_shifts_later_spans() {
        let mut state = HighlightState::new();
        state.spans = vec![
            HighlightSpan::new(0, 3, Category::Keyword),
            HighlightSpan::new(10, 12, Category::Number),
        ];
        state.apply_edit(5, 0, 4);
        assert_eq!(state.spans()[0], HighlightSpan::new(0, 3, Category::Keyword));
        assert_eq!(state.spans()[1], HighlightSpan::new(14, 16, Category::Number));

        state.apply_edit(13, 2, 0);
        assert_eq!(state.spans()[1], HighlightSpan::new(13, 14, Category::Number));

        state.apply_edit(0, 3, 0);
        assert_eq!(state.spans().len(), 1);
    }

    #[test]
    fn window_refresh_matches_full_pass() {
        let reg = registry();
        let rules = reg.rules(Language::Python);
        let before = "import os\nx = 1\ny = 'two'\n\ndef f():\n    return x\n";
        let mut rope = Rope::from_str(before);

        let mut state = HighlightState::new();
        state.refresh_all(&rope, rules);

        // Edit line 2: `y = 'two'` → `y = len('two')`
        let at = rope.line_to_char(2) + 4;
        rope.remove(at..at + 5);
        rope.insert(at, "len('two')");
        state.apply_edit(at, 5, 10);
        state.refresh_window(&rope, 2, rules);

        let mut full = HighlightState::new();
        full.refresh_all(&rope, rules);
        assert_eq!(resolved(&rope, state.spans()), resolved(&rope, full.spans()));
    }

    #[test]
    fn window_refresh_splits_straddling_spans() {
        let mut state = HighlightState::new();
        let rope = Rope::from_str("aaaa\nbbbb\ncccc\ndddd\neeee");
        state.spans = vec![HighlightSpan::new(0, 24, Category::Comment)];
        // Window for line 2 covers lines 1..=3: chars 5..19.
        state.refresh_window(&rope, 2, &[]);
        assert_eq!(
            state.spans(),
            &[
                HighlightSpan::new(0, 5, Category::Comment),
                HighlightSpan::new(19, 24, Category::Comment),
            ]
        );
    }

    #[test]
    fn window_at_document_edges() {
        let reg = registry();
        let rules = reg.rules(Language::Python);
        let rope = Rope::from_str("if x:");
        let mut state = HighlightState::new();
        state.refresh_window(&rope, 0, rules);
        assert_eq!(state.spans()[0], HighlightSpan::new(0, 2, Category::Keyword));
        // Past the end clamps to the last line.
        state.refresh_window(&rope, 50, rules);
        assert_eq!(state.spans().len(), 1);
    }

    #[test]
    fn line_categories_excludes_newline() {
        let reg = registry();
        let rope = Rope::from_str("# a\r\nb");
        let mut state = HighlightState::new();
        state.refresh_all(&rope, reg.rules(Language::Python));
        let cells = state.line_categories(&rope, 0);
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|c| *c == Some(Category::Comment)));
    }

    #[test]
    fn category_colors_follow_palette() {
        let theme = ns_theme::builtin::builtin_theme(ns_theme::ThemeName::Monokai);
        assert_eq!(
            category_color(Category::Keyword, &theme.syntax),
            theme.syntax.keyword
        );
        assert_eq!(
            category_color(Category::CssValue, &theme.syntax),
            theme.syntax.css_value
        );
    }
}
