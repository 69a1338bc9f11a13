//! Line operations: duplicate, move, join, comment toggling, go-to-line.
//!
//! Each operation works on the cursor's line (or a line range), edits the
//! document through its char-index API, and returns whether the text
//! changed. None of them can leave the document invalid; out-of-range lines
//! are clamped or turn the operation into a no-op.

use std::ops::RangeInclusive;

use chrono::NaiveDateTime;

use crate::document::Document;
use crate::language::CommentStyle;
use crate::position::Position;

/// Layout of the text typed by the timestamp action.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[must_use]
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Char bounds of one line: start, end of content, end including break.
#[derive(Debug, Clone, Copy)]
struct LineSpan {
    start: usize,
    content_end: usize,
    end: usize,
}

fn line_span(doc: &Document, line: usize) -> Option<LineSpan> {
    let slice = doc.line(line)?;
    let start = doc.rope().line_to_char(line);
    let content = doc.line_content_len(line)?;
    Some(LineSpan {
        start,
        content_end: start + content,
        end: start + slice.len_chars(),
    })
}

fn chars(doc: &Document, from: usize, to: usize) -> String {
    doc.rope().slice(from..to).to_string()
}

/// Copy the cursor's line below itself and move the cursor onto the copy.
pub fn duplicate_line(doc: &mut Document) -> bool {
    let cursor = doc.cursor();
    let Some(span) = line_span(doc, cursor.line) else {
        return false;
    };
    let content = chars(doc, span.start, span.content_end);
    let newline = doc.line_ending().as_str();
    doc.insert_at(span.content_end, &format!("{newline}{content}"));
    doc.set_cursor(Position::new(cursor.line + 1, cursor.col));
    true
}

/// Swap the cursor's line with the one above. The cursor follows the line.
pub fn move_line_up(doc: &mut Document) -> bool {
    let cursor = doc.cursor();
    if cursor.line == 0 {
        return false;
    }
    swap_with_next(doc, cursor.line - 1);
    doc.set_cursor(Position::new(cursor.line - 1, cursor.col));
    true
}

/// Swap the cursor's line with the one below. The cursor follows the line.
pub fn move_line_down(doc: &mut Document) -> bool {
    let cursor = doc.cursor();
    if cursor.line + 1 >= doc.line_count() {
        return false;
    }
    swap_with_next(doc, cursor.line);
    doc.set_cursor(Position::new(cursor.line + 1, cursor.col));
    true
}

/// Swap lines `line` and `line + 1`, keeping the break between them.
fn swap_with_next(doc: &mut Document, line: usize) {
    let (Some(a), Some(b)) = (line_span(doc, line), line_span(doc, line + 1)) else {
        return;
    };
    let first = chars(doc, a.start, a.content_end);
    let brk = chars(doc, a.content_end, a.end);
    let second = chars(doc, b.start, b.content_end);
    doc.replace_chars(a.start, b.content_end, &format!("{second}{brk}{first}"));
}

/// Join the cursor's line with the next one: a single space, the next line
/// left-trimmed.
pub fn join_lines(doc: &mut Document) -> bool {
    let cursor = doc.cursor();
    let (Some(a), Some(b)) = (line_span(doc, cursor.line), line_span(doc, cursor.line + 1)) else {
        return false;
    };
    let next = chars(doc, b.start, b.content_end);
    let joined = format!(" {}", next.trim_start());
    let col = a.content_end - a.start;
    doc.replace_chars(a.content_end, b.content_end, &joined);
    doc.set_cursor(Position::new(cursor.line, col));
    true
}

/// Lines a toggle-comment applies to: the selected lines, or the cursor's.
#[must_use]
pub fn target_lines(doc: &Document) -> RangeInclusive<usize> {
    doc.selection()
        .map_or_else(|| doc.cursor().line..=doc.cursor().line, |r| r.lines())
}

/// Comment or uncomment `lines`.
///
/// If every non-blank line is already commented, the markers are removed.
/// Otherwise every non-blank line gets a marker at its indentation. Blank
/// lines are never touched.
pub fn toggle_comment(doc: &mut Document, lines: RangeInclusive<usize>, style: CommentStyle) -> bool {
    let last = doc.line_count() - 1;
    let lines = *lines.start()..=(*lines.end()).min(last);
    if lines.is_empty() {
        return false;
    }

    let contents: Vec<(LineSpan, String)> = lines
        .clone()
        .filter_map(|l| line_span(doc, l))
        .map(|s| (s, chars(doc, s.start, s.content_end)))
        .collect();

    let all_commented = contents
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .all(|(_, text)| is_commented(text, style));

    let mut changed = false;
    // Bottom-up so earlier char indices stay valid.
    for (span, text) in contents.iter().rev() {
        if text.trim().is_empty() {
            continue;
        }
        let new = if all_commented {
            uncomment(text, style)
        } else {
            comment(text, style)
        };
        if new != *text {
            doc.replace_chars(span.start, span.content_end, &new);
            changed = true;
        }
    }
    changed
}

fn is_commented(text: &str, style: CommentStyle) -> bool {
    let t = text.trim();
    t.starts_with(style.open) && style.close.is_none_or(|c| t.ends_with(c))
}

fn comment(text: &str, style: CommentStyle) -> String {
    let body = text.trim_start();
    let indent = &text[..text.len() - body.len()];
    match style.close {
        Some(close) => format!("{indent}{} {body} {close}", style.open),
        None => format!("{indent}{} {body}", style.open),
    }
}

fn uncomment(text: &str, style: CommentStyle) -> String {
    let body = text.trim_start();
    let indent = &text[..text.len() - body.len()];
    let Some(rest) = body.strip_prefix(style.open) else {
        return text.to_string();
    };
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    let rest = match style.close {
        Some(close) => {
            let r = rest.trim_end();
            let r = r.strip_suffix(close).unwrap_or(r);
            r.strip_suffix(' ').unwrap_or(r)
        }
        None => rest,
    };
    format!("{indent}{rest}")
}

/// Move the cursor to the start of a 1-based line, clamped to the document.
pub fn goto_line(doc: &mut Document, line: usize) -> Position {
    let target = line.clamp(1, doc.line_count()) - 1;
    doc.clear_selection();
    doc.set_cursor(Position::new(target, 0));
    doc.cursor()
}

/// Select the cursor's line content.
pub fn select_line(doc: &mut Document) {
    let line = doc.cursor().line;
    let len = doc.line_content_len(line).unwrap_or(0);
    doc.select(Position::new(line, 0), Position::new(line, len));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use pretty_assertions::assert_eq;

    fn doc_at(text: &str, line: usize, col: usize) -> Document {
        let mut doc = Document::from_text(text);
        doc.set_cursor(Position::new(line, col));
        doc
    }

    #[test]
    fn timestamp_layout() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 4, 7)
            .unwrap();
        assert_eq!(format_timestamp(at), "2024-05-01 09:04:07");
    }

    #[test]
    fn duplicate() {
        let mut doc = doc_at("a\nb\nc", 1, 1);
        assert!(duplicate_line(&mut doc));
        assert_eq!(doc.text(), "a\nb\nb\nc");
        assert_eq!(doc.cursor(), Position::new(2, 1));
        assert!(doc.is_dirty());
    }

    #[test]
    fn duplicate_last_line_without_newline() {
        let mut doc = doc_at("x\ny", 1, 0);
        duplicate_line(&mut doc);
        assert_eq!(doc.text(), "x\ny\ny");
    }

    #[test]
    fn move_up_and_down() {
        let mut doc = doc_at("one\ntwo\nthree", 1, 2);
        assert!(move_line_up(&mut doc));
        assert_eq!(doc.text(), "two\none\nthree");
        assert_eq!(doc.cursor(), Position::new(0, 2));
        assert!(!move_line_up(&mut doc));

        doc.set_cursor(Position::new(1, 0));
        assert!(move_line_down(&mut doc));
        assert_eq!(doc.text(), "two\nthree\none");
        assert!(!move_line_down(&mut doc));
    }

    #[test]
    fn move_keeps_crlf() {
        let mut doc = doc_at("a\r\nb\r\n", 0, 0);
        move_line_down(&mut doc);
        assert_eq!(doc.text(), "b\r\na\r\n");
    }

    #[test]
    fn join() {
        let mut doc = doc_at("let x =\n    42;\nend", 0, 0);
        assert!(join_lines(&mut doc));
        assert_eq!(doc.text(), "let x = 42;\nend");
        assert_eq!(doc.cursor(), Position::new(0, 7));

        let mut doc = doc_at("only", 0, 0);
        assert!(!join_lines(&mut doc));
    }

    #[test]
    fn comment_roundtrip_python() {
        let original = "def f():\n    x = 1\n\n    return x\n";
        let mut doc = Document::from_text(original);
        let style = Language::Python.comment_style();

        assert!(toggle_comment(&mut doc, 0..=3, style));
        assert_eq!(doc.text(), "# def f():\n    # x = 1\n\n    # return x\n");

        assert!(toggle_comment(&mut doc, 0..=3, style));
        assert_eq!(doc.text(), original);
    }

    #[test]
    fn mixed_lines_get_commented() {
        let mut doc = Document::from_text("// a\nb");
        toggle_comment(&mut doc, 0..=1, Language::Rust.comment_style());
        assert_eq!(doc.text(), "// // a\n// b");
    }

    #[test]
    fn block_comment_styles() {
        let mut doc = Document::from_text("  color: red;");
        let style = Language::Css.comment_style();
        toggle_comment(&mut doc, 0..=0, style);
        assert_eq!(doc.text(), "  /* color: red; */");
        toggle_comment(&mut doc, 0..=0, style);
        assert_eq!(doc.text(), "  color: red;");

        let mut doc = Document::from_text("<p>hi</p>");
        toggle_comment(&mut doc, 0..=0, Language::Html.comment_style());
        assert_eq!(doc.text(), "<!-- <p>hi</p> -->");
    }

    #[test]
    fn blank_only_range_is_noop() {
        let mut doc = Document::from_text("\n   \n");
        assert!(!toggle_comment(&mut doc, 0..=2, Language::Python.comment_style()));
        assert!(!doc.is_dirty());
    }

    #[test]
    fn target_lines_from_selection() {
        let mut doc = Document::from_text("a\nb\nc\nd");
        doc.set_cursor(Position::new(2, 0));
        assert_eq!(target_lines(&doc), 2..=2);
        doc.select(Position::new(0, 0), Position::new(2, 0));
        assert_eq!(target_lines(&doc), 0..=1);
    }

    #[test]
    fn goto_clamps() {
        let mut doc = Document::from_text("a\nb\nc");
        assert_eq!(goto_line(&mut doc, 2), Position::new(1, 0));
        assert_eq!(goto_line(&mut doc, 99), Position::new(2, 0));
        assert_eq!(goto_line(&mut doc, 0), Position::new(0, 0));
    }

    #[test]
    fn select_current_line() {
        let mut doc = doc_at("abc\ndefg", 1, 2);
        select_line(&mut doc);
        assert_eq!(doc.selected_text(), "defg");
    }
}
