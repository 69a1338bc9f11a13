//! Word completion.
//!
//! Completion starts once the word before the cursor is two chars long.
//! Candidates are the language's keywords and builtins plus the words
//! already in the document (three chars or longer).

use std::collections::BTreeSet;

use crate::document::Document;
use crate::language::Language;

/// Minimum prefix length before candidates are offered.
pub const MIN_PREFIX: usize = 2;
/// Document words shorter than this are not offered.
pub const MIN_DOCUMENT_WORD: usize = 3;
/// Most candidates returned.
pub const MAX_COMPLETIONS: usize = 10;

/// The run of word chars ending at the cursor.
#[must_use]
pub fn word_before_cursor(doc: &Document) -> String {
    let cursor = doc.cursor();
    let Some(line) = doc.line(cursor.line) else {
        return String::new();
    };
    let before: Vec<char> = line.chars().take(cursor.col).collect();
    let start = before
        .iter()
        .rposition(|c| !is_word_char(*c))
        .map_or(0, |i| i + 1);
    before[start..].iter().collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Candidates for `prefix`, sorted and de-duplicated. Empty below
/// [`MIN_PREFIX`] chars.
#[must_use]
pub fn completions(prefix: &str, language: Language, text: &str) -> Vec<String> {
    if prefix.chars().count() < MIN_PREFIX {
        return Vec::new();
    }
    let lower = prefix.to_lowercase();
    let mut found = BTreeSet::new();

    for word in language.keywords().iter().chain(language.builtins()) {
        if word.to_lowercase().starts_with(&lower) {
            found.insert((*word).to_string());
        }
    }
    for word in text.split(|c: char| !is_word_char(c)) {
        if word.chars().count() >= MIN_DOCUMENT_WORD && word != prefix && word.starts_with(prefix) {
            found.insert(word.to_string());
        }
    }
    found.remove(prefix);
    found.into_iter().take(MAX_COMPLETIONS).collect()
}

/// Completions for the word at the document's cursor.
#[must_use]
pub fn complete_at_cursor(doc: &Document) -> (String, Vec<String>) {
    let prefix = word_before_cursor(doc);
    let items = completions(&prefix, doc.language(), &doc.text());
    (prefix, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    #[test]
    fn word_before() {
        let mut doc = Document::from_text("foo.bar_baz qux");
        doc.set_cursor(Position::new(0, 11));
        assert_eq!(word_before_cursor(&doc), "bar_baz");
        doc.set_cursor(Position::new(0, 12));
        assert_eq!(word_before_cursor(&doc), "");
    }

    #[test]
    fn too_short_prefix() {
        assert!(completions("p", Language::Python, "").is_empty());
    }

    #[test]
    fn keywords_and_builtins() {
        let items = completions("pr", Language::Python, "");
        assert_eq!(items, vec!["print", "property"]);
        let items = completions("co", Language::JavaScript, "");
        assert_eq!(items, vec!["console", "const", "continue"]);
    }

    #[test]
    fn keyword_match_ignores_case() {
        assert!(completions("tr", Language::Python, "").contains(&"True".to_string()));
    }

    #[test]
    fn document_words() {
        let text = "total_count = totals + to + total_count";
        let items = completions("tot", Language::Text, text);
        assert_eq!(items, vec!["total_count", "totals"]);
    }

    #[test]
    fn capped() {
        let text = (0..30).map(|i| format!("word{i:02}")).collect::<Vec<_>>().join(" ");
        assert_eq!(completions("wo", Language::Text, &text).len(), MAX_COMPLETIONS);
    }

    #[test]
    fn at_cursor() {
        let mut doc = Document::from_text("values = 1\nval");
        doc.set_cursor(Position::new(1, 3));
        let (prefix, items) = complete_at_cursor(&doc);
        assert_eq!(prefix, "val");
        assert_eq!(items, vec!["values"]);
    }
}
