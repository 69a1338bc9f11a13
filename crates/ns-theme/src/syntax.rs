//! Syntax palette — one color per highlight category.
//!
//! The categories are the ones the regex rule tables emit. Languages use a
//! subset (HTML never produces `css_value`, Python never produces `tag`), but
//! every theme defines all of them so a front-end never has to fall back.

use crate::color::Rgb;

/// Colors for highlighted tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxPalette {
    pub keyword: Rgb,
    pub string: Rgb,
    pub comment: Rgb,
    pub number: Rgb,
    pub function: Rgb,
    pub class: Rgb,
    pub builtin: Rgb,
    pub operator: Rgb,
    pub bracket: Rgb,

    // ── Markup ────────────────────────────────────────────────
    pub tag: Rgb,
    pub attribute: Rgb,

    // ── Stylesheets ───────────────────────────────────────────
    pub css_property: Rgb,
    pub css_value: Rgb,
}

impl SyntaxPalette {
    /// Whether the category is drawn bold (keywords, classes, functions).
    #[must_use]
    pub fn is_bold(field: &str) -> bool {
        matches!(field, "keyword" | "class" | "function")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_categories() {
        assert!(SyntaxPalette::is_bold("keyword"));
        assert!(SyntaxPalette::is_bold("function"));
        assert!(!SyntaxPalette::is_bold("string"));
    }
}
