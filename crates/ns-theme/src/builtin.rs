//! Builtin themes — light, dark and monokai.
//!
//! Colors are the editor's historical palette, kept exact so existing users
//! see the same colors.

use crate::color::Rgb;
use crate::palette::UiPalette;
use crate::syntax::SyntaxPalette;
use crate::theme::{Theme, ThemeName};

const fn c(packed: u32) -> Rgb {
    Rgb::from_u32(packed)
}

/// Resolve a theme name to its colors.
#[must_use]
pub const fn builtin_theme(name: ThemeName) -> Theme {
    match name {
        ThemeName::Light => Theme {
            name,
            ui: UiPalette {
                bg: c(0xFFFFFF),
                fg: c(0x000000),
                select_bg: c(0x316AC5),
                select_fg: c(0xFFFFFF),
                line_bg: c(0xF5F5F5),
                line_fg: c(0x555555),
                status_bg: c(0xE1E1E1),
                status_fg: c(0x000000),
                sidebar_bg: c(0xF0F0F0),
                sidebar_fg: c(0x000000),
                toolbar_bg: c(0xE8E8E8),
                button_bg: c(0xD0D0D0),
                button_hover: c(0xC0C0C0),
                border: c(0xCCCCCC),
            },
            syntax: SyntaxPalette {
                keyword: c(0x0000FF),
                string: c(0x008000),
                comment: c(0x808080),
                number: c(0xFF0000),
                function: c(0x8B008B),
                class: c(0x2E8B57),
                builtin: c(0x800080),
                operator: c(0x000000),
                bracket: c(0x000000),
                tag: c(0x800000),
                attribute: c(0x008080),
                css_property: c(0x0000FF),
                css_value: c(0x008000),
            },
        },
        ThemeName::Dark => Theme {
            name,
            ui: UiPalette {
                bg: c(0x2B2B2B),
                fg: c(0xFFFFFF),
                select_bg: c(0x4A90E2),
                select_fg: c(0xFFFFFF),
                line_bg: c(0x1E1E1E),
                line_fg: c(0xCCCCCC),
                status_bg: c(0x1A1A1A),
                status_fg: c(0xFFFFFF),
                sidebar_bg: c(0x252526),
                sidebar_fg: c(0xCCCCCC),
                toolbar_bg: c(0x2D2D30),
                button_bg: c(0x3C3C3C),
                button_hover: c(0x4C4C4C),
                border: c(0x464647),
            },
            syntax: SyntaxPalette {
                keyword: c(0x569CD6),
                string: c(0xCE9178),
                comment: c(0x6A9955),
                number: c(0xB5CEA8),
                function: c(0xDCDCAA),
                class: c(0x4EC9B0),
                builtin: c(0xC586C0),
                operator: c(0xD4D4D4),
                bracket: c(0xD4D4D4),
                tag: c(0x569CD6),
                attribute: c(0x92C5F8),
                css_property: c(0x9CDCFE),
                css_value: c(0xCE9178),
            },
        },
        ThemeName::Monokai => Theme {
            name,
            ui: UiPalette {
                bg: c(0x272822),
                fg: c(0xF8F8F2),
                select_bg: c(0x49483E),
                select_fg: c(0xF8F8F2),
                line_bg: c(0x1E1F1C),
                line_fg: c(0x90908A),
                status_bg: c(0x1A1A1A),
                status_fg: c(0xF8F8F2),
                sidebar_bg: c(0x1E1F1C),
                sidebar_fg: c(0xF8F8F2),
                toolbar_bg: c(0x383830),
                button_bg: c(0x49483E),
                button_hover: c(0x5A5A52),
                border: c(0x49483E),
            },
            syntax: SyntaxPalette {
                keyword: c(0xF92672),
                string: c(0xE6DB74),
                comment: c(0x75715E),
                number: c(0xAE81FF),
                function: c(0xA6E22E),
                class: c(0x66D9EF),
                builtin: c(0xF92672),
                operator: c(0xF8F8F2),
                bracket: c(0xF8F8F2),
                tag: c(0xF92672),
                attribute: c(0xA6E22E),
                css_property: c(0x66D9EF),
                css_value: c(0xE6DB74),
            },
        },
    }
}

/// Look up a builtin theme by name string.
///
/// Returns `None` if the name is not recognized.
#[must_use]
pub fn builtin_theme_named(name: &str) -> Option<Theme> {
    ThemeName::from_name(name).map(builtin_theme)
}

/// List all available builtin theme names.
#[must_use]
pub const fn builtin_names() -> &'static [&'static str] {
    &["light", "dark", "monokai"]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
