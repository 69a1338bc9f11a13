//! UI palette — colors for everything that is not syntax.
//!
//! One field per visual role of the editor chrome. Roles map one-to-one to
//! the surfaces a front-end paints: the text area, the line-number gutter,
//! the status bar, the file sidebar, the toolbar and its buttons.

use crate::color::Rgb;

/// Colors for the editor chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiPalette {
    // ── Text area ─────────────────────────────────────────────
    pub bg: Rgb,
    pub fg: Rgb,
    pub select_bg: Rgb,
    pub select_fg: Rgb,

    // ── Line-number gutter ────────────────────────────────────
    pub line_bg: Rgb,
    pub line_fg: Rgb,

    // ── Status bar ────────────────────────────────────────────
    pub status_bg: Rgb,
    pub status_fg: Rgb,

    // ── Sidebar / toolbar ─────────────────────────────────────
    pub sidebar_bg: Rgb,
    pub sidebar_fg: Rgb,
    pub toolbar_bg: Rgb,
    pub button_bg: Rgb,
    pub button_hover: Rgb,
    pub border: Rgb,
}

impl UiPalette {
    /// Whether the text area background reads as dark.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.bg.luminance() < 0.5
    }

    /// The (fg, bg) pair a front-end should use for a surface.
    #[must_use]
    pub const fn surface(&self, surface: Surface) -> (Rgb, Rgb) {
        match surface {
            Surface::Text => (self.fg, self.bg),
            Surface::Gutter => (self.line_fg, self.line_bg),
            Surface::Status => (self.status_fg, self.status_bg),
            Surface::Sidebar => (self.sidebar_fg, self.sidebar_bg),
            Surface::Toolbar => (self.fg, self.toolbar_bg),
            Surface::Selection => (self.select_fg, self.select_bg),
        }
    }
}

/// A paintable region of the editor chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Text,
    Gutter,
    Status,
    Sidebar,
    Toolbar,
    Selection,
}
