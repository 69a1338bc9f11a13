//! Theme assembly — the closed set of theme names and the resolved `Theme`.

use std::fmt;
use std::str::FromStr;

use crate::palette::UiPalette;
use crate::syntax::SyntaxPalette;

// ---------------------------------------------------------------------------
// ThemeName
// ---------------------------------------------------------------------------

/// The enumerated set of themes the editor ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
    Monokai,
}

impl ThemeName {
    /// Lowercase identifier, as accepted by [`from_name`](Self::from_name).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Monokai => "monokai",
        }
    }

    /// Parse a theme from its name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        Self::all().iter().find(|t| t.name() == lower).copied()
    }

    /// All themes, in cycling order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Light, Self::Dark, Self::Monokai]
    }

    /// The theme after this one in cycling order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Monokai,
            Self::Monokai => Self::Light,
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThemeName {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// A theme name that is not in the builtin set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = ThemeName::all().iter().map(|t| t.name()).collect();
        write!(
            f,
            "unknown theme '{}' (available: {})",
            self.0,
            known.join(", ")
        )
    }
}

impl std::error::Error for UnknownTheme {}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// A fully resolved theme: chrome colors plus syntax colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: ThemeName,
    pub ui: UiPalette,
    pub syntax: SyntaxPalette,
}

impl Theme {
    /// Whether the text area is dark.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.ui.is_dark()
    }
}
