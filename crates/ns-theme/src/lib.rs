//! # ns-theme — Theme engine for notesharp
//!
//! A theme is a fixed, named pairing of a UI palette (editor background,
//! gutter, status bar, sidebar) with a syntax palette (one color per
//! highlight category). The set of themes is closed: [`ThemeName`] enumerates
//! them and [`builtin`] resolves each to a fully populated [`Theme`].
//!
//! # Architecture
//!
//! ```text
//! ThemeName
//!     │
//!     ▼
//! builtin.rs:  ThemeName → Theme { ui: UiPalette, syntax: SyntaxPalette }
//!     │
//!     ▼
//! state.rs:    ThemeState — the single owned "current theme" with
//!              subscribe / set_theme notifications
//! ```
//!
//! There is no process-wide theme. Whoever owns the [`ThemeState`] hands out
//! subscriptions; visual components react to the notifications they receive.

pub mod builtin;
pub mod color;
pub mod palette;
pub mod state;
pub mod syntax;
pub mod theme;

pub use color::Rgb;
pub use state::{SubscriptionId, ThemeState};
pub use theme::{Theme, ThemeName, UnknownTheme};
