//! # ns-editor — Editing core for notesharp
//!
//! Everything a notepad-style front-end needs below the widget layer:
//!
//! - **[`position`]** — `Position` (line, col) and `Range`, 0-indexed
//! - **[`document`]** — `Document`: rope-backed text, path, dirty flag, language, cursor
//! - **[`gutter`]** — line-number projection that scrolls in lockstep with the text view
//! - **[`status`]** — character / word / line / paragraph / selection counts
//! - **[`language`]** — extension lookup and the compiled regex rule tables
//! - **[`highlight`]** — rule-ordered pattern highlighting, full pass or ±1-line window
//! - **[`search`]** — find next, replace next, replace all
//! - **[`edit`]** — line operations: duplicate, move, join, toggle comment
//! - **[`complete`]** — keyword and document-word completion
//! - **[`session`]** — tabs, each owning one document and its derived views
//! - **[`explorer`]** — the file sidebar: sorted listing, folder navigation
//! - **[`autosave`]** — re-armed auto-save deadline
//! - **[`action`]** — the enumerated set of user actions
//! - **[`config`]** / **[`options`]** — editor options and `set key=value` parsing
//! - **[`error`]** — the error taxonomy surfaced to the user as notices
//!
//! All of it is single-threaded. The only shared value is the
//! [`LanguageRegistry`](language::LanguageRegistry), which is immutable after
//! construction and handed around as an `Arc`.

pub mod action;
pub mod autosave;
pub mod complete;
pub mod config;
pub mod document;
pub mod edit;
pub mod error;
pub mod explorer;
pub mod gutter;
pub mod highlight;
pub mod language;
pub mod options;
pub mod position;
pub mod search;
pub mod session;
pub mod status;

pub use error::{EditorError, Result};
