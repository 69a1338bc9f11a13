//! Error taxonomy for the editing core.
//!
//! Every variant is recoverable. The front-end turns any of them into a
//! notice and returns to an interactive, still-usable editor; nothing here is
//! fatal and nothing here panics.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::position::Position;
use crate::search::SearchError;
use crate::session::TabId;

/// Every error the editing core reports.
#[derive(Debug)]
pub enum EditorError {
    /// A file could not be read or written. The document is unchanged.
    Io {
        /// The file involved.
        path: PathBuf,
        source: io::Error,
    },

    /// An edit addressed a position outside the document.
    InvalidPosition(Position),

    /// Tried to close the only remaining tab.
    LastTab,

    /// The tab is locked against closing and saving.
    Locked,

    /// The tab is read-only; edits and saves are refused.
    ReadOnly,

    /// No tab has this id.
    NoSuchTab(TabId),

    /// Saving an untitled document without choosing a path.
    NoPath,

    /// A find/replace request was rejected.
    Search(SearchError),

    /// A `set` directive named an unknown option or carried a bad value.
    InvalidOption(String),

    /// The explorer was sent somewhere that is not a directory.
    NotADirectory(PathBuf),

    /// The explorer listing has no row with this name.
    NoSuchEntry(String),
}

impl EditorError {
    /// Attach a path to an I/O error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InvalidPosition(pos) => write!(f, "position {pos} is outside the document"),
            Self::LastTab => f.write_str("Cannot close the last tab"),
            Self::Locked => f.write_str("This tab is locked"),
            Self::ReadOnly => f.write_str("This tab is read-only"),
            Self::NoSuchTab(id) => write!(f, "no tab {id}"),
            Self::NoPath => f.write_str("No file name given"),
            Self::Search(e) => write!(f, "{e}"),
            Self::InvalidOption(msg) => write!(f, "{msg}"),
            Self::NotADirectory(path) => write!(f, "{}: not a directory", path.display()),
            Self::NoSuchEntry(name) => write!(f, "No entry named {name}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Search(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SearchError> for EditorError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EditorError>;
