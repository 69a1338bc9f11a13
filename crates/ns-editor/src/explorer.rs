//! File explorer — the directory listing beside the text.
//!
//! Shows one directory at a time: a `..` entry unless the directory is a
//! filesystem root, then folders before files, each group ordered by
//! case-insensitive name. Names starting with `.` are hidden.
//!
//! Activating a folder enters it. Activating a file only hands its path
//! back; opening it into the active tab is
//! [`Session::open_file`](crate::session::Session::open_file)'s job, so the
//! locked / read-only / large-file rules apply unchanged.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{EditorError, Result};

/// What an explorer row points at. Sort order is declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Parent,
    Dir,
    File,
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Parent => f.write_str(".."),
            EntryKind::Dir => write!(f, "{}/", self.name),
            EntryKind::File => f.write_str(&self.name),
        }
    }
}

/// Result of activating a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The explorer moved into this directory.
    Entered(PathBuf),
    /// A file was picked; the caller opens it.
    Open(PathBuf),
}

/// Current directory of the sidebar and whether it is shown.
#[derive(Debug, Clone)]
pub struct Explorer {
    cwd: PathBuf,
    visible: bool,
}

impl Explorer {
    /// A hidden explorer rooted at `start`.
    #[must_use]
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            cwd: canonical(start.into()),
            visible: false,
        }
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the sidebar. Returns the new visibility.
    pub const fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// List the current directory.
    ///
    /// An unreadable directory lists only its `..` entry so the user can
    /// still leave it.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        let mut entries = match fs::read_dir(&self.cwd) {
            Ok(read) => read
                .filter_map(std::result::Result::ok)
                .filter_map(|entry| {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if name.starts_with('.') {
                        return None;
                    }
                    let path = entry.path();
                    let kind = if path.is_dir() {
                        EntryKind::Dir
                    } else {
                        EntryKind::File
                    };
                    Some(Entry { name, path, kind })
                })
                .collect(),
            Err(e) => {
                warn!(dir = %self.cwd.display(), error = %e, "cannot list directory");
                Vec::new()
            }
        };
        entries.sort_by_cached_key(|e| (e.kind, e.name.to_lowercase()));

        if let Some(parent) = self.cwd.parent() {
            entries.insert(
                0,
                Entry {
                    name: "..".to_string(),
                    path: parent.to_path_buf(),
                    kind: EntryKind::Parent,
                },
            );
        }
        entries
    }

    /// Move to the parent directory. `false` at a filesystem root.
    pub fn up(&mut self) -> bool {
        let Some(parent) = self.cwd.parent() else {
            return false;
        };
        self.cwd = parent.to_path_buf();
        debug!(dir = %self.cwd.display(), "explorer up");
        true
    }

    /// Move to the home directory.
    ///
    /// # Errors
    ///
    /// [`EditorError::NotADirectory`] when no home directory is known.
    pub fn home(&mut self) -> Result<()> {
        let home = home_dir()
            .filter(|p| p.is_dir())
            .ok_or_else(|| EditorError::NotADirectory(PathBuf::from("~")))?;
        self.cwd = canonical(home);
        Ok(())
    }

    /// Move to a typed path, absolute or relative to the current directory.
    ///
    /// # Errors
    ///
    /// [`EditorError::NotADirectory`] when `path` is not an existing
    /// directory; the explorer stays where it was.
    pub fn go(&mut self, path: &Path) -> Result<()> {
        let target = self.cwd.join(path);
        if !target.is_dir() {
            return Err(EditorError::NotADirectory(path.to_path_buf()));
        }
        self.cwd = canonical(target);
        debug!(dir = %self.cwd.display(), "explorer moved");
        Ok(())
    }

    /// Activate the row called `name` (`..` included).
    ///
    /// # Errors
    ///
    /// [`EditorError::NoSuchEntry`] when the listing has no such row.
    pub fn activate(&mut self, name: &str) -> Result<Activation> {
        let entry = self
            .entries()
            .into_iter()
            .find(|e| e.name == name)
            .ok_or_else(|| EditorError::NoSuchEntry(name.to_string()))?;
        match entry.kind {
            EntryKind::Parent | EntryKind::Dir => {
                self.cwd = canonical(entry.path);
                Ok(Activation::Entered(self.cwd.clone()))
            }
            EntryKind::File => Ok(Activation::Open(entry.path)),
        }
    }
}

fn canonical(path: PathBuf) -> PathBuf {
    fs::canonicalize(&path).unwrap_or(path)
}

fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env::var_os(var).map(PathBuf::from)
}
