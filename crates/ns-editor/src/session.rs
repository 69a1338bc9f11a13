//! Tabs and the session that owns them.
//!
//! A [`Tab`] owns one [`Document`] plus everything derived from it: the
//! highlight spans, the gutter scroll state, the zoom level, the lock and
//! read-only flags, and the find anchor. Switching tabs switches all of it
//! at once; nothing is shared between tabs except the immutable
//! [`LanguageRegistry`].
//!
//! [`Session`] is the ordered tab list with one active tab. There is always
//! at least one tab.
//!
//! # User decisions
//!
//! Some operations need an answer from the user (unsaved changes on close,
//! a file name for an untitled save, loading an oversized file). They ask
//! through the [`Prompt`] trait so the session stays independent of any
//! particular front-end.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, info, warn};

use crate::complete;
use crate::config::{Config, SetOutcome};
use crate::document::Document;
use crate::edit;
use crate::error::{EditorError, Result};
use crate::gutter::Gutter;
use crate::highlight::HighlightState;
use crate::language::{Language, LanguageRegistry};
use crate::options::SetDirective;
use crate::position::{Position, Range};
use crate::search::{self, Finder, Match};
use crate::status::{Stats, StatusLine, StatusMarkers};

// ---------------------------------------------------------------------------
// Identity & flags
// ---------------------------------------------------------------------------

/// Stable identity of a tab, independent of the file it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(u64);

impl TabId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Per-tab protection flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TabFlags: u8 {
        /// Cannot be closed, saved, or have another file opened into it.
        const LOCKED    = 0b01;
        /// Text cannot be edited or saved.
        const READ_ONLY = 0b10;
    }
}

// ---------------------------------------------------------------------------
// Zoom
// ---------------------------------------------------------------------------

/// Smallest font size zooming out can reach.
pub const MIN_FONT_SIZE: u16 = 8;

/// Per-tab zoom offset from the configured font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Zoom {
    level: i32,
}

impl Zoom {
    #[must_use]
    pub const fn level(self) -> i32 {
        self.level
    }

    pub const fn zoom_in(&mut self) {
        self.level += 1;
    }

    pub const fn zoom_out(&mut self) {
        self.level -= 1;
    }

    pub const fn reset(&mut self) {
        self.level = 0;
    }

    /// Font size after zooming `base`, never below [`MIN_FONT_SIZE`].
    #[must_use]
    pub fn effective_size(self, base: u16) -> u16 {
        let size = i32::from(base) + self.level;
        u16::try_from(size.max(i32::from(MIN_FONT_SIZE))).unwrap_or(u16::MAX)
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Answer to "save changes before closing?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Save,
    Discard,
    Cancel,
}

/// How a close request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The user cancelled (or declined to pick a file name); nothing changed.
    Cancelled,
}

/// Questions the session asks the user.
pub trait Prompt {
    /// The tab titled `title` has unsaved changes and is being closed.
    fn unsaved_changes(&mut self, title: &str) -> CloseDecision;

    /// Pick a path for an untitled document. `None` aborts the save.
    fn choose_save_path(&mut self, title: &str) -> Option<PathBuf>;

    /// `path` is `size` bytes, over the configured limit. Load anyway?
    fn confirm_large_file(&mut self, path: &Path, size: u64) -> bool;
}

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

/// One open document and its derived display state.
pub struct Tab {
    id: TabId,
    doc: Document,
    highlight: HighlightState,
    gutter: Gutter,
    zoom: Zoom,
    flags: TabFlags,
    finder: Finder,
    registry: Arc<LanguageRegistry>,
}

impl Tab {
    fn new(id: TabId, doc: Document, registry: Arc<LanguageRegistry>) -> Self {
        let mut tab = Self {
            id,
            doc,
            highlight: HighlightState::new(),
            gutter: Gutter::default(),
            zoom: Zoom::default(),
            flags: TabFlags::empty(),
            finder: Finder::new(),
            registry,
        };
        tab.refresh();
        tab
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn id(&self) -> TabId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    #[must_use]
    pub const fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    #[inline]
    #[must_use]
    pub const fn gutter(&self) -> &Gutter {
        &self.gutter
    }

    #[inline]
    pub const fn gutter_mut(&mut self) -> &mut Gutter {
        &mut self.gutter
    }

    #[inline]
    #[must_use]
    pub const fn zoom(&self) -> Zoom {
        self.zoom
    }

    #[inline]
    pub const fn zoom_mut(&mut self) -> &mut Zoom {
        &mut self.zoom
    }

    #[inline]
    #[must_use]
    pub const fn flags(&self) -> TabFlags {
        self.flags
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.flags.contains(TabFlags::LOCKED)
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.flags.contains(TabFlags::READ_ONLY)
    }

    pub fn set_locked(&mut self, on: bool) {
        self.flags.set(TabFlags::LOCKED, on);
    }

    pub fn set_read_only(&mut self, on: bool) {
        self.flags.set(TabFlags::READ_ONLY, on);
    }

    /// Title for the tab strip: `*` when dirty, ` [locked]` when locked.
    #[must_use]
    pub fn title(&self) -> String {
        let name = self.doc.file_name().unwrap_or_else(|| "Untitled".to_string());
        let dirty = if self.doc.is_dirty() { "*" } else { "" };
        let locked = if self.is_locked() { " [locked]" } else { "" };
        format!("{dirty}{name}{locked}")
    }

    // -- Language -----------------------------------------------------------

    #[must_use]
    pub const fn language(&self) -> Language {
        self.doc.language()
    }

    /// Switch the highlighting language and re-highlight everything.
    pub fn set_language(&mut self, language: Language) {
        self.doc.set_language(language);
        self.refresh();
        debug!(tab = %self.id, language = language.name(), "language set");
    }

    // -- Cursor & selection (allowed on read-only tabs) ----------------------

    pub fn set_cursor(&mut self, pos: Position) {
        self.doc.set_cursor(pos);
        self.gutter.ensure_visible(self.doc.cursor().line);
    }

    pub fn select(&mut self, a: Position, b: Position) {
        self.doc.select(a, b);
        self.gutter.ensure_visible(self.doc.cursor().line);
    }

    pub fn clear_selection(&mut self) {
        self.doc.clear_selection();
    }

    pub fn select_line(&mut self) {
        edit::select_line(&mut self.doc);
    }

    /// Move to a 1-based line.
    pub fn goto_line(&mut self, line: usize) -> Position {
        let pos = edit::goto_line(&mut self.doc, line);
        self.gutter.ensure_visible(pos.line);
        pos
    }

    // -- Editing ------------------------------------------------------------

    fn check_writable(&self) -> Result<()> {
        if self.is_read_only() {
            Err(EditorError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Insert text at a position.
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab,
    /// [`EditorError::InvalidPosition`] for a position outside the text.
    pub fn insert(&mut self, pos: Position, text: &str) -> Result<()> {
        self.check_writable()?;
        let at = self
            .doc
            .pos_to_char_idx(pos)
            .ok_or(EditorError::InvalidPosition(pos))?;
        self.doc.insert(pos, text)?;
        self.after_edit(at, 0, text);
        Ok(())
    }

    /// Insert text at the cursor (replacing the selection, if any) and move
    /// the cursor past it.
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        self.check_writable()?;
        let range = self
            .doc
            .selection()
            .unwrap_or_else(|| Range::point(self.doc.cursor()));
        self.replace(range, text)?;
        self.doc.clear_selection();
        if let Some(start) = self.doc.pos_to_char_idx(range.start) {
            let end = start + text.chars().count();
            if let Some(pos) = self.doc.char_idx_to_pos(end) {
                self.set_cursor(pos);
            }
        }
        Ok(())
    }

    /// Type the current local date and time (`2024-05-01 13:45:07`).
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab.
    pub fn insert_timestamp(&mut self) -> Result<()> {
        self.type_text(&edit::format_timestamp(chrono::Local::now().naive_local()))
    }

    /// Delete a range.
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab,
    /// [`EditorError::InvalidPosition`] for a range outside the text.
    pub fn delete(&mut self, range: Range) -> Result<()> {
        self.replace(range, "")
    }

    /// Replace a range with text.
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab,
    /// [`EditorError::InvalidPosition`] for a range outside the text.
    pub fn replace(&mut self, range: Range, text: &str) -> Result<()> {
        self.check_writable()?;
        let start = self
            .doc
            .pos_to_char_idx(range.start)
            .ok_or(EditorError::InvalidPosition(range.start))?;
        let end = self
            .doc
            .pos_to_char_idx(range.end)
            .ok_or(EditorError::InvalidPosition(range.end))?;
        self.doc.replace(range, text)?;
        self.after_edit(start, end - start, text);
        Ok(())
    }

    /// Replace the whole text.
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab.
    pub fn replace_all_text(&mut self, text: &str) -> Result<()> {
        self.check_writable()?;
        self.doc.set_text(text);
        self.refresh();
        Ok(())
    }

    /// Shift spans, then re-highlight the edited line and its neighbors.
    /// An insertion that adds lines re-highlights everything: the window
    /// would miss the new lines below it.
    fn after_edit(&mut self, at: usize, removed: usize, inserted: &str) {
        self.gutter.sync(&self.doc);
        let rules = self.registry.rules(self.doc.language());
        if inserted.contains('\n') {
            self.highlight.refresh_all(self.doc.rope(), rules);
        } else {
            let inserted_len = inserted.chars().count();
            self.highlight.apply_edit(at, removed, inserted_len);
            let line = self.doc.rope().char_to_line(at.min(self.doc.len_chars()));
            self.highlight.refresh_window(self.doc.rope(), line, rules);
        }
        debug!(tab = %self.id, at, removed, inserted = inserted.len(), "edit");
    }

    /// Full re-highlight and gutter sync.
    fn refresh(&mut self) {
        self.gutter.sync(&self.doc);
        let rules = self.registry.rules(self.doc.language());
        self.highlight.refresh_all(self.doc.rope(), rules);
    }

    // -- Line operations ----------------------------------------------------

    fn line_op(&mut self, op: impl FnOnce(&mut Document) -> bool) -> Result<bool> {
        self.check_writable()?;
        let changed = op(&mut self.doc);
        if changed {
            self.refresh();
            self.gutter.ensure_visible(self.doc.cursor().line);
        }
        Ok(changed)
    }

    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab.
    pub fn duplicate_line(&mut self) -> Result<bool> {
        self.line_op(edit::duplicate_line)
    }

    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab.
    pub fn move_line_up(&mut self) -> Result<bool> {
        self.line_op(edit::move_line_up)
    }

    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab.
    pub fn move_line_down(&mut self) -> Result<bool> {
        self.line_op(edit::move_line_down)
    }

    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab.
    pub fn join_lines(&mut self) -> Result<bool> {
        self.line_op(edit::join_lines)
    }

    /// Toggle comments on the selected lines (or the cursor's line).
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab.
    pub fn toggle_comment(&mut self) -> Result<bool> {
        let lines = edit::target_lines(&self.doc);
        let style = self.doc.language().comment_style();
        self.line_op(|doc| edit::toggle_comment(doc, lines, style))
    }

    // -- Find & replace -----------------------------------------------------

    /// Find the next occurrence after the previous hit. A hit selects the
    /// match; a miss wraps the anchor back to the start.
    ///
    /// # Errors
    ///
    /// [`EditorError::Search`] for an empty term.
    pub fn find(&mut self, term: &str, case_insensitive: bool) -> Result<Option<Match>> {
        let found = self.finder.find_again(&self.doc, term, case_insensitive)?;
        self.select_match(found);
        Ok(found)
    }

    /// Find the next occurrence at or after `from`.
    ///
    /// # Errors
    ///
    /// [`EditorError::Search`] for an empty term.
    pub fn find_from(
        &mut self,
        term: &str,
        from: Position,
        case_insensitive: bool,
    ) -> Result<Option<Match>> {
        let found = self
            .finder
            .find_next(&self.doc, term, from, case_insensitive)?;
        self.select_match(found);
        Ok(found)
    }

    fn select_match(&mut self, found: Option<Match>) {
        if let Some(m) = found {
            if let Some(end) = self.doc.char_idx_to_pos(m.char_end()) {
                self.select(m.start, end);
            }
        }
    }

    /// Every occurrence, for match highlighting.
    ///
    /// # Errors
    ///
    /// [`EditorError::Search`] for an empty term.
    pub fn find_all(&self, term: &str, case_insensitive: bool) -> Result<Vec<Match>> {
        Ok(search::find_all(&self.doc, term, case_insensitive)?)
    }

    /// Replace the first occurrence in the document.
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab,
    /// [`EditorError::Search`] for an empty term.
    pub fn replace_next(
        &mut self,
        term: &str,
        replacement: &str,
        case_insensitive: bool,
    ) -> Result<bool> {
        self.check_writable()?;
        self.finder.set_case_insensitive(case_insensitive);
        let replaced = self.finder.replace_next(&mut self.doc, term, replacement)?;
        if replaced {
            self.refresh();
        }
        Ok(replaced)
    }

    /// Replace every occurrence; returns the count.
    ///
    /// # Errors
    ///
    /// [`EditorError::ReadOnly`] on a read-only tab,
    /// [`EditorError::Search`] for an empty term.
    pub fn replace_all(
        &mut self,
        term: &str,
        replacement: &str,
        case_insensitive: bool,
    ) -> Result<usize> {
        self.check_writable()?;
        self.finder.set_case_insensitive(case_insensitive);
        let count = self.finder.replace_all(&mut self.doc, term, replacement)?;
        if count > 0 {
            self.refresh();
        }
        Ok(count)
    }

    // -- Derived views ------------------------------------------------------

    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats::of(&self.doc)
    }

    #[must_use]
    pub fn status_line(&self) -> StatusLine {
        let markers = StatusMarkers {
            read_only: self.is_read_only(),
            locked: self.is_locked(),
        };
        StatusLine::new(&self.doc, &self.stats(), markers)
    }

    /// Completion prefix and candidates at the cursor.
    #[must_use]
    pub fn completions(&self) -> (String, Vec<String>) {
        complete::complete_at_cursor(&self.doc)
    }

    // -- File I/O -----------------------------------------------------------

    fn load(&mut self, path: &Path) -> Result<()> {
        self.doc = Document::load(path)?;
        self.finder.reset();
        self.gutter.scroll_to(0);
        self.refresh();
        Ok(())
    }

    fn check_savable(&self) -> Result<()> {
        if self.is_locked() {
            return Err(EditorError::Locked);
        }
        self.check_writable()
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.check_savable()?;
        let had_path = self.doc.path().is_some();
        self.doc.save_as(path)?;
        if !had_path {
            // The language may have come from the new extension.
            self.refresh();
        }
        info!(tab = %self.id, path = %path.display(), "saved");
        Ok(())
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("doc", &self.doc)
            .field("flags", &self.flags)
            .field("zoom", &self.zoom)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Recent files
// ---------------------------------------------------------------------------

/// Most-recent-first list of paths, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFiles {
    paths: Vec<PathBuf>,
    cap: usize,
}

impl RecentFiles {
    #[must_use]
    pub const fn new(cap: usize) -> Self {
        Self {
            paths: Vec::new(),
            cap,
        }
    }

    /// Move (or add) `path` to the front, dropping the oldest over the cap.
    pub fn push(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
        self.paths.insert(0, path.to_path_buf());
        self.paths.truncate(self.cap);
    }

    /// Returns `true` if the path was in the list.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        self.paths.len() != before
    }

    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.paths.truncate(cap);
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What an auto-save pass did.
#[derive(Debug, Default)]
pub struct AutoSaveReport {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<EditorError>,
}

/// The ordered set of open tabs with one active tab.
pub struct Session {
    tabs: Vec<Tab>,
    active: usize,
    next_id: u64,
    registry: Arc<LanguageRegistry>,
    config: Config,
    recent: RecentFiles,
}

impl Session {
    /// A session with one empty, untitled tab.
    #[must_use]
    pub fn new(registry: Arc<LanguageRegistry>, config: Config) -> Self {
        let recent = RecentFiles::new(config.max_recent_files);
        let mut session = Self {
            tabs: Vec::new(),
            active: 0,
            next_id: 1,
            registry,
            config,
            recent,
        };
        session.new_tab();
        session
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Always false: a session keeps at least one tab.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    #[must_use]
    pub fn active(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    #[must_use]
    pub fn active_id(&self) -> TabId {
        self.active().id
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[must_use]
    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn recent(&self) -> &RecentFiles {
        &self.recent
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<LanguageRegistry> {
        &self.registry
    }

    fn index_of(&self, id: TabId) -> Result<usize> {
        self.tabs
            .iter()
            .position(|t| t.id == id)
            .ok_or(EditorError::NoSuchTab(id))
    }

    /// Apply a `set` directive and keep dependent state in step.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidOption`] when the directive is rejected.
    pub fn apply_option(&mut self, directive: &SetDirective) -> Result<SetOutcome> {
        let outcome = self.config.apply(directive)?;
        if outcome == SetOutcome::Changed("maxrecent") {
            self.recent.set_cap(self.config.max_recent_files);
        }
        Ok(outcome)
    }

    // -- Tab lifecycle ------------------------------------------------------

    /// Open an empty tab after the others and make it active.
    pub fn new_tab(&mut self) -> TabId {
        let id = TabId(self.next_id);
        self.next_id += 1;
        let mut doc = Document::new();
        doc.set_language(self.config.default_language);
        self.tabs.push(Tab::new(id, doc, Arc::clone(&self.registry)));
        self.active = self.tabs.len() - 1;
        info!(tab = %id, "new tab");
        id
    }

    /// Close a tab.
    ///
    /// A dirty tab asks [`Prompt::unsaved_changes`] first. `Save` saves and
    /// then closes; `Cancel` leaves everything as it was.
    ///
    /// # Errors
    ///
    /// - [`EditorError::LastTab`] when it is the only tab.
    /// - [`EditorError::Locked`] when the tab is locked.
    /// - [`EditorError::NoSuchTab`] for an unknown id.
    /// - Any save error when the user chose `Save`; the tab stays open.
    pub fn close_tab(&mut self, id: TabId, prompt: &mut dyn Prompt) -> Result<CloseOutcome> {
        let index = self.index_of(id)?;
        if self.tabs.len() <= 1 {
            return Err(EditorError::LastTab);
        }
        if self.tabs[index].is_locked() {
            return Err(EditorError::Locked);
        }
        if self.tabs[index].doc.is_dirty() {
            match prompt.unsaved_changes(&self.tabs[index].title()) {
                CloseDecision::Cancel => return Ok(CloseOutcome::Cancelled),
                CloseDecision::Discard => {}
                CloseDecision::Save => {
                    if !self.save_tab(index, prompt)? {
                        return Ok(CloseOutcome::Cancelled);
                    }
                }
            }
        }

        self.tabs.remove(index);
        if self.active > index || self.active >= self.tabs.len() {
            self.active = self.active.saturating_sub(1);
        }
        info!(tab = %id, "closed tab");
        Ok(CloseOutcome::Closed)
    }

    /// Close the active tab.
    ///
    /// # Errors
    ///
    /// As [`close_tab`](Self::close_tab).
    pub fn close_active(&mut self, prompt: &mut dyn Prompt) -> Result<CloseOutcome> {
        self.close_tab(self.active_id(), prompt)
    }

    /// Make a tab active.
    ///
    /// # Errors
    ///
    /// [`EditorError::NoSuchTab`] for an unknown id.
    pub fn switch_to(&mut self, id: TabId) -> Result<()> {
        self.active = self.index_of(id)?;
        Ok(())
    }

    /// Activate the next tab, wrapping around.
    pub fn next_tab(&mut self) -> TabId {
        self.active = (self.active + 1) % self.tabs.len();
        self.active_id()
    }

    /// Activate the previous tab, wrapping around.
    pub fn prev_tab(&mut self) -> TabId {
        self.active = (self.active + self.tabs.len() - 1) % self.tabs.len();
        self.active_id()
    }

    // -- Files --------------------------------------------------------------

    /// Load a file into the active tab, replacing its document.
    ///
    /// Files over `max_file_size` ask [`Prompt::confirm_large_file`] first.
    /// Returns `false` when the user declined; nothing changes then.
    ///
    /// # Errors
    ///
    /// [`EditorError::Locked`] / [`EditorError::ReadOnly`] for a protected
    /// tab, [`EditorError::Io`] when the file cannot be read (the tab is
    /// left as it was).
    pub fn open_file(&mut self, path: &Path, prompt: &mut dyn Prompt) -> Result<bool> {
        let tab = &self.tabs[self.active];
        if tab.is_locked() {
            return Err(EditorError::Locked);
        }
        tab.check_writable()?;

        let size = fs::metadata(path)
            .map_err(|e| EditorError::io(path, e))?
            .len();
        if size > self.config.max_file_size && !prompt.confirm_large_file(path, size) {
            info!(path = %path.display(), size, "large file declined");
            return Ok(false);
        }

        self.tabs[self.active].load(path)?;
        self.recent.push(path);
        info!(tab = %self.active_id(), path = %path.display(), "opened");
        Ok(true)
    }

    /// Open a path from the recent list. A path that no longer exists is
    /// dropped from the list.
    ///
    /// # Errors
    ///
    /// As [`open_file`](Self::open_file).
    pub fn open_recent(&mut self, path: &Path, prompt: &mut dyn Prompt) -> Result<bool> {
        if !path.exists() {
            self.recent.remove(path);
            warn!(path = %path.display(), "recent file is gone");
        }
        self.open_file(path, prompt)
    }

    /// Save the active tab. An untitled tab asks for a path; returns
    /// `false` when none was given.
    ///
    /// # Errors
    ///
    /// [`EditorError::Locked`] / [`EditorError::ReadOnly`] before any I/O,
    /// [`EditorError::Io`] when the write fails.
    pub fn save_active(&mut self, prompt: &mut dyn Prompt) -> Result<bool> {
        self.save_tab(self.active, prompt)
    }

    /// Save the active tab under a new path.
    ///
    /// # Errors
    ///
    /// [`EditorError::Locked`] / [`EditorError::ReadOnly`] before any I/O,
    /// [`EditorError::Io`] when the write fails.
    pub fn save_active_as(&mut self, path: &Path) -> Result<()> {
        self.tabs[self.active].save_as(path)?;
        self.recent.push(path);
        Ok(())
    }

    fn save_tab(&mut self, index: usize, prompt: &mut dyn Prompt) -> Result<bool> {
        let tab = &self.tabs[index];
        tab.check_savable()?;
        let path = match tab.doc.path() {
            Some(p) => p.to_path_buf(),
            None => match prompt.choose_save_path(&tab.title()) {
                Some(p) => p,
                None => return Ok(false),
            },
        };
        self.tabs[index].save_as(&path)?;
        self.recent.push(&path);
        Ok(true)
    }

    /// Write every tab that is dirty, has a path, and is not protected.
    /// Failures are collected, never fatal.
    pub fn auto_save(&mut self) -> AutoSaveReport {
        let mut report = AutoSaveReport::default();
        for tab in &mut self.tabs {
            if !tab.doc.is_dirty() || tab.is_read_only() || tab.is_locked() {
                continue;
            }
            let Some(path) = tab.doc.path().map(Path::to_path_buf) else {
                continue;
            };
            match tab.doc.save() {
                Ok(()) => report.saved.push(path),
                Err(e) => {
                    warn!(tab = %tab.id, error = %e, "auto-save failed");
                    report.failed.push(e);
                }
            }
        }
        if !report.saved.is_empty() {
            info!(count = report.saved.len(), "auto-saved");
        }
        report
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("tabs", &self.tabs)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::paint;
    use crate::language::Category;
    use pretty_assertions::assert_eq;

    /// Scripted answers, recording what was asked.
    #[derive(Default)]
    struct Scripted {
        decision: Option<CloseDecision>,
        save_path: Option<PathBuf>,
        allow_large: bool,
        asked: Vec<&'static str>,
    }

    impl Prompt for Scripted {
        fn unsaved_changes(&mut self, _title: &str) -> CloseDecision {
            self.asked.push("unsaved");
            self.decision.unwrap_or(CloseDecision::Cancel)
        }

        fn choose_save_path(&mut self, _title: &str) -> Option<PathBuf> {
            self.asked.push("path");
            self.save_path.clone()
        }

        fn confirm_large_file(&mut self, _path: &Path, _size: u64) -> bool {
            self.asked.push("large");
            self.allow_large
        }
    }

    fn session() -> Session {
        let registry = Arc::new(LanguageRegistry::builtin().unwrap());
        Session::new(registry, Config::default())
    }

    fn type_into_active(s: &mut Session, text: &str) {
        s.active_mut().type_text(text).unwrap();
    }

    // -- Tabs ---------------------------------------------------------------

    #[test]
    fn starts_with_one_untitled_tab() {
        let s = session();
        assert_eq!(s.len(), 1);
        assert_eq!(s.active().title(), "Untitled");
    }

    #[test]
    fn closing_last_tab_is_rejected() {
        let mut s = session();
        let id = s.active_id();
        let err = s.close_tab(id, &mut Scripted::default()).unwrap_err();
        assert!(matches!(err, EditorError::LastTab));
        assert_eq!(s.len(), 1);
        assert_eq!(s.active_id(), id);
    }

    #[test]
    fn locked_tab_cannot_close() {
        let mut s = session();
        let first = s.active_id();
        s.new_tab();
        s.switch_to(first).unwrap();
        s.active_mut().set_locked(true);
        assert!(matches!(
            s.close_tab(first, &mut Scripted::default()),
            Err(EditorError::Locked)
        ));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn cancel_keeps_dirty_tab_intact() {
        let mut s = session();
        s.new_tab();
        type_into_active(&mut s, "draft");
        let id = s.active_id();
        let mut prompt = Scripted {
            decision: Some(CloseDecision::Cancel),
            ..Scripted::default()
        };
        assert_eq!(s.close_tab(id, &mut prompt).unwrap(), CloseOutcome::Cancelled);
        assert_eq!(s.len(), 2);
        assert_eq!(s.active().document().text(), "draft");
        assert!(s.active().document().is_dirty());
    }

    #[test]
    fn discard_closes_without_saving() {
        let mut s = session();
        let first = s.active_id();
        s.new_tab();
        type_into_active(&mut s, "scratch");
        let mut prompt = Scripted {
            decision: Some(CloseDecision::Discard),
            ..Scripted::default()
        };
        assert_eq!(s.close_active(&mut prompt).unwrap(), CloseOutcome::Closed);
        assert_eq!(s.len(), 1);
        assert_eq!(s.active_id(), first);
        assert_eq!(prompt.asked, vec!["unsaved"]);
    }

    #[test]
    fn save_then_close_asks_for_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.txt");
        let mut s = session();
        s.new_tab();
        type_into_active(&mut s, "keep me");
        let mut prompt = Scripted {
            decision: Some(CloseDecision::Save),
            save_path: Some(path.clone()),
            ..Scripted::default()
        };
        assert_eq!(s.close_active(&mut prompt).unwrap(), CloseOutcome::Closed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
        assert_eq!(s.recent().paths(), &[path]);
    }

    #[test]
    fn save_then_close_without_path_keeps_tab() {
        let mut s = session();
        s.new_tab();
        type_into_active(&mut s, "x");
        let mut prompt = Scripted {
            decision: Some(CloseDecision::Save),
            ..Scripted::default()
        };
        assert_eq!(s.close_active(&mut prompt).unwrap(), CloseOutcome::Cancelled);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn clean_tab_closes_without_asking() {
        let mut s = session();
        s.new_tab();
        let mut prompt = Scripted::default();
        s.close_active(&mut prompt).unwrap();
        assert!(prompt.asked.is_empty());
    }

    #[test]
    fn close_keeps_active_tab_when_closing_another() {
        let mut s = session();
        let a = s.active_id();
        let b = s.new_tab();
        let c = s.new_tab();
        s.switch_to(c).unwrap();
        s.close_tab(a, &mut Scripted::default()).unwrap();
        assert_eq!(s.active_id(), c);
        s.close_tab(c, &mut Scripted::default()).unwrap();
        assert_eq!(s.active_id(), b);
    }

    #[test]
    fn next_prev_wrap() {
        let mut s = session();
        let a = s.active_id();
        let b = s.new_tab();
        assert_eq!(s.next_tab(), a);
        assert_eq!(s.prev_tab(), b);
        assert!(matches!(s.switch_to(TabId(99)), Err(EditorError::NoSuchTab(_))));
    }

    #[test]
    fn tabs_own_their_state() {
        let mut s = session();
        let a = s.active_id();
        s.active_mut().set_language(Language::Python);
        s.active_mut().zoom_mut().zoom_in();
        s.new_tab();
        assert_eq!(s.active().language(), Language::Text);
        assert_eq!(s.active().zoom().level(), 0);
        s.switch_to(a).unwrap();
        assert_eq!(s.active().language(), Language::Python);
        assert_eq!(s.active().zoom().level(), 1);
    }

    #[test]
    fn title_markers() {
        let mut s = session();
        type_into_active(&mut s, "x");
        s.active_mut().set_locked(true);
        assert_eq!(s.active().title(), "*Untitled [locked]");
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn read_only_rejects_edits() {
        let mut s = session();
        let tab = s.active_mut();
        tab.set_read_only(true);
        assert!(matches!(tab.type_text("x"), Err(EditorError::ReadOnly)));
        assert!(matches!(tab.duplicate_line(), Err(EditorError::ReadOnly)));
        assert!(matches!(tab.replace_all("a", "b", true), Err(EditorError::ReadOnly)));
        assert!(tab.document().is_empty());
        // Navigation still works.
        tab.goto_line(1);
    }

    #[test]
    fn typing_keeps_highlight_in_step() {
        let mut s = session();
        let tab = s.active_mut();
        tab.set_language(Language::Python);
        tab.type_text("x = 1\n").unwrap();
        tab.type_text("if x:").unwrap();
        let rope = tab.document().rope();
        let cells = paint(tab.highlight().spans(), 0..rope.len_chars());
        // "if" starts at char 6
        assert_eq!(cells[6], Some(Category::Keyword));
        assert_eq!(tab.document().cursor(), Position::new(1, 5));
        assert_eq!(tab.gutter().line_count(), 2);
    }

    #[test]
    fn type_text_replaces_selection() {
        let mut s = session();
        let tab = s.active_mut();
        tab.type_text("hello world").unwrap();
        tab.select(Position::new(0, 6), Position::new(0, 11));
        tab.type_text("there").unwrap();
        assert_eq!(tab.document().text(), "hello there");
        assert_eq!(tab.document().selection(), None);
    }

    #[test]
    fn timestamp_is_typed_at_cursor() {
        let mut s = session();
        let tab = s.active_mut();
        tab.type_text("at ").unwrap();
        tab.insert_timestamp().unwrap();
        let text = tab.document().text();
        let stamp = text.strip_prefix("at ").unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, edit::TIMESTAMP_FORMAT).is_ok());
        assert_eq!(tab.document().cursor(), Position::new(0, 22));

        tab.set_read_only(true);
        assert!(matches!(tab.insert_timestamp(), Err(EditorError::ReadOnly)));
    }

    #[test]
    fn find_selects_matches_in_turn() {
        let mut s = session();
        let tab = s.active_mut();
        tab.type_text("aaa").unwrap();
        let starts: Vec<_> = (0..4)
            .map(|_| tab.find("a", true).unwrap().map(|m| m.start.col))
            .collect();
        assert_eq!(starts, vec![Some(0), Some(1), Some(2), None]);
        assert_eq!(tab.find("a", true).unwrap().map(|m| m.start.col), Some(0));
        assert_eq!(tab.document().selected_text(), "a");
    }

    #[test]
    fn empty_search_term_is_an_error() {
        let mut s = session();
        assert!(matches!(
            s.active_mut().find("", true),
            Err(EditorError::Search(_))
        ));
    }

    #[test]
    fn status_line_reflects_tab_flags() {
        let mut s = session();
        s.active_mut().set_read_only(true);
        assert!(s.active().status_line().right.ends_with("[RO]"));
    }

    // -- Files --------------------------------------------------------------

    #[test]
    fn open_replaces_active_tab_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.py");
        fs::write(&path, "def foo():\n    pass\n").unwrap();

        let mut s = session();
        let id = s.active_id();
        assert!(s.open_file(&path, &mut Scripted::default()).unwrap());
        assert_eq!(s.len(), 1);
        assert_eq!(s.active_id(), id);
        assert_eq!(s.active().language(), Language::Python);
        assert_eq!(s.active().title(), "m.py");
        assert!(!s.active().highlight().spans().is_empty());
        assert_eq!(s.recent().paths(), &[path]);
    }

    #[test]
    fn declining_large_file_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "x".repeat(64)).unwrap();

        let mut s = session();
        s.apply_option(&SetDirective::Assign("maxfilesize".into(), "16".into()))
            .unwrap();
        type_into_active(&mut s, "mine");
        let mut prompt = Scripted::default();
        assert!(!s.open_file(&path, &mut prompt).unwrap());
        assert_eq!(prompt.asked, vec!["large"]);
        assert_eq!(s.active().document().text(), "mine");
        assert!(s.recent().is_empty());

        prompt.allow_large = true;
        assert!(s.open_file(&path, &mut prompt).unwrap());
        assert_eq!(s.active().document().len_chars(), 64);
    }

    #[test]
    fn open_missing_file_keeps_tab() {
        let mut s = session();
        type_into_active(&mut s, "still here");
        let err = s
            .open_file(Path::new("/no/such/file.txt"), &mut Scripted::default())
            .unwrap_err();
        assert!(matches!(err, EditorError::Io { .. }));
        assert_eq!(s.active().document().text(), "still here");
    }

    #[test]
    fn open_recent_drops_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        fs::write(&path, "x").unwrap();
        let mut s = session();
        s.open_file(&path, &mut Scripted::default()).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(s.open_recent(&path, &mut Scripted::default()).is_err());
        assert!(s.recent().is_empty());
    }

    #[test]
    fn save_rejects_protected_tabs_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.txt");
        let mut s = session();
        s.active_mut().set_locked(true);
        assert!(matches!(s.save_active_as(&path), Err(EditorError::Locked)));
        s.active_mut().set_locked(false);
        s.active_mut().set_read_only(true);
        assert!(matches!(
            s.save_active(&mut Scripted::default()),
            Err(EditorError::ReadOnly)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn save_untitled_without_path_aborts() {
        let mut s = session();
        type_into_active(&mut s, "x");
        assert!(!s.save_active(&mut Scripted::default()).unwrap());
        assert!(s.active().document().is_dirty());
    }

    #[test]
    fn save_as_detects_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.rs");
        let mut s = session();
        type_into_active(&mut s, "fn main() {}");
        s.save_active_as(&path).unwrap();
        assert_eq!(s.active().language(), Language::Rust);
        assert!(!s.active().highlight().spans().is_empty());
        assert!(!s.active().document().is_dirty());
    }

    #[test]
    fn auto_save_writes_only_dirty_tabs_with_paths() {
        let dir = tempfile::tempdir().unwrap();
        let saved = dir.path().join("a.txt");
        let clean = dir.path().join("b.txt");
        fs::write(&saved, "old").unwrap();
        fs::write(&clean, "clean").unwrap();

        let mut s = session();
        s.open_file(&saved, &mut Scripted::default()).unwrap();
        s.active_mut().type_text("new ").unwrap();

        s.new_tab();
        s.open_file(&clean, &mut Scripted::default()).unwrap();

        s.new_tab();
        type_into_active(&mut s, "untitled and dirty");

        let report = s.auto_save();
        assert_eq!(report.saved, vec![saved.clone()]);
        assert!(report.failed.is_empty());
        assert_eq!(fs::read_to_string(&saved).unwrap(), "new old");
        assert_eq!(fs::read_to_string(&clean).unwrap(), "clean");
        assert!(s.active().document().is_dirty());
    }

    // -- Recent files -------------------------------------------------------

    #[test]
    fn recent_files_dedup_and_cap() {
        let mut r = RecentFiles::new(3);
        for p in ["a", "b", "c", "a", "d"] {
            r.push(Path::new(p));
        }
        let names: Vec<_> = r.paths().iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(names, vec!["d", "a", "c"]);
        assert!(r.remove(Path::new("a")));
        assert!(!r.remove(Path::new("zzz")));
        r.set_cap(1);
        assert_eq!(r.len(), 1);
    }

    // -- Zoom ---------------------------------------------------------------

    #[test]
    fn zoom_is_floored() {
        let mut z = Zoom::default();
        z.zoom_in();
        assert_eq!(z.effective_size(12), 13);
        for _ in 0..10 {
            z.zoom_out();
        }
        assert_eq!(z.effective_size(12), 8);
        z.reset();
        assert_eq!(z.effective_size(12), 12);
    }
}
