//! The application: owned editor state plus the event loop that drives it.
//!
//! One thread owns everything mutable. Input lines, shell output and git
//! results all arrive as [`Event`]s on one bounded channel; the loop blocks
//! on it with a tick timeout so auto-save deadlines fire even when idle.
//! Every [`Action`] is executed by [`App::dispatch`], an exhaustive match.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::time::{Duration, Instant};

use ns_editor::action::{Action, ExplorerAction, GitAction, HELP, ZoomAction};
use ns_editor::autosave::AutoSave;
use ns_editor::config::{Config, SetOutcome};
use ns_editor::explorer::{Activation, Explorer};
use ns_editor::language::LanguageRegistry;
use ns_editor::options::SetDirective;
use ns_editor::session::{CloseDecision, CloseOutcome, Prompt, Session};
use ns_editor::Result as EditorResult;
use ns_term::git::{Git, GitError, GitStatus};
use ns_term::terminal::{Execution, OutputLine, ShellEvent, Terminal};
use ns_term::worker::{JobId, Pool};
use ns_theme::{ThemeName, ThemeState};
use tracing::{debug, info, warn};

use crate::render::Renderer;

/// How long the loop waits for an event before checking deadlines.
pub const TICK: Duration = Duration::from_millis(250);

// ─── Events ─────────────────────────────────────────────────────────────────

/// Everything that can wake the loop.
#[derive(Debug)]
pub enum Event {
    Input(String),
    InputClosed,
    Shell(JobId, ShellEvent),
    Git(JobId, GitReply),
}

#[derive(Debug)]
pub enum GitReply {
    Status(Result<GitStatus, GitError>),
    Done(Result<String, GitError>),
}

/// Whether the loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Something to print at the next flush.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Output {
    Frame,
    Explorer,
    Notice { text: String, error: bool },
    Lines(Vec<OutputLine>),
}

// ─── App ────────────────────────────────────────────────────────────────────

pub struct App {
    session: Session,
    theme: ThemeState,
    terminal: Terminal,
    explorer: Explorer,
    git: Option<Git>,
    pool: Pool<Event>,
    autosave: AutoSave,
    renderer: Renderer,
    last_search: Option<String>,
    pending: Vec<Output>,
    /// Set by the theme subscription; the next flush repaints.
    repaint: Rc<Cell<bool>>,
}

impl App {
    #[must_use]
    pub fn new(
        config: Config,
        registry: Arc<LanguageRegistry>,
        pool: Pool<Event>,
        cwd: PathBuf,
        renderer: Renderer,
    ) -> Self {
        let mut theme = ThemeState::new(config.theme);
        let repaint = Rc::new(Cell::new(false));
        let flag = Rc::clone(&repaint);
        theme.subscribe(move |t| {
            info!(theme = %t.name, "theme applied");
            flag.set(true);
        });

        let mut autosave = AutoSave::new(config.auto_save_interval);
        if config.auto_save {
            autosave.start(Instant::now());
        }

        Self {
            session: Session::new(registry, config),
            theme,
            terminal: Terminal::new(cwd.clone()),
            explorer: Explorer::new(cwd),
            git: None,
            pool,
            autosave,
            renderer,
            last_search: None,
            pending: Vec::new(),
            repaint,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    // -- Output helpers -----------------------------------------------------

    fn frame(&mut self) {
        self.pending.push(Output::Frame);
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.pending.push(Output::Notice {
            text: text.into(),
            error: false,
        });
    }

    fn error(&mut self, text: impl ToString) {
        let text = text.to_string();
        warn!(%text, "notice");
        self.pending.push(Output::Notice { text, error: true });
    }

    fn lines(&mut self, lines: Vec<OutputLine>) {
        self.pending.push(Output::Lines(lines));
    }

    fn text(&mut self, text: &str) {
        self.lines(text.lines().map(OutputLine::normal).collect());
    }

    /// Report an editor result: a frame on success, a notice on failure.
    fn report(&mut self, result: EditorResult<bool>, unchanged: &str) {
        match result {
            Ok(true) => self.frame(),
            Ok(false) => self.notice(unchanged),
            Err(e) => self.error(e),
        }
    }

    // -- Dispatch -----------------------------------------------------------

    /// Execute one action.
    pub fn dispatch(&mut self, action: Action, prompt: &mut dyn Prompt) -> Flow {
        debug!(%action, "dispatch");
        match action {
            Action::NewTab => {
                self.session.new_tab();
                self.frame();
            }
            Action::CloseTab => match self.session.close_active(prompt) {
                Ok(CloseOutcome::Closed) => self.frame(),
                Ok(CloseOutcome::Cancelled) => self.notice("Close cancelled"),
                Err(e) => self.error(e),
            },
            Action::NextTab => {
                self.session.next_tab();
                self.frame();
            }
            Action::PrevTab => {
                self.session.prev_tab();
                self.frame();
            }
            Action::SwitchTab(index) => {
                match self.session.tabs().get(index).map(ns_editor::session::Tab::id) {
                    Some(id) => {
                        let result = self.session.switch_to(id).map(|()| true);
                        self.report(result, "");
                    }
                    None => self.error(format!("No tab {}", index + 1)),
                }
            }

            Action::Open(path) => self.open(&path, prompt, false),
            Action::ShowRecent => {
                let recent = self.session.recent().paths();
                if recent.is_empty() {
                    self.notice("No recent files");
                } else {
                    let lines = recent
                        .iter()
                        .enumerate()
                        .map(|(i, p)| OutputLine::normal(format!("{:>2}. {}", i + 1, p.display())))
                        .collect();
                    self.lines(lines);
                }
            }
            Action::OpenRecent(index) => {
                match self.session.recent().paths().get(index).cloned() {
                    Some(path) => self.open(&path, prompt, true),
                    None => self.error(format!("No recent file {}", index + 1)),
                }
            }
            Action::Save => match self.session.save_active(prompt) {
                Ok(true) => self.saved(),
                Ok(false) => self.notice("Save cancelled"),
                Err(e) => self.error(e),
            },
            Action::SaveAs(path) => match self.session.save_active_as(&path) {
                Ok(()) => self.saved(),
                Err(e) => self.error(e),
            },

            Action::Type(text) => {
                let result = self.session.active_mut().type_text(&text).map(|()| true);
                self.report(result, "");
            }
            Action::MoveCursor(pos) => {
                self.session.active_mut().set_cursor(pos);
                self.frame();
            }
            Action::Select(a, b) => {
                self.session.active_mut().select(a, b);
                self.frame();
            }
            Action::SelectLine => {
                self.session.active_mut().select_line();
                self.frame();
            }
            Action::InsertTimestamp => {
                let result = self.session.active_mut().insert_timestamp().map(|()| true);
                self.report(result, "");
            }
            Action::GotoLine(line) => {
                let pos = self.session.active_mut().goto_line(line);
                self.notice(format!("Line {}", pos.line + 1));
                self.frame();
            }

            Action::Find(term) => {
                let from = self.session.active().document().cursor();
                let ci = self.session.config().ignore_case;
                let result = self.session.active_mut().find_from(&term, from, ci);
                self.found(&term, result);
                self.last_search = Some(term);
            }
            Action::FindNext => match self.last_search.clone() {
                Some(term) => {
                    let ci = self.session.config().ignore_case;
                    let result = self.session.active_mut().find(&term, ci);
                    self.found(&term, result);
                }
                None => self.error("No previous search"),
            },
            Action::Replace { term, with } => {
                let ci = self.session.config().ignore_case;
                let result = self.session.active_mut().replace_next(&term, &with, ci);
                self.report(result, &format!("'{term}' not found"));
            }
            Action::ReplaceAll { term, with } => {
                let ci = self.session.config().ignore_case;
                match self.session.active_mut().replace_all(&term, &with, ci) {
                    Ok(n) => {
                        self.notice(format!("Replaced {n} occurrence(s)"));
                        if n > 0 {
                            self.frame();
                        }
                    }
                    Err(e) => self.error(e),
                }
            }

            Action::DuplicateLine => {
                let result = self.session.active_mut().duplicate_line();
                self.report(result, "");
            }
            Action::MoveLineUp => {
                let result = self.session.active_mut().move_line_up();
                self.report(result, "Already at the first line");
            }
            Action::MoveLineDown => {
                let result = self.session.active_mut().move_line_down();
                self.report(result, "Already at the last line");
            }
            Action::JoinLines => {
                let result = self.session.active_mut().join_lines();
                self.report(result, "Nothing to join");
            }
            Action::ToggleComment => {
                let result = self.session.active_mut().toggle_comment();
                self.report(result, "Nothing to comment");
            }
            Action::Complete => {
                let (prefix, words) = self.session.active().completions();
                if words.is_empty() {
                    self.notice(format!("No completions for '{prefix}'"));
                } else {
                    self.notice(format!("Completions for '{prefix}': {}", words.join(" ")));
                }
            }

            Action::Zoom(step) => {
                let base = self.session.config().font_size;
                let zoom = self.session.active_mut().zoom_mut();
                match step {
                    ZoomAction::In => zoom.zoom_in(),
                    ZoomAction::Out => zoom.zoom_out(),
                    ZoomAction::Reset => zoom.reset(),
                }
                let size = zoom.effective_size(base);
                self.notice(format!("Font size {size}pt"));
            }
            Action::ToggleWordWrap => {
                self.set_options(&[SetDirective::Toggle("wrap".to_string())]);
            }
            Action::ToggleLock => {
                let tab = self.session.active_mut();
                let on = !tab.is_locked();
                tab.set_locked(on);
                self.notice(if on { "Tab locked" } else { "Tab unlocked" });
                self.frame();
            }
            Action::ToggleReadOnly => {
                let tab = self.session.active_mut();
                let on = !tab.is_read_only();
                tab.set_read_only(on);
                self.notice(if on { "Read-only" } else { "Editable" });
                self.frame();
            }
            Action::SetLanguage(language) => {
                self.session.active_mut().set_language(language);
                self.frame();
            }
            Action::SetTheme(name) => match self.theme.set_theme(&name) {
                Ok(_) => self.theme_changed(self.theme.name()),
                Err(e) => self.error(e),
            },
            Action::CycleTheme => {
                let name = self.theme.cycle();
                self.theme_changed(name);
            }
            Action::ToggleAutoSave => {
                self.set_options(&[SetDirective::Toggle("autosave".to_string())]);
            }

            Action::Explorer(request) => self.explore(request, prompt),
            Action::RunCommand(command) => self.run_command(&command),
            Action::Git(request) => self.git(request),

            Action::Show => self.frame(),
            Action::Stats => {
                let s = self.session.active().stats();
                self.text(&format!(
                    "Characters: {}\nWords: {}\nLines: {}\nParagraphs: {}",
                    s.chars, s.words, s.lines, s.paragraphs
                ));
            }
            Action::Set(directives) => self.set_options(&directives),
            Action::Help => self.text(HELP),
            Action::Quit => return self.quit(prompt),
            Action::Invalid(msg) => self.error(msg),
        }
        Flow::Continue
    }

    fn open(&mut self, path: &Path, prompt: &mut dyn Prompt, recent: bool) {
        let result = if recent {
            self.session.open_recent(path, prompt)
        } else {
            self.session.open_file(path, prompt)
        };
        match result {
            Ok(true) => {
                self.notice(format!("Opened {}", path.display()));
                self.frame();
            }
            Ok(false) => self.notice("Open cancelled"),
            Err(e) => self.error(e),
        }
    }

    fn explore(&mut self, request: ExplorerAction, prompt: &mut dyn Prompt) {
        match request {
            ExplorerAction::Toggle => {
                if self.explorer.toggle() {
                    self.frame();
                } else {
                    self.notice("Explorer hidden");
                }
            }
            ExplorerAction::List => self.listing(),
            ExplorerAction::Up => {
                if self.explorer.up() {
                    self.listing();
                } else {
                    self.notice("Already at the top");
                }
            }
            ExplorerAction::Home => match self.explorer.home() {
                Ok(()) => self.listing(),
                Err(e) => self.error(e),
            },
            ExplorerAction::Go(path) => match self.explorer.go(&path) {
                Ok(()) => self.listing(),
                Err(e) => self.error(e),
            },
            ExplorerAction::Activate(name) => match self.explorer.activate(&name) {
                Ok(Activation::Entered(_)) => self.listing(),
                Ok(Activation::Open(path)) => self.open(&path, prompt, false),
                Err(e) => self.error(e),
            },
        }
    }

    /// Show the explorer listing. A visible sidebar comes with every frame.
    fn listing(&mut self) {
        if self.explorer.is_visible() {
            self.frame();
        } else {
            self.pending.push(Output::Explorer);
        }
    }

    fn saved(&mut self) {
        let name = self.session.active().title();
        self.notice(format!("Saved {name}"));
    }

    fn found(&mut self, term: &str, result: EditorResult<Option<ns_editor::search::Match>>) {
        match result {
            Ok(Some(m)) => {
                self.notice(format!("Found at Ln {}, Col {}", m.start.line + 1, m.start.col + 1));
                self.frame();
            }
            Ok(None) => self.notice(format!("'{term}' not found")),
            Err(e) => self.error(e),
        }
    }

    fn theme_changed(&mut self, name: ThemeName) {
        let directive = SetDirective::Assign("theme".to_string(), name.name().to_string());
        if let Err(e) = self.session.apply_option(&directive) {
            self.error(e);
        }
        self.notice(format!("Theme: {name}"));
    }

    fn set_options(&mut self, directives: &[SetDirective]) {
        if directives.is_empty() {
            return self.set_options(&[SetDirective::ShowChanged]);
        }
        for directive in directives {
            match self.session.apply_option(directive) {
                Ok(SetOutcome::Changed(name)) => self.option_changed(name),
                Ok(SetOutcome::Show(text)) if text.is_empty() => self.notice("No options changed"),
                Ok(SetOutcome::Show(text)) => self.notice(text),
                Err(e) => self.error(e),
            }
        }
    }

    /// Apply side effects of an option change.
    fn option_changed(&mut self, name: &str) {
        let config = self.session.config();
        match name {
            "theme" => {
                self.theme.set(config.theme);
            }
            "autosave" | "autosaveinterval" => {
                let (on, interval) = (config.auto_save, config.auto_save_interval);
                let now = Instant::now();
                self.autosave.set_interval(interval, now);
                match (on, self.autosave.is_running()) {
                    (true, false) => self.autosave.start(now),
                    (false, true) => self.autosave.stop(),
                    _ => {}
                }
                self.notice(if on {
                    format!("Auto-save every {}s", interval.as_secs())
                } else {
                    "Auto-save off".to_string()
                });
                return;
            }
            "number" | "wrap" | "columns" | "language" | "font" | "fontsize" => self.frame(),
            _ => {}
        }
        debug!(option = name, "option applied");
    }

    fn quit(&mut self, prompt: &mut dyn Prompt) -> Flow {
        let dirty: Vec<_> = self
            .session
            .tabs()
            .iter()
            .filter(|t| t.document().is_dirty())
            .map(ns_editor::session::Tab::id)
            .collect();
        if dirty.is_empty() {
            return Flow::Quit;
        }
        let title = format!("{} unsaved tab(s)", dirty.len());
        match prompt.unsaved_changes(&title) {
            CloseDecision::Discard => Flow::Quit,
            CloseDecision::Cancel => {
                self.notice("Quit cancelled");
                Flow::Continue
            }
            CloseDecision::Save => {
                for id in dirty {
                    if let Err(e) = self.session.switch_to(id) {
                        self.error(e);
                        return Flow::Continue;
                    }
                    match self.session.save_active(prompt) {
                        Ok(true) => {}
                        Ok(false) => {
                            self.notice("Quit cancelled");
                            return Flow::Continue;
                        }
                        Err(e) => {
                            self.error(e);
                            return Flow::Continue;
                        }
                    }
                }
                Flow::Quit
            }
        }
    }

    // -- Terminal & git -----------------------------------------------------

    fn run_command(&mut self, command: &str) {
        let mark = self.terminal.mark();
        let execution = self.terminal.execute(command);
        let lines = self.terminal.since(mark).cloned().collect();
        self.lines(lines);

        if let Execution::Spawn(job) = execution {
            let spawned = self.pool.spawn("shell", move |id, tx: SyncSender<Event>| {
                let result = job.run(|ev| tx.send(Event::Shell(id, ev)).is_ok());
                if let Err(e) = result {
                    let _ = tx.send(Event::Shell(id, ShellEvent::Failed(e.to_string())));
                }
            });
            if let Err(e) = spawned {
                self.error(format!("Could not start command: {e}"));
            }
        }
    }

    fn git(&mut self, request: GitAction) {
        if self.git.as_ref().is_none_or(|g| g.dir() != self.terminal.cwd()) {
            match Git::detect(self.terminal.cwd()) {
                Ok(git) => self.git = Some(git),
                Err(e) => {
                    self.git = None;
                    return self.error(e);
                }
            }
        }
        let Some(git) = self.git.clone() else {
            return;
        };
        let spawned = self.pool.spawn("git", move |id, tx: SyncSender<Event>| {
            let reply = match request {
                GitAction::Status => GitReply::Status(git.status()),
                GitAction::Add => GitReply::Done(git.add_all()),
                GitAction::Commit(message) => GitReply::Done(git.commit(&message)),
                GitAction::Pull => GitReply::Done(git.pull()),
                GitAction::Push => GitReply::Done(git.push()),
            };
            let _ = tx.send(Event::Git(id, reply));
        });
        if let Err(e) = spawned {
            self.error(format!("Could not start git: {e}"));
        }
    }

    // -- Loop hooks ---------------------------------------------------------

    /// Handle a non-input event.
    pub fn on_event(&mut self, event: Event) {
        match event {
            Event::Shell(id, ev) => {
                debug!(job = %id, ?ev, "shell event");
                let mark = self.terminal.mark();
                self.terminal.on_event(ev);
                let lines: Vec<_> = self.terminal.since(mark).cloned().collect();
                if !lines.is_empty() {
                    self.lines(lines);
                }
            }
            Event::Git(id, reply) => {
                debug!(job = %id, "git reply");
                match reply {
                    GitReply::Status(Ok(status)) => {
                        self.notice(format!("Branch: {}  {}", status.branch, status.summary()));
                    }
                    GitReply::Done(Ok(text)) => self.notice(text),
                    GitReply::Status(Err(e)) | GitReply::Done(Err(e)) => self.error(e),
                }
            }
            Event::Input(_) | Event::InputClosed => {}
        }
    }

    /// Periodic work: the auto-save deadline.
    pub fn tick(&mut self, now: Instant) {
        if !self.autosave.poll(now) {
            return;
        }
        let report = self.session.auto_save();
        if !report.saved.is_empty() {
            self.notice(format!("Auto-saved {} file(s)", report.saved.len()));
        }
        for e in report.failed {
            self.error(format!("Auto-save failed: {e}"));
        }
    }

    /// Print everything queued since the last flush.
    ///
    /// # Errors
    ///
    /// Any write error from `out`.
    pub fn flush(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.repaint.replace(false) && !self.pending.contains(&Output::Frame) {
            self.pending.push(Output::Frame);
        }
        let pending = std::mem::take(&mut self.pending);
        let mut framed = false;
        for item in pending {
            match item {
                Output::Frame if framed => {}
                Output::Frame => {
                    framed = true;
                    if self.explorer.is_visible() {
                        self.renderer
                            .explorer(out, &self.explorer, self.theme.current())?;
                    }
                    self.renderer.frame(
                        out,
                        &self.session,
                        self.theme.current(),
                        self.session.config(),
                    )?;
                }
                Output::Explorer => {
                    self.renderer
                        .explorer(out, &self.explorer, self.theme.current())?;
                }
                Output::Notice { text, error } => self.renderer.notice(out, &text, error)?,
                Output::Lines(lines) => self.renderer.terminal_lines(out, &lines)?,
            }
        }
        out.flush()
    }
}

// ─── Prompt over the event channel ──────────────────────────────────────────

/// Asks questions on `out` and reads answers from the input events.
/// Other events that arrive meanwhile are kept for the loop.
struct ChannelPrompt<'a, W: Write> {
    rx: &'a Receiver<Event>,
    deferred: &'a mut VecDeque<Event>,
    out: &'a mut W,
}

impl<W: Write> ChannelPrompt<'_, W> {
    fn ask(&mut self, question: &str) -> Option<String> {
        if write!(self.out, "{question} ").and_then(|()| self.out.flush()).is_err() {
            return None;
        }
        loop {
            match self.rx.recv() {
                Ok(Event::Input(line)) => return Some(line.trim().to_string()),
                Ok(Event::InputClosed) | Err(_) => return None,
                Ok(other) => self.deferred.push_back(other),
            }
        }
    }
}

impl<W: Write> Prompt for ChannelPrompt<'_, W> {
    fn unsaved_changes(&mut self, title: &str) -> CloseDecision {
        let answer = self.ask(&format!("Save changes to {title}? [y]es / [n]o / [c]ancel"));
        match answer.as_deref().map(str::to_lowercase).as_deref() {
            Some("y" | "yes") => CloseDecision::Save,
            Some("n" | "no") => CloseDecision::Discard,
            _ => CloseDecision::Cancel,
        }
    }

    fn choose_save_path(&mut self, title: &str) -> Option<PathBuf> {
        self.ask(&format!("Save {title} as:"))
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    fn confirm_large_file(&mut self, path: &Path, size: u64) -> bool {
        let mib = size / (1024 * 1024);
        let answer = self.ask(&format!(
            "{} is {mib} MiB. Open anyway? [y/N]",
            path.display()
        ));
        matches!(answer.as_deref(), Some("y" | "Y" | "yes"))
    }
}

/// Drive `app` until quit or end of input.
///
/// # Errors
///
/// Write errors on `out`.
pub fn run(app: &mut App, rx: &Receiver<Event>, out: &mut impl Write) -> io::Result<()> {
    let mut deferred: VecDeque<Event> = VecDeque::new();
    app.frame();
    app.flush(out)?;

    loop {
        let event = match deferred.pop_front() {
            Some(e) => Ok(e),
            None => rx.recv_timeout(TICK),
        };
        match event {
            Ok(Event::Input(line)) => {
                let action = Action::parse(&line);
                let mut prompt = ChannelPrompt {
                    rx,
                    deferred: &mut deferred,
                    out: &mut *out,
                };
                let flow = app.dispatch(action, &mut prompt);
                app.flush(out)?;
                if flow == Flow::Quit {
                    break;
                }
            }
            Ok(Event::InputClosed) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(other) => {
                app.on_event(other);
                app.flush(out)?;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
        app.tick(Instant::now());
        app.flush(out)?;
    }
    info!("event loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ns_editor::language::Language;
    use ns_term::worker;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[derive(Default)]
    struct Answers {
        decision: Option<CloseDecision>,
        path: Option<PathBuf>,
    }

    impl Prompt for Answers {
        fn unsaved_changes(&mut self, _title: &str) -> CloseDecision {
            self.decision.unwrap_or(CloseDecision::Cancel)
        }
        fn choose_save_path(&mut self, _title: &str) -> Option<PathBuf> {
            self.path.clone()
        }
        fn confirm_large_file(&mut self, _path: &Path, _size: u64) -> bool {
            false
        }
    }

    fn app_in(dir: &Path) -> (App, Receiver<Event>) {
        let (pool, rx) = worker::channel(16);
        let registry = Arc::new(LanguageRegistry::builtin().unwrap());
        let app = App::new(
            Config::default(),
            registry,
            pool,
            dir.to_path_buf(),
            Renderer { color: false },
        );
        (app, rx)
    }

    fn exec(app: &mut App, line: &str) -> String {
        let flow = app.dispatch(Action::parse(line), &mut Answers::default());
        assert_eq!(flow, Flow::Continue, "{line}");
        let mut out = Vec::new();
        app.flush(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn edit_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.py");
        let (mut app, _rx) = app_in(dir.path());

        let frame = exec(&mut app, "i def hello():\\n    pass");
        assert!(frame.contains("  1 def hello():"));
        let out = exec(&mut app, &format!("saveas {}", path.display()));
        assert!(out.contains("Saved hello.py"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "def hello():\n    pass");
        assert_eq!(app.session().active().language(), Language::Python);
    }

    #[test]
    fn find_then_find_next() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_in(dir.path());
        exec(&mut app, "i ab ab");
        exec(&mut app, "goto 1");
        assert!(exec(&mut app, "/ab").contains("Found at Ln 1, Col 1"));
        assert!(exec(&mut app, "n").contains("Found at Ln 1, Col 4"));
        assert!(exec(&mut app, "n").contains("'ab' not found"));
    }

    #[test]
    fn errors_become_notices() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_in(dir.path());
        assert!(exec(&mut app, "close").contains("Cannot close the last tab"));
        assert!(exec(&mut app, "bogus").contains("Unknown command: bogus"));
        assert!(exec(&mut app, "theme neon").contains("unknown theme 'neon'"));
        exec(&mut app, "readonly");
        assert!(exec(&mut app, "i x").contains("This tab is read-only"));
        assert!(exec(&mut app, "n").contains("No previous search"));
    }

    #[test]
    fn theme_change_mirrors_into_config_and_repaints() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_in(dir.path());
        let out = exec(&mut app, "theme dark");
        assert!(out.contains("Theme: dark"));
        assert!(out.contains("[Untitled]"));
        assert_eq!(app.session().config().theme, ThemeName::Dark);

        exec(&mut app, "set theme=monokai");
        assert_eq!(app.theme.name(), ThemeName::Monokai);
    }

    #[test]
    fn autosave_toggle_arms_the_timer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "").unwrap();
        let (mut app, _rx) = app_in(dir.path());
        exec(&mut app, &format!("open {}", path.display()));
        exec(&mut app, "i changed");

        assert!(exec(&mut app, "autosave").contains("Auto-save every 120s"));
        app.tick(Instant::now() + Duration::from_secs(121));
        let mut out = Vec::new();
        app.flush(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Auto-saved 1 file(s)"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "changed");
    }

    #[test]
    fn idle_loop_prints_auto_save_notice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idle.txt");
        fs::write(&path, "").unwrap();
        let (pool, rx) = worker::channel(16);
        let config = Config {
            auto_save: true,
            auto_save_interval: Duration::from_millis(20),
            ..Config::default()
        };
        let registry = Arc::new(LanguageRegistry::builtin().unwrap());
        let mut app = App::new(
            config,
            registry,
            pool,
            dir.path().to_path_buf(),
            Renderer { color: false },
        );
        exec(&mut app, &format!("open {}", path.display()));
        exec(&mut app, "i idle");

        let tx = app.pool.sender();
        let closer = std::thread::spawn(move || {
            std::thread::sleep(TICK * 3);
            tx.send(Event::InputClosed).unwrap();
        });
        let mut out = Vec::new();
        run(&mut app, &rx, &mut out).unwrap();
        closer.join().unwrap();

        // Input closing ends the loop without a flush, so the notice was
        // written by an idle tick.
        assert!(String::from_utf8(out).unwrap().contains("Auto-saved 1 file(s)"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "idle");
    }

    #[test]
    fn explorer_navigates_and_opens_into_active_tab() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("notes").join("todo.md"), "- milk").unwrap();
        fs::write(dir.path().join(".secret"), "").unwrap();
        let (mut app, _rx) = app_in(dir.path());

        let listing = exec(&mut app, "x");
        assert!(listing.contains("  notes/"));
        assert!(!listing.contains(".secret"));
        assert!(exec(&mut app, "x notes").contains("  todo.md"));
        let out = exec(&mut app, "x todo.md");
        assert!(out.contains("Opened"));
        assert_eq!(app.session().len(), 1);
        assert_eq!(app.session().active().document().text(), "- milk");

        assert!(exec(&mut app, "x nothing").contains("No entry named nothing"));
        assert!(exec(&mut app, "xcd todo.md").contains("not a directory"));
        assert!(exec(&mut app, "xup").contains("  notes/"));
    }

    #[test]
    fn visible_sidebar_comes_with_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        let (mut app, _rx) = app_in(dir.path());
        assert!(!exec(&mut app, "show").contains("Explorer: "));
        let out = exec(&mut app, "sidebar");
        assert!(out.contains("Explorer: "));
        assert!(out.contains("  a.txt"));
        assert!(exec(&mut app, "show").contains("Explorer: "));
        assert!(exec(&mut app, "sidebar").contains("Explorer hidden"));
    }

    #[test]
    fn wrap_toggle_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_in(dir.path());
        exec(&mut app, "set columns=5");
        assert!(exec(&mut app, "i abcdefgh").contains("    fgh"));
        exec(&mut app, "wrap");
        assert!(!app.session().config().word_wrap);
        assert!(exec(&mut app, "show").contains("  1 abcdefgh"));

        exec(&mut app, "i \\n");
        exec(&mut app, "timestamp");
        let text = app.session().active().document().text();
        assert_eq!(text.lines().nth(1).map(str::len), Some(19));
    }

    #[test]
    fn quit_with_unsaved_changes_asks() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_in(dir.path());
        assert_eq!(
            app.dispatch(Action::Quit, &mut Answers::default()),
            Flow::Quit
        );
        exec(&mut app, "i draft");
        assert_eq!(
            app.dispatch(Action::Quit, &mut Answers::default()),
            Flow::Continue
        );
        let mut discard = Answers {
            decision: Some(CloseDecision::Discard),
            ..Answers::default()
        };
        assert_eq!(app.dispatch(Action::Quit, &mut discard), Flow::Quit);

        let path = dir.path().join("draft.txt");
        let mut save = Answers {
            decision: Some(CloseDecision::Save),
            path: Some(path.clone()),
        };
        assert_eq!(app.dispatch(Action::Quit, &mut save), Flow::Quit);
        assert_eq!(fs::read_to_string(path).unwrap(), "draft");
    }

    #[cfg(unix)]
    #[test]
    fn shell_output_arrives_as_events() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, rx) = app_in(dir.path());
        let echoed = exec(&mut app, "!echo hello");
        assert!(echoed.contains("$ echo hello"));

        let mut lines = Vec::new();
        loop {
            match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
                Event::Shell(_, ShellEvent::Exited(code)) => {
                    assert_eq!(code, Some(0));
                    break;
                }
                Event::Shell(_, ShellEvent::Line(l)) => lines.push(l),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(lines, vec!["hello".to_string()]);
    }

    #[test]
    fn builtin_terminal_commands_print_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _rx) = app_in(dir.path());
        let out = exec(&mut app, "term pwd");
        assert!(out.contains(&dir.path().display().to_string()));
    }
}
