// SPDX-License-Identifier: MIT
//
// Terminal panel — a line-oriented shell inside the editor.
//
// `Terminal::execute` takes one command line. A handful of built-ins
// (`help`, `clear`, `cd`, `pwd`, `ls`) are answered on the spot against
// the panel's own working directory. Everything else becomes a
// `ShellCommand`: an owned (command, cwd) snapshot the caller runs on a
// worker thread. Its output streams back line by line, stdout and stderr
// merged, followed by the exit status.
//
// The panel keeps its scrollback as tagged `OutputLine`s so the renderer
// can color prompts, errors, and directory entries differently.

use std::collections::VecDeque;
use std::env;
use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::{debug, info};

/// Scrollback lines kept before the oldest are dropped.
pub const MAX_OUTPUT_LINES: usize = 5000;

const HELP: &str = "\
Available commands:
  help, ?          - Show this help message
  clear            - Clear terminal output
  cd <path>        - Change directory
  pwd              - Show current directory
  ls, dir          - List directory contents

All other commands are passed to the system shell.
Use Up/Down to navigate command history.
Use Tab for path completion.";

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum TerminalError {
    /// `cd` to something that is not a directory.
    NoSuchDirectory(String),
    /// The working directory could not be listed.
    ReadDir { path: PathBuf, source: io::Error },
    /// The shell could not be started.
    Spawn(io::Error),
    /// Reading the shell's output failed.
    Output(io::Error),
}

impl fmt::Display for TerminalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchDirectory(path) => write!(f, "Directory not found: {path}"),
            Self::ReadDir { path, source } => {
                write!(f, "Error listing directory {}: {source}", path.display())
            }
            Self::Spawn(e) => write!(f, "Error: {e}"),
            Self::Output(e) => write!(f, "Error reading output: {e}"),
        }
    }
}

impl std::error::Error for TerminalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoSuchDirectory(_) => None,
            Self::ReadDir { source, .. } | Self::Spawn(source) | Self::Output(source) => {
                Some(source)
            }
        }
    }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// How a scrollback line is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Normal,
    /// The echoed `dir $ command` prompt.
    Command,
    Error,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: LineKind,
    pub text: String,
}

impl OutputLine {
    #[must_use]
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(LineKind::Normal, text)
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(LineKind::Error, text)
    }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// Command history with up/down browsing.
///
/// A command already in the history is not added again. Browsing starts
/// past the newest entry; `down` from the newest entry returns an empty
/// line.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    /// Steps back from the newest entry, `None` when not browsing.
    index: Option<usize>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: None,
        }
    }

    pub fn push(&mut self, command: &str) {
        if !self.entries.iter().any(|e| e == command) {
            self.entries.push(command.to_string());
        }
        self.index = None;
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Step to an older entry. `None` when already at the oldest.
    pub fn up(&mut self) -> Option<&str> {
        let next = self.index.map_or(0, |i| i + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.index = Some(next);
        Some(&self.entries[self.entries.len() - 1 - next])
    }

    /// Step to a newer entry. Leaving the newest entry yields `""`;
    /// `None` when not browsing.
    pub fn down(&mut self) -> Option<&str> {
        match self.index? {
            0 => {
                self.index = None;
                Some("")
            }
            i => {
                self.index = Some(i - 1);
                Some(&self.entries[self.entries.len() - i])
            }
        }
    }
}

// ─── Shell jobs ──────────────────────────────────────────────────────────────

/// What a running shell command reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Line(String),
    /// The command finished; `None` when killed by a signal.
    Exited(Option<i32>),
    Failed(String),
}

/// An owned snapshot of a command to run on a worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub command: String,
    pub cwd: PathBuf,
}

impl ShellCommand {
    fn shell(&self) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(format!("{} 2>&1", self.command));
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(format!("exec 2>&1\n{}", self.command));
            cmd
        }
    }

    /// Run to completion, passing each output line to `emit`, then the
    /// exit status. `emit` returns `false` to stop reading (the receiver
    /// went away); the child is then left to finish on its own.
    ///
    /// # Errors
    ///
    /// [`TerminalError::Spawn`] if the shell cannot start,
    /// [`TerminalError::Output`] if reading its output fails.
    pub fn run(&self, mut emit: impl FnMut(ShellEvent) -> bool) -> Result<(), TerminalError> {
        let mut child = self
            .shell()
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(TerminalError::Spawn)?;
        debug!(command = %self.command, cwd = %self.cwd.display(), "shell started");

        let forwarded = match child.stdout.take() {
            Some(stdout) => forward_lines(stdout, &mut emit),
            None => Ok(true),
        };
        match forwarded {
            Ok(true) => {}
            Ok(false) => {
                debug!(command = %self.command, "output no longer wanted, stopping shell");
                stop(&mut child);
                return Ok(());
            }
            Err(e) => {
                stop(&mut child);
                return Err(e);
            }
        }

        let status = child.wait().map_err(TerminalError::Output)?;
        info!(command = %self.command, code = ?status.code(), "shell finished");
        emit(ShellEvent::Exited(status.code()));
        Ok(())
    }
}

/// Send each output line to `emit`. `Ok(false)` when `emit` asked to stop.
fn forward_lines(
    stdout: ChildStdout,
    emit: &mut impl FnMut(ShellEvent) -> bool,
) -> Result<bool, TerminalError> {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(TerminalError::Output)?;
        if n == 0 {
            return Ok(true);
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if !emit(ShellEvent::Line(line)) {
            return Ok(false);
        }
    }
}

/// Kill a shell that is no longer read from and reap it.
fn stop(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "kill failed, shell already exited");
    }
    if let Err(e) = child.wait() {
        debug!(error = %e, "could not reap shell");
    }
}

/// Scrollback line for a finished command, if it deserves one.
#[must_use]
pub fn exit_notice(code: Option<i32>) -> Option<OutputLine> {
    match code {
        Some(0) => None,
        Some(n) => Some(OutputLine::error(format!("Command exited with code {n}"))),
        None => Some(OutputLine::error("Command terminated by signal")),
    }
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// What `execute` asks the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// Handled; the scrollback is up to date.
    Done,
    /// Run this on a worker and feed its events to [`Terminal::on_event`].
    Spawn(ShellCommand),
}

/// The terminal panel: working directory, history, and scrollback.
#[derive(Debug, Clone)]
pub struct Terminal {
    cwd: PathBuf,
    history: History,
    output: VecDeque<OutputLine>,
    /// Lines ever pushed, including ones since dropped or cleared.
    written: usize,
}

impl Terminal {
    /// A terminal rooted at `cwd`, greeting in its scrollback.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        let mut term = Self {
            cwd,
            history: History::new(),
            output: VecDeque::new(),
            written: 0,
        };
        term.push(OutputLine::normal(format!(
            "Terminal ready - {}",
            term.cwd.display()
        )));
        term.push(OutputLine::normal("Type 'help' for available commands."));
        term
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    pub const fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn output(&self) -> impl Iterator<Item = &OutputLine> {
        self.output.iter()
    }

    /// The last `n` scrollback lines.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &OutputLine> {
        self.output.iter().skip(self.output.len().saturating_sub(n))
    }

    pub fn push(&mut self, line: OutputLine) {
        if self.output.len() == MAX_OUTPUT_LINES {
            self.output.pop_front();
        }
        self.output.push_back(line);
        self.written += 1;
    }

    /// A marker for [`since`](Self::since).
    #[must_use]
    pub const fn mark(&self) -> usize {
        self.written
    }

    /// Lines pushed after `mark` that are still in the scrollback.
    pub fn since(&self, mark: usize) -> impl Iterator<Item = &OutputLine> {
        self.tail(self.written.saturating_sub(mark))
    }

    /// Prompt label: the last component of the working directory.
    #[must_use]
    pub fn prompt(&self) -> String {
        let dir = self
            .cwd
            .file_name()
            .map_or_else(|| self.cwd.display().to_string(), |n| n.to_string_lossy().into_owned());
        format!("{dir} $")
    }

    /// Run one command line.
    pub fn execute(&mut self, line: &str) -> Execution {
        let command = line.trim();
        if command.is_empty() {
            return Execution::Done;
        }
        self.history.push(command);
        let prompt = format!("{} {command}", self.prompt());
        self.push(OutputLine::new(LineKind::Command, prompt));

        let lower = command.to_lowercase();
        match lower.as_str() {
            "help" | "?" => {
                for l in HELP.lines() {
                    self.push(OutputLine::normal(l));
                }
            }
            "clear" => {
                self.output.clear();
                let msg = format!("Terminal cleared - Current directory: {}", self.cwd.display());
                self.push(OutputLine::normal(msg));
            }
            "pwd" => self.push(OutputLine::normal(self.cwd.display().to_string())),
            "ls" | "dir" => match self.list_dir() {
                Ok(lines) => lines.into_iter().for_each(|l| self.push(l)),
                Err(e) => self.push(OutputLine::error(e.to_string())),
            },
            "cd" => self.report_cd("~"),
            _ => {
                if let Some(target) = command.strip_prefix("cd ") {
                    self.report_cd(target.trim());
                } else {
                    return Execution::Spawn(ShellCommand {
                        command: command.to_string(),
                        cwd: self.cwd.clone(),
                    });
                }
            }
        }
        Execution::Done
    }

    /// Append a shell job's event to the scrollback.
    pub fn on_event(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::Line(text) => self.push(OutputLine::normal(text)),
            ShellEvent::Exited(code) => {
                if let Some(notice) = exit_notice(code) {
                    self.push(notice);
                }
            }
            ShellEvent::Failed(msg) => self.push(OutputLine::error(msg)),
        }
    }

    fn report_cd(&mut self, target: &str) {
        match self.change_dir(target) {
            Ok(()) => {
                let msg = format!("Changed to: {}", self.cwd.display());
                self.push(OutputLine::normal(msg));
            }
            Err(e) => self.push(OutputLine::error(e.to_string())),
        }
    }

    /// `..`, `~`, absolute, or relative to the current directory.
    ///
    /// # Errors
    ///
    /// [`TerminalError::NoSuchDirectory`] when the target is not a
    /// directory; the working directory is unchanged.
    pub fn change_dir(&mut self, target: &str) -> Result<(), TerminalError> {
        let candidate = match target {
            ".." => self.cwd.parent().map_or_else(|| self.cwd.clone(), Path::to_path_buf),
            "~" => home_dir().ok_or_else(|| TerminalError::NoSuchDirectory(target.to_string()))?,
            _ => self.cwd.join(target),
        };
        if !candidate.is_dir() {
            return Err(TerminalError::NoSuchDirectory(target.to_string()));
        }
        self.cwd = fs::canonicalize(&candidate).unwrap_or(candidate);
        info!(cwd = %self.cwd.display(), "terminal directory changed");
        Ok(())
    }

    /// Sorted entries of the working directory, directories suffixed `/`.
    ///
    /// # Errors
    ///
    /// [`TerminalError::ReadDir`] when the directory cannot be read.
    pub fn list_dir(&self) -> Result<Vec<OutputLine>, TerminalError> {
        let read_err = |source| TerminalError::ReadDir {
            path: self.cwd.clone(),
            source,
        };
        let mut entries: Vec<(String, bool)> = fs::read_dir(&self.cwd)
            .map_err(read_err)?
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e.file_name().to_string_lossy().into_owned(), is_dir)
            })
            .collect();
        entries.sort();
        Ok(entries
            .into_iter()
            .map(|(name, is_dir)| {
                if is_dir {
                    OutputLine::new(LineKind::Directory, format!("{name}/"))
                } else {
                    OutputLine::normal(name)
                }
            })
            .collect())
    }

    /// Complete the last word of `input` when it is a path with exactly
    /// one matching entry. Returns the completed line.
    #[must_use]
    pub fn complete_path(&self, input: &str) -> Option<String> {
        let word_start = input.rfind([' ', '\t']).map_or(0, |i| i + 1);
        let word = &input[word_start..];
        if !word.contains('/') && !word.contains('\\') {
            return None;
        }
        let split = word.rfind(['/', '\\']).map_or(0, |i| i + 1);
        let (dir_part, prefix) = word.split_at(split);
        let dir = if dir_part.is_empty() {
            self.cwd.clone()
        } else {
            self.cwd.join(dir_part)
        };

        let mut matches = fs::read_dir(dir)
            .ok()?
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(prefix));
        let only = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(format!("{}{dir_part}{only}", &input[..word_start]))
    }
}

fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env::var_os(var).map(PathBuf::from)
}
