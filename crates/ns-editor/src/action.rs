//! User actions and the command-line syntax that produces them.
//!
//! Every thing the user can ask the editor to do is one [`Action`]
//! variant. The front-end turns its input into actions (here: one command
//! per line, parsed by [`Action::parse`]) and the binary executes them with
//! an exhaustive `match`, so adding an action without handling it is a
//! compile error.
//!
//! # Command syntax
//!
//! | Command                         | Action                                 |
//! |---------------------------------|----------------------------------------|
//! | `new`                           | Open an empty tab                      |
//! | `close`                         | Close the active tab                   |
//! | `next` / `prev`                 | Cycle tabs                             |
//! | `tab N`                         | Switch to the N-th tab (1-based)       |
//! | `open PATH` / `e PATH`          | Load a file into the active tab        |
//! | `recent [N]`                    | List recent files / open the N-th      |
//! | `w` / `save`                    | Save                                   |
//! | `saveas PATH` / `w PATH`        | Save under a new name                  |
//! | `i TEXT`                        | Type text at the cursor (`\n`, `\t`)   |
//! | `timestamp` / `ts`              | Type the current date and time         |
//! | `goto L [C]`                    | Move the cursor (1-based)              |
//! | `select L C L C`                | Select between two positions (1-based) |
//! | `selline`                       | Select the cursor's line               |
//! | `find TERM` / `/TERM`           | Find from the cursor                   |
//! | `n`                             | Find next                              |
//! | `replace /TERM/WITH/`           | Replace the first occurrence           |
//! | `replaceall /TERM/WITH/`        | Replace every occurrence               |
//! | `dup`, `up`, `down`, `join`     | Line operations                        |
//! | `comment`                       | Toggle comments                        |
//! | `complete`                      | List completions at the cursor         |
//! | `zoom in` / `zoom out` / `zoom reset` | Per-tab zoom                     |
//! | `lock` / `readonly`             | Toggle tab flags                       |
//! | `wrap`                          | Toggle word wrap                       |
//! | `lang NAME`                     | Set the highlighting language          |
//! | `theme [NAME]`                  | Set (or cycle) the theme               |
//! | `autosave`                      | Toggle auto-save                       |
//! | `sidebar` / `explorer`          | Show or hide the file explorer         |
//! | `x` / `x NAME`                  | List the explorer / open a row         |
//! | `xup` / `xhome` / `xcd PATH`    | Explorer navigation                    |
//! | `!CMD` / `term CMD`             | Run a terminal command                 |
//! | `git status\|add\|commit MSG\|pull\|push` | Git panel commands           |
//! | `show` / `stats`                | Print the buffer / statistics          |
//! | `set ARGS`                      | Change options                         |
//! | `help` / `?`                    | List commands                          |
//! | `q` / `quit`                    | Quit                                   |

use std::fmt;
use std::path::PathBuf;

use crate::language::Language;
use crate::options::{SetDirective, parse_set};
use crate::position::Position;

/// A git panel request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitAction {
    Status,
    Add,
    Commit(String),
    Pull,
    Push,
}

/// A file explorer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerAction {
    Toggle,
    List,
    Up,
    Home,
    Go(PathBuf),
    /// Enter a folder or open a file, by row name.
    Activate(String),
}

/// Per-tab zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomAction {
    In,
    Out,
    Reset,
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NewTab,
    CloseTab,
    NextTab,
    PrevTab,
    /// 0-based tab index.
    SwitchTab(usize),

    Open(PathBuf),
    ShowRecent,
    /// 0-based index into the recent-files list.
    OpenRecent(usize),
    Save,
    SaveAs(PathBuf),

    Type(String),
    /// 0-based position.
    MoveCursor(Position),
    /// 0-based anchor and head.
    Select(Position, Position),
    SelectLine,
    /// 1-based line.
    GotoLine(usize),
    InsertTimestamp,

    Find(String),
    FindNext,
    Replace { term: String, with: String },
    ReplaceAll { term: String, with: String },

    DuplicateLine,
    MoveLineUp,
    MoveLineDown,
    JoinLines,
    ToggleComment,
    Complete,

    Zoom(ZoomAction),
    ToggleWordWrap,
    ToggleLock,
    ToggleReadOnly,
    SetLanguage(Language),
    SetTheme(String),
    CycleTheme,
    ToggleAutoSave,

    Explorer(ExplorerAction),
    RunCommand(String),
    Git(GitAction),

    Show,
    Stats,
    Set(Vec<SetDirective>),
    Help,
    Quit,

    /// Input that is not a command; carries a message for the user.
    Invalid(String),
}

impl Action {
    /// Parse one command line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Show;
        }
        if let Some(cmd) = trimmed.strip_prefix('!') {
            return Self::RunCommand(cmd.trim().to_string());
        }
        if let Some(term) = trimmed.strip_prefix('/') {
            return Self::Find(term.to_string());
        }

        let (cmd, arg) = trimmed
            .find(char::is_whitespace)
            .map_or((trimmed, ""), |pos| {
                (&trimmed[..pos], trimmed[pos..].trim_start())
            });

        match cmd {
            "new" => Self::NewTab,
            "close" => Self::CloseTab,
            "next" => Self::NextTab,
            "prev" => Self::PrevTab,
            "tab" => one_based(arg).map_or_else(|| usage("tab N"), Self::SwitchTab),
            "open" | "e" => required_path(arg, "open PATH", Self::Open),
            "recent" if arg.is_empty() => Self::ShowRecent,
            "recent" => one_based(arg).map_or_else(|| usage("recent N"), Self::OpenRecent),
            "w" | "save" if arg.is_empty() => Self::Save,
            "w" | "save" | "saveas" => required_path(arg, "saveas PATH", Self::SaveAs),
            "i" | "insert" => Self::Type(unescape(&raw_arg(line, cmd))),
            "goto" => parse_goto(arg),
            "select" => parse_select(arg),
            "selline" => Self::SelectLine,
            "timestamp" | "ts" => Self::InsertTimestamp,
            "find" if !arg.is_empty() => Self::Find(raw_arg(line, cmd)),
            "find" => usage("find TERM"),
            "n" => Self::FindNext,
            "replace" => parse_replace(arg, false),
            "replaceall" => parse_replace(arg, true),
            "dup" => Self::DuplicateLine,
            "up" => Self::MoveLineUp,
            "down" => Self::MoveLineDown,
            "join" => Self::JoinLines,
            "comment" => Self::ToggleComment,
            "complete" => Self::Complete,
            "zoom" => match arg {
                "in" | "+" => Self::Zoom(ZoomAction::In),
                "out" | "-" => Self::Zoom(ZoomAction::Out),
                "reset" | "0" => Self::Zoom(ZoomAction::Reset),
                _ => usage("zoom in|out|reset"),
            },
            "wrap" => Self::ToggleWordWrap,
            "lock" => Self::ToggleLock,
            "readonly" | "ro" => Self::ToggleReadOnly,
            "lang" => Language::from_name(arg).map_or_else(
                || Self::Invalid(format!("Unknown language: {arg}")),
                Self::SetLanguage,
            ),
            "theme" if arg.is_empty() => Self::CycleTheme,
            "theme" => Self::SetTheme(arg.to_string()),
            "autosave" => Self::ToggleAutoSave,
            "sidebar" | "explorer" => Self::Explorer(ExplorerAction::Toggle),
            "x" if arg.is_empty() => Self::Explorer(ExplorerAction::List),
            "x" => Self::Explorer(ExplorerAction::Activate(arg.to_string())),
            "xup" => Self::Explorer(ExplorerAction::Up),
            "xhome" => Self::Explorer(ExplorerAction::Home),
            "xcd" => required_path(arg, "xcd PATH", |p| Self::Explorer(ExplorerAction::Go(p))),
            "term" if !arg.is_empty() => Self::RunCommand(arg.to_string()),
            "term" => usage("term CMD"),
            "git" => parse_git(arg),
            "show" => Self::Show,
            "stats" => Self::Stats,
            "set" => Self::Set(parse_set(arg)),
            "help" | "?" => Self::Help,
            "q" | "quit" => Self::Quit,
            _ => Self::Invalid(format!("Unknown command: {cmd}")),
        }
    }

    /// Key binding of the desktop editor this action comes from.
    #[must_use]
    pub const fn shortcut(&self) -> Option<&'static str> {
        Some(match self {
            Self::NewTab => "Ctrl+T",
            Self::CloseTab => "Ctrl+W",
            Self::Open(_) => "Ctrl+O",
            Self::Save => "Ctrl+S",
            Self::SaveAs(_) => "Ctrl+Shift+S",
            Self::SelectLine => "Ctrl+L",
            Self::GotoLine(_) => "Ctrl+G",
            Self::Find(_) => "Ctrl+F",
            Self::FindNext => "F3",
            Self::Replace { .. } | Self::ReplaceAll { .. } => "Ctrl+H",
            Self::DuplicateLine => "Ctrl+D",
            Self::MoveLineUp => "Alt+Up",
            Self::MoveLineDown => "Alt+Down",
            Self::JoinLines => "Ctrl+J",
            Self::ToggleComment => "Ctrl+/",
            Self::Complete => "Ctrl+Space",
            Self::Zoom(ZoomAction::In) => "Ctrl++",
            Self::Zoom(ZoomAction::Out) => "Ctrl+-",
            Self::Zoom(ZoomAction::Reset) => "Ctrl+0",
            Self::Explorer(ExplorerAction::Toggle) => "Ctrl+B",
            Self::RunCommand(_) => "Ctrl+`",
            Self::Quit => "Ctrl+Q",
            _ => return None,
        })
    }

    /// `true` for actions that change the active document's text.
    #[must_use]
    pub const fn edits_text(&self) -> bool {
        matches!(
            self,
            Self::Type(_)
                | Self::InsertTimestamp
                | Self::Replace { .. }
                | Self::ReplaceAll { .. }
                | Self::DuplicateLine
                | Self::MoveLineUp
                | Self::MoveLineDown
                | Self::JoinLines
                | Self::ToggleComment
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shortcut() {
            Some(key) => write!(f, "{self:?} ({key})"),
            None => write!(f, "{self:?}"),
        }
    }
}

/// Command summary for `help`.
pub const HELP: &str = "\
Tabs:     new  close  next  prev  tab N
Files:    open PATH  save  saveas PATH  recent [N]
Edit:     i TEXT  timestamp  goto L [C]  select L C L C  selline
          dup  up  down  join  comment  complete
Search:   find TERM  /TERM  n  replace /TERM/WITH/  replaceall /TERM/WITH/
View:     show  stats  zoom in|out|reset  wrap  lang NAME  theme [NAME]
Explorer: sidebar  x [NAME]  xup  xhome  xcd PATH
Flags:    lock  readonly  autosave  set OPTION[=VALUE]
Tools:    !CMD  term CMD  git status|add|commit MSG|pull|push
          help  quit";

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

fn usage(form: &str) -> Action {
    Action::Invalid(format!("Usage: {form}"))
}

fn one_based(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

fn required_path(arg: &str, form: &str, make: fn(PathBuf) -> Action) -> Action {
    if arg.is_empty() {
        usage(form)
    } else {
        make(PathBuf::from(arg))
    }
}

/// Everything after the command word and exactly one separator, keeping
/// the rest of the whitespace.
fn raw_arg(line: &str, cmd: &str) -> String {
    let rest = &line.trim_start()[cmd.len()..];
    rest.strip_prefix(char::is_whitespace)
        .unwrap_or(rest)
        .to_string()
}

/// `\n`, `\t` and `\\` escapes.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_goto(arg: &str) -> Action {
    let mut parts = arg.split_whitespace();
    let line = parts.next().and_then(|s| s.parse::<usize>().ok());
    let col = parts.next().map(str::parse::<usize>);
    match (line, col) {
        (Some(line), None) => Action::GotoLine(line),
        (Some(line), Some(Ok(col))) if line > 0 && col > 0 => {
            Action::MoveCursor(Position::new(line - 1, col - 1))
        }
        _ => usage("goto LINE [COL]"),
    }
}

fn parse_select(arg: &str) -> Action {
    let nums: Vec<usize> = arg
        .split_whitespace()
        .filter_map(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .collect();
    match nums.as_slice() {
        &[l1, c1, l2, c2] => Action::Select(
            Position::new(l1 - 1, c1 - 1),
            Position::new(l2 - 1, c2 - 1),
        ),
        _ => usage("select L C L C"),
    }
}

/// `/term/with/` with any delimiter, trailing delimiter optional.
fn parse_replace(arg: &str, all: bool) -> Action {
    let form = if all {
        "replaceall /TERM/WITH/"
    } else {
        "replace /TERM/WITH/"
    };
    let mut chars = arg.chars();
    let Some(delim) = chars.next() else {
        return usage(form);
    };
    let body = chars.as_str();
    let Some((term, rest)) = body.split_once(delim) else {
        return usage(form);
    };
    let with = rest.strip_suffix(delim).unwrap_or(rest);
    if term.is_empty() {
        return usage(form);
    }
    let (term, with) = (term.to_string(), with.to_string());
    if all {
        Action::ReplaceAll { term, with }
    } else {
        Action::Replace { term, with }
    }
}

fn parse_git(arg: &str) -> Action {
    let (sub, rest) = arg
        .split_once(char::is_whitespace)
        .map_or((arg, ""), |(s, r)| (s, r.trim()));
    match sub {
        "" | "status" => Action::Git(GitAction::Status),
        "add" => Action::Git(GitAction::Add),
        "commit" if !rest.is_empty() => Action::Git(GitAction::Commit(rest.to_string())),
        "commit" => usage("git commit MESSAGE"),
        "pull" => Action::Git(GitAction::Pull),
        "push" => Action::Git(GitAction::Push),
        _ => Action::Invalid(format!("Unknown git command: {sub}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_commands() {
        assert_eq!(Action::parse("new"), Action::NewTab);
        assert_eq!(Action::parse("  close "), Action::CloseTab);
        assert_eq!(Action::parse("q"), Action::Quit);
        assert_eq!(Action::parse(""), Action::Show);
        assert_eq!(Action::parse("?"), Action::Help);
    }

    #[test]
    fn paths_and_indices() {
        assert_eq!(Action::parse("open a b.txt"), Action::Open("a b.txt".into()));
        assert_eq!(Action::parse("w"), Action::Save);
        assert_eq!(Action::parse("w out.py"), Action::SaveAs("out.py".into()));
        assert_eq!(Action::parse("tab 2"), Action::SwitchTab(1));
        assert!(matches!(Action::parse("tab 0"), Action::Invalid(_)));
        assert_eq!(Action::parse("recent"), Action::ShowRecent);
        assert_eq!(Action::parse("recent 1"), Action::OpenRecent(0));
        assert!(matches!(Action::parse("open"), Action::Invalid(_)));
    }

    #[test]
    fn typing_keeps_spaces_and_unescapes() {
        assert_eq!(
            Action::parse("i   indented\\nnext\\tx"),
            Action::Type("  indented\nnext\tx".into())
        );
        assert_eq!(Action::parse("i a\\\\n"), Action::Type("a\\n".into()));
    }

    #[test]
    fn cursor_movement() {
        assert_eq!(Action::parse("goto 5"), Action::GotoLine(5));
        assert_eq!(
            Action::parse("goto 2 3"),
            Action::MoveCursor(Position::new(1, 2))
        );
        assert_eq!(
            Action::parse("select 1 1 1 4"),
            Action::Select(Position::new(0, 0), Position::new(0, 3))
        );
        assert!(matches!(Action::parse("select 1 2"), Action::Invalid(_)));
    }

    #[test]
    fn search_forms() {
        assert_eq!(Action::parse("/foo bar"), Action::Find("foo bar".into()));
        assert_eq!(Action::parse("find  x"), Action::Find(" x".into()));
        assert_eq!(
            Action::parse("replace /a/b/"),
            Action::Replace {
                term: "a".into(),
                with: "b".into()
            }
        );
        assert_eq!(
            Action::parse("replaceall |x y|z"),
            Action::ReplaceAll {
                term: "x y".into(),
                with: "z".into()
            }
        );
        assert!(matches!(Action::parse("replace //b/"), Action::Invalid(_)));
    }

    #[test]
    fn tools() {
        assert_eq!(Action::parse("!ls -la"), Action::RunCommand("ls -la".into()));
        assert_eq!(Action::parse("git"), Action::Git(GitAction::Status));
        assert_eq!(
            Action::parse("git commit fix the thing"),
            Action::Git(GitAction::Commit("fix the thing".into()))
        );
        assert!(matches!(Action::parse("git commit"), Action::Invalid(_)));
    }

    #[test]
    fn explorer_and_view_commands() {
        assert_eq!(Action::parse("sidebar"), Action::Explorer(ExplorerAction::Toggle));
        assert_eq!(Action::parse("x"), Action::Explorer(ExplorerAction::List));
        assert_eq!(
            Action::parse("x my notes.txt"),
            Action::Explorer(ExplorerAction::Activate("my notes.txt".into()))
        );
        assert_eq!(Action::parse("x .."), Action::Explorer(ExplorerAction::Activate("..".into())));
        assert_eq!(
            Action::parse("xcd /tmp"),
            Action::Explorer(ExplorerAction::Go("/tmp".into()))
        );
        assert!(matches!(Action::parse("xcd"), Action::Invalid(_)));
        assert_eq!(Action::parse("wrap"), Action::ToggleWordWrap);
        assert_eq!(Action::parse("ts"), Action::InsertTimestamp);
        assert!(Action::InsertTimestamp.edits_text());
        assert_eq!(Action::Explorer(ExplorerAction::Toggle).shortcut(), Some("Ctrl+B"));
    }

    #[test]
    fn settings() {
        assert_eq!(Action::parse("lang py"), Action::SetLanguage(Language::Python));
        assert!(matches!(Action::parse("lang cobol"), Action::Invalid(_)));
        assert_eq!(Action::parse("theme"), Action::CycleTheme);
        assert_eq!(Action::parse("theme dark"), Action::SetTheme("dark".into()));
        assert_eq!(
            Action::parse("set nu!"),
            Action::Set(vec![SetDirective::Toggle("nu".into())])
        );
        assert_eq!(Action::parse("zoom +"), Action::Zoom(ZoomAction::In));
    }

    #[test]
    fn shortcuts() {
        assert_eq!(Action::Save.shortcut(), Some("Ctrl+S"));
        assert_eq!(Action::ToggleComment.shortcut(), Some("Ctrl+/"));
        assert_eq!(Action::Help.shortcut(), None);
        assert_eq!(Action::DuplicateLine.to_string(), "DuplicateLine (Ctrl+D)");
        assert!(Action::JoinLines.edits_text());
        assert!(!Action::Show.edits_text());
    }
}
