//! notesharp — a tabbed notepad-style editor with regex highlighting,
//! themes, and terminal and git panels.
//!
//! The front-end is line-oriented: each input line is one command (see
//! `help`), and the editor answers by printing the affected view. Logs go
//! to stderr so they never interleave with the rendered frames.
//!
//! ```text
//! notesharp notes.md src/main.py --theme dark
//! RUST_LOG=ns_editor=debug notesharp
//! ```

mod app;
mod render;

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ns_editor::config::Config;
use ns_editor::language::{Language, LanguageRegistry};
use ns_editor::options::parse_size;
use ns_editor::session::{CloseDecision, Prompt};
use ns_term::worker::{self, DEFAULT_CAPACITY};
use ns_theme::ThemeName;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::{App, Event};
use crate::render::Renderer;

/// notesharp command line.
///
/// Examples:
///   notesharp                          # one empty tab
///   notesharp a.py b.rs                # open each file in its own tab
///   notesharp --theme monokai          # start with the Monokai theme
///   notesharp --autosave notes.txt     # save dirty files every 2 minutes
#[derive(Parser, Debug, Clone)]
#[command(name = "notesharp", version, about = "A tabbed text editor with highlighting, themes, terminal and git panels")]
struct CliArgs {
    /// Files to open, one tab each.
    files: Vec<PathBuf>,

    /// Theme: light, dark, or monokai.
    #[arg(long, short = 't', value_parser = parse_theme)]
    theme: Option<ThemeName>,

    /// Highlighting language for new, untitled tabs.
    #[arg(long, short = 'l', value_parser = parse_language)]
    language: Option<Language>,

    /// Save dirty files with a path on a timer.
    #[arg(long)]
    autosave: bool,

    /// Auto-save interval in seconds.
    #[arg(long, value_name = "SECS")]
    autosave_interval: Option<u64>,

    /// Files above this size ask before loading (`512k`, `10m`, ...).
    #[arg(long, value_name = "SIZE", value_parser = parse_max_size)]
    max_file_size: Option<u64>,

    /// Print long lines unbroken.
    #[arg(long)]
    no_wrap: bool,

    /// Text width for word wrap.
    #[arg(long, value_name = "COLS", value_parser = parse_columns)]
    columns: Option<usize>,

    /// Start with the file explorer shown.
    #[arg(long)]
    sidebar: bool,

    /// Disable ANSI colors.
    #[arg(long)]
    no_color: bool,

    /// Log filter, overriding RUST_LOG (e.g. `debug`, `ns_editor=trace`).
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn parse_theme(s: &str) -> Result<ThemeName, String> {
    s.parse::<ThemeName>().map_err(|e| e.to_string())
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_name(s).ok_or_else(|| format!("unknown language '{s}'"))
}

fn parse_columns(s: &str) -> Result<usize, String> {
    s.parse::<usize>()
        .ok()
        .filter(|c| *c > 0)
        .ok_or_else(|| format!("invalid width '{s}'"))
}

fn parse_max_size(s: &str) -> Result<u64, String> {
    parse_size(s).ok_or_else(|| format!("invalid size '{s}'"))
}

impl CliArgs {
    /// Defaults overridden by flags.
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(language) = self.language {
            config.default_language = language;
        }
        config.auto_save = self.autosave;
        if let Some(secs) = self.autosave_interval.filter(|s| *s > 0) {
            config.auto_save_interval = std::time::Duration::from_secs(secs);
        }
        if let Some(size) = self.max_file_size {
            config.max_file_size = size;
        }
        config.word_wrap = !self.no_wrap;
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        config
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = filter
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Startup answers: no terminal interaction has begun yet, so large files
/// named on the command line are loaded and nothing else is asked.
struct StartupPrompt;

impl Prompt for StartupPrompt {
    fn unsaved_changes(&mut self, _title: &str) -> CloseDecision {
        CloseDecision::Cancel
    }

    fn choose_save_path(&mut self, _title: &str) -> Option<PathBuf> {
        None
    }

    fn confirm_large_file(&mut self, path: &std::path::Path, size: u64) -> bool {
        warn!(path = %path.display(), size, "opening large file from the command line");
        true
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_level.as_deref());

    let registry = Arc::new(LanguageRegistry::builtin().context("compiling highlight rules")?);
    let cwd = std::env::current_dir().context("reading the current directory")?;
    let (mut pool, rx) = worker::channel::<Event>(DEFAULT_CAPACITY);

    pool.spawn("stdin", |_, tx| {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(Event::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Event::InputClosed);
    })
    .context("starting the input reader")?;

    let color = !args.no_color && io::stdout().is_terminal();
    let mut app = App::new(args.config(), registry, pool, cwd, Renderer { color });
    info!(files = args.files.len(), "notesharp starting");

    if args.sidebar {
        app.dispatch(
            ns_editor::action::Action::Explorer(ns_editor::action::ExplorerAction::Toggle),
            &mut StartupPrompt,
        );
    }

    for (i, path) in args.files.iter().enumerate() {
        if i > 0 {
            app.dispatch(ns_editor::action::Action::NewTab, &mut StartupPrompt);
        }
        app.dispatch(
            ns_editor::action::Action::Open(path.clone()),
            &mut StartupPrompt,
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    app::run(&mut app, &rx, &mut out).context("writing to stdout")?;
    Ok(())
}
