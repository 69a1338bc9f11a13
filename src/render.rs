//! ANSI rendering of the active tab.
//!
//! The front-end is line-oriented: after each command the binary prints a
//! frame consisting of the tab strip, the visible window of the active
//! document with gutter and syntax colors, and the status bar. With word
//! wrap on, long lines continue on rows with a blank gutter. The explorer
//! sidebar, when shown, is printed above the frame. Colors come from the
//! current theme; with `color` off the same layout is printed as plain
//! text.

use std::io::{self, Write};

use ns_editor::config::Config;
use ns_editor::explorer::Explorer;
use ns_editor::highlight::category_color;
use ns_editor::session::{Session, Tab};
use ns_editor::status::{TAB_WIDTH, wrap_breaks};
use ns_term::terminal::{LineKind, OutputLine};
use ns_theme::color::RESET;
use ns_theme::palette::Surface;
use ns_theme::syntax::SyntaxPalette;
use ns_theme::{Rgb, Theme};

/// Paints frames for one output stream.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub color: bool,
}

impl Renderer {
    fn paint(self, out: &mut impl Write, (fg, bg): (Rgb, Rgb)) -> io::Result<()> {
        if self.color {
            write!(out, "{}{}", fg.fg_escape(), bg.bg_escape())?;
        }
        Ok(())
    }

    fn reset(self, out: &mut impl Write) -> io::Result<()> {
        if self.color {
            out.write_all(RESET.as_bytes())?;
        }
        Ok(())
    }

    /// Tab strip, document window, status bar.
    pub fn frame(
        self,
        out: &mut impl Write,
        session: &Session,
        theme: &Theme,
        config: &Config,
    ) -> io::Result<()> {
        self.tab_strip(out, session, theme, config)?;
        self.document(out, session.active(), theme, config)?;
        self.status(out, session.active(), theme)
    }

    fn tab_strip(
        self,
        out: &mut impl Write,
        session: &Session,
        theme: &Theme,
        config: &Config,
    ) -> io::Result<()> {
        self.paint(out, theme.ui.surface(Surface::Toolbar))?;
        for (i, tab) in session.tabs().iter().enumerate() {
            if i == session.active_index() {
                write!(out, "[{}] ", tab.title())?;
            } else {
                write!(out, " {}  ", tab.title())?;
            }
        }
        let size = session.active().zoom().effective_size(config.font_size);
        write!(out, "| {} {size}pt", config.font_family)?;
        self.reset(out)?;
        writeln!(out)
    }

    fn document(self, out: &mut impl Write, tab: &Tab, theme: &Theme, config: &Config) -> io::Result<()> {
        let doc = tab.document();
        let gutter = tab.gutter();
        let labels = gutter.visible();
        let selection = doc
            .selection()
            .and_then(|r| Some((doc.pos_to_char_idx(r.start)?, doc.pos_to_char_idx(r.end)?)));

        for (line, label) in gutter.visible_lines().zip(labels) {
            if config.line_numbers {
                self.paint(out, theme.ui.surface(Surface::Gutter))?;
                write!(out, "{label} ")?;
            }
            let Some(text) = doc.line(line) else {
                self.reset(out)?;
                writeln!(out)?;
                continue;
            };
            let categories = tab.highlight().line_categories(doc.rope(), line);
            let line_start = doc.rope().line_to_char(line);
            let chars: Vec<char> = text.chars().take(categories.len()).collect();
            let breaks = if config.word_wrap {
                wrap_breaks(&chars, config.columns)
            } else {
                Vec::new()
            };
            let mut current: Option<(Rgb, Rgb, bool)> = None;
            for (i, &ch) in chars.iter().enumerate() {
                if breaks.contains(&i) {
                    self.reset(out)?;
                    writeln!(out)?;
                    if config.line_numbers {
                        self.paint(out, theme.ui.surface(Surface::Gutter))?;
                        write!(out, "{:w$} ", "", w = gutter.width())?;
                    }
                    current = None;
                }
                let selected =
                    selection.is_some_and(|(s, e)| (s..e).contains(&(line_start + i)));
                let (fg, bg, bold) = if selected {
                    let (fg, bg) = theme.ui.surface(Surface::Selection);
                    (fg, bg, false)
                } else {
                    cell_style(categories[i], theme)
                };
                if self.color && current != Some((fg, bg, bold)) {
                    out.write_all(RESET.as_bytes())?;
                    if bold {
                        out.write_all(b"\x1b[1m")?;
                    }
                    self.paint(out, (fg, bg))?;
                    current = Some((fg, bg, bold));
                }
                if ch == '\t' {
                    write!(out, "{:w$}", "", w = TAB_WIDTH)?;
                } else {
                    write!(out, "{ch}")?;
                }
            }
            self.reset(out)?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn status(self, out: &mut impl Write, tab: &Tab, theme: &Theme) -> io::Result<()> {
        self.paint(out, theme.ui.surface(Surface::Status))?;
        write!(out, "{}", tab.status_line())?;
        self.reset(out)?;
        writeln!(out)
    }

    /// The explorer: its directory, then one row per entry.
    pub fn explorer(self, out: &mut impl Write, explorer: &Explorer, theme: &Theme) -> io::Result<()> {
        let colors = theme.ui.surface(Surface::Sidebar);
        self.paint(out, colors)?;
        write!(out, "Explorer: {}", explorer.cwd().display())?;
        self.reset(out)?;
        writeln!(out)?;
        for entry in explorer.entries() {
            self.paint(out, colors)?;
            write!(out, "  {entry}")?;
            self.reset(out)?;
            writeln!(out)?;
        }
        Ok(())
    }

    /// Terminal scrollback lines, colored by kind.
    pub fn terminal_lines<'a>(
        self,
        out: &mut impl Write,
        lines: impl IntoIterator<Item = &'a OutputLine>,
    ) -> io::Result<()> {
        for line in lines {
            let color = match line.kind {
                LineKind::Normal => None,
                LineKind::Command => Some(Rgb::from_u32(0x00ff00)),
                LineKind::Error => Some(Rgb::from_u32(0xff6b6b)),
                LineKind::Directory => Some(Rgb::from_u32(0x4dabf7)),
            };
            match color {
                Some(c) if self.color => writeln!(out, "{}{}{RESET}", c.fg_escape(), line.text)?,
                _ => writeln!(out, "{}", line.text)?,
            }
        }
        Ok(())
    }

    /// A one-line notice; errors in red.
    pub fn notice(self, out: &mut impl Write, text: &str, is_error: bool) -> io::Result<()> {
        if self.color && is_error {
            writeln!(out, "{}{text}{RESET}", Rgb::from_u32(0xff6b6b).fg_escape())
        } else {
            writeln!(out, "{text}")
        }
    }
}

fn cell_style(category: Option<ns_editor::language::Category>, theme: &Theme) -> (Rgb, Rgb, bool) {
    let (fg, bg) = theme.ui.surface(Surface::Text);
    category.map_or((fg, bg, false), |c| {
        (
            category_color(c, &theme.syntax),
            bg,
            SyntaxPalette::is_bold(c.name()),
        )
    })
}
