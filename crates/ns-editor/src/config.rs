//! Editor configuration.
//!
//! A fixed set of options with defaults. Values come from the defaults,
//! then command-line flags, then `set` directives at runtime. Nothing is
//! read from or written to a config file.

use std::time::Duration;

use ns_theme::ThemeName;
use tracing::debug;

use crate::error::{EditorError, Result};
use crate::language::Language;
use crate::options::{SetDirective, canonical_bool, canonical_value, format_bool, parse_size};

pub const DEFAULT_FONT_FAMILY: &str = "Consolas";
pub const DEFAULT_FONT_SIZE: u16 = 12;
pub const DEFAULT_MAX_RECENT_FILES: usize = 15;
pub const DEFAULT_AUTO_SAVE_INTERVAL: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_COLUMNS: usize = 80;

/// Option names in display order for `set all`.
const ALL_OPTIONS: &[&str] = &[
    "autosave",
    "ignorecase",
    "number",
    "wrap",
    "theme",
    "font",
    "fontsize",
    "language",
    "maxrecent",
    "autosaveinterval",
    "maxfilesize",
    "columns",
];

/// Every recognized option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub font_family: String,
    pub font_size: u16,
    pub theme: ThemeName,
    /// Language for new, untitled tabs.
    pub default_language: Language,
    pub max_recent_files: usize,
    pub auto_save: bool,
    pub auto_save_interval: Duration,
    /// Files larger than this need confirmation before loading.
    pub max_file_size: u64,
    /// Case-insensitive find and replace.
    pub ignore_case: bool,
    pub line_numbers: bool,
    /// Break long lines at word boundaries when printing.
    pub word_wrap: bool,
    /// Text width used by word wrap.
    pub columns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            theme: ThemeName::Light,
            default_language: Language::Text,
            max_recent_files: DEFAULT_MAX_RECENT_FILES,
            auto_save: false,
            auto_save_interval: DEFAULT_AUTO_SAVE_INTERVAL,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            ignore_case: true,
            line_numbers: true,
            word_wrap: true,
            columns: DEFAULT_COLUMNS,
        }
    }
}

/// What a successful `set` directive did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// An option changed. Carries its canonical name.
    Changed(&'static str),
    /// Text to show the user (queries and listings).
    Show(String),
}

impl Config {
    /// Apply one directive.
    ///
    /// # Errors
    ///
    /// [`EditorError::InvalidOption`] for unknown names, boolean operations
    /// on valued options, and values that do not parse. The config is
    /// unchanged in that case.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<SetOutcome> {
        match directive {
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v),
            SetDirective::Query(name) => {
                let canonical = canonical_bool(name)
                    .or_else(|| canonical_value(name))
                    .ok_or_else(|| unknown(name))?;
                Ok(SetOutcome::Show(self.describe(canonical)))
            }
            SetDirective::Assign(name, value) => self.assign(name, value),
            SetDirective::ShowChanged => {
                let defaults = Self::default();
                let changed: Vec<String> = ALL_OPTIONS
                    .iter()
                    .filter(|n| self.describe(n) != defaults.describe(n))
                    .map(|n| self.describe(n))
                    .collect();
                Ok(SetOutcome::Show(changed.join("  ")))
            }
            SetDirective::ShowAll => {
                let all: Vec<String> = ALL_OPTIONS.iter().map(|n| self.describe(n)).collect();
                Ok(SetOutcome::Show(all.join("  ")))
            }
        }
    }

    fn set_bool(&mut self, name: &str, f: impl FnOnce(bool) -> bool) -> Result<SetOutcome> {
        let canonical = canonical_bool(name).ok_or_else(|| {
            if canonical_value(name).is_some() {
                EditorError::InvalidOption(format!("{name} needs a value: set {name}=..."))
            } else {
                unknown(name)
            }
        })?;
        let slot = match canonical {
            "autosave" => &mut self.auto_save,
            "ignorecase" => &mut self.ignore_case,
            "wrap" => &mut self.word_wrap,
            _ => &mut self.line_numbers,
        };
        *slot = f(*slot);
        debug!(option = canonical, value = *slot, "option set");
        Ok(SetOutcome::Changed(canonical))
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<SetOutcome> {
        let invalid = || EditorError::InvalidOption(format!("invalid value for {name}: {value}"));
        let canonical = canonical_value(name).ok_or_else(|| unknown(name))?;
        match canonical {
            "theme" => {
                self.theme = value
                    .parse::<ThemeName>()
                    .map_err(|e| EditorError::InvalidOption(e.to_string()))?;
            }
            "font" => {
                if value.trim().is_empty() {
                    return Err(invalid());
                }
                self.font_family = value.to_string();
            }
            "fontsize" => {
                self.font_size = value
                    .parse::<u16>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(invalid)?;
            }
            "language" => {
                self.default_language = Language::from_name(value).ok_or_else(invalid)?;
            }
            "maxrecent" => self.max_recent_files = value.parse().map_err(|_| invalid())?,
            "autosaveinterval" => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(invalid)?;
                self.auto_save_interval = Duration::from_secs(secs);
            }
            "columns" => {
                self.columns = value
                    .parse::<usize>()
                    .ok()
                    .filter(|c| *c > 0)
                    .ok_or_else(invalid)?;
            }
            _ => self.max_file_size = parse_size(value).ok_or_else(invalid)?,
        }
        debug!(option = canonical, value, "option set");
        Ok(SetOutcome::Changed(canonical))
    }

    /// `name=value` (or `name` / `noname` for booleans).
    fn describe(&self, canonical: &str) -> String {
        match canonical {
            "autosave" => format_bool("autosave", self.auto_save),
            "ignorecase" => format_bool("ignorecase", self.ignore_case),
            "number" => format_bool("number", self.line_numbers),
            "wrap" => format_bool("wrap", self.word_wrap),
            "theme" => format!("theme={}", self.theme),
            "font" => format!("font={}", self.font_family),
            "fontsize" => format!("fontsize={}", self.font_size),
            "language" => format!("language={}", self.default_language.name()),
            "maxrecent" => format!("maxrecent={}", self.max_recent_files),
            "autosaveinterval" => {
                format!("autosaveinterval={}", self.auto_save_interval.as_secs())
            }
            "columns" => format!("columns={}", self.columns),
            _ => format!("maxfilesize={}", self.max_file_size),
        }
    }
}

fn unknown(name: &str) -> EditorError {
    EditorError::InvalidOption(format!("Unknown option: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::parse_set;

    fn apply_all(config: &mut Config, args: &str) -> Vec<Result<SetOutcome>> {
        parse_set(args).iter().map(|d| config.apply(d)).collect()
    }

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.font_family, "Consolas");
        assert_eq!(c.font_size, 12);
        assert_eq!(c.theme, ThemeName::Light);
        assert_eq!(c.max_recent_files, 15);
        assert_eq!(c.auto_save_interval, Duration::from_secs(120));
        assert_eq!(c.max_file_size, 10_485_760);
        assert!(c.word_wrap);
        assert_eq!(c.columns, 80);
    }

    #[test]
    fn booleans() {
        let mut c = Config::default();
        apply_all(&mut c, "autosave noic nu! wrap!");
        assert!(c.auto_save);
        assert!(!c.ignore_case);
        assert!(!c.line_numbers);
        assert!(!c.word_wrap);
    }

    #[test]
    fn assignments() {
        let mut c = Config::default();
        let results = apply_all(&mut c, "theme=dark fs=16 lang=py asi=30 mfs=1m maxrecent=3 co=40");
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(c.theme, ThemeName::Dark);
        assert_eq!(c.font_size, 16);
        assert_eq!(c.default_language, Language::Python);
        assert_eq!(c.auto_save_interval, Duration::from_secs(30));
        assert_eq!(c.max_file_size, 1024 * 1024);
        assert_eq!(c.max_recent_files, 3);
        assert_eq!(c.columns, 40);
    }

    #[test]
    fn bad_values_leave_config_alone() {
        let mut c = Config::default();
        for args in ["theme=solarized", "fs=0", "fs=big", "asi=0", "lang=cobol", "mfs=x", "co=0"] {
            let r = apply_all(&mut c, args);
            assert!(matches!(r[0], Err(EditorError::InvalidOption(_))), "{args}");
        }
        assert_eq!(c, Config::default());
    }

    #[test]
    fn unknown_and_misused_options() {
        let mut c = Config::default();
        let err = c.apply(&SetDirective::On("bogus".into())).unwrap_err();
        assert_eq!(err.to_string(), "Unknown option: bogus");
        let err = c.apply(&SetDirective::Toggle("theme".into())).unwrap_err();
        assert!(err.to_string().contains("needs a value"));
    }

    #[test]
    fn queries_and_listings() {
        let mut c = Config::default();
        assert_eq!(
            c.apply(&SetDirective::Query("fs".into())).unwrap(),
            SetOutcome::Show("fontsize=12".into())
        );
        assert_eq!(
            c.apply(&SetDirective::ShowChanged).unwrap(),
            SetOutcome::Show(String::new())
        );
        apply_all(&mut c, "theme=monokai");
        assert_eq!(
            c.apply(&SetDirective::ShowChanged).unwrap(),
            SetOutcome::Show("theme=monokai".into())
        );
        let SetOutcome::Show(all) = c.apply(&SetDirective::ShowAll).unwrap() else {
            panic!("expected listing");
        };
        assert!(all.starts_with("noautosave  ignorecase  number  wrap  theme=monokai"));
    }
}
