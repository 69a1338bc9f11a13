//! Editor options — the `set` command.
//!
//! Parses `set` directives and validates option names. Option values live
//! on [`Config`](crate::config::Config); this module is only the parsing
//! layer.
//!
//! # Supported syntax
//!
//! | Syntax              | Effect                       |
//! |---------------------|------------------------------|
//! | `set option`        | Enable boolean / show value  |
//! | `set nooption`      | Disable boolean              |
//! | `set option!`       | Toggle boolean               |
//! | `set option?`       | Query current value          |
//! | `set option=value`  | Assign a value               |
//! | `set`               | Show changed options         |
//! | `set all`           | Show all options             |
//!
//! # Option names
//!
//! | Full name          | Abbrev | Type    | Default    |
//! |--------------------|--------|---------|------------|
//! | `autosave`         | `as`   | bool    | false      |
//! | `ignorecase`       | `ic`   | bool    | true       |
//! | `number`           | `nu`   | bool    | true       |
//! | `wrap`             |        | bool    | true       |
//! | `theme`            |        | name    | `light`    |
//! | `font`             |        | string  | `Consolas` |
//! | `fontsize`         | `fs`   | integer | 12         |
//! | `language`         | `lang` | name    | `text`     |
//! | `maxrecent`        |        | integer | 15         |
//! | `autosaveinterval` | `asi`  | seconds | 120        |
//! | `maxfilesize`      | `mfs`  | bytes   | 10485760   |
//! | `columns`          | `co`   | integer | 80         |

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `set option` — enable a boolean option.
    On(String),

    /// `set nooption` — disable a boolean option.
    Off(String),

    /// `set option!` — toggle a boolean option.
    Toggle(String),

    /// `set option?` — query the current value.
    Query(String),

    /// `set option=value` — assign a value.
    Assign(String, String),

    /// `set` with no arguments — show changed options.
    ShowChanged,

    /// `set all` — show all options.
    ShowAll,
}

/// Canonical name for a boolean option or its abbreviation.
#[must_use]
pub fn canonical_bool(name: &str) -> Option<&'static str> {
    match name {
        "autosave" | "as" => Some("autosave"),
        "ignorecase" | "ic" => Some("ignorecase"),
        "number" | "nu" => Some("number"),
        "wrap" => Some("wrap"),
        _ => None,
    }
}

/// Canonical name for a valued option or its abbreviation.
#[must_use]
pub fn canonical_value(name: &str) -> Option<&'static str> {
    match name {
        "theme" => Some("theme"),
        "font" => Some("font"),
        "fontsize" | "fs" => Some("fontsize"),
        "language" | "lang" => Some("language"),
        "maxrecent" => Some("maxrecent"),
        "autosaveinterval" | "asi" => Some("autosaveinterval"),
        "maxfilesize" | "mfs" => Some("maxfilesize"),
        "columns" | "co" => Some("columns"),
        _ => None,
    }
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    canonical_bool(name).is_some()
}

/// Returns `true` if `name` is a known valued option (full name or abbreviation).
#[must_use]
pub fn is_value_option(name: &str) -> bool {
    canonical_value(name).is_some()
}

/// Returns `true` if `name` is any known option.
#[must_use]
pub fn is_known_option(name: &str) -> bool {
    is_bool_option(name) || is_value_option(name)
}

/// Parse the full `set` arguments string into directives.
///
/// Multiple space-separated arguments are supported
/// (`set theme=dark fontsize=14`). An empty argument string produces
/// [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // `nonumber` → Off("number"), but only for known booleans so `notheme`
    // stays an (unknown) option name.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    // A bare valued option shows its value.
    if is_value_option(arg) {
        return SetDirective::Query(arg.to_string());
    }

    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display: `name` or `noname`.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

/// Parse a size with an optional `k`/`m`/`g` suffix (binary units).
#[must_use]
pub fn parse_size(value: &str) -> Option<u64> {
    let v = value.trim().to_ascii_lowercase();
    let (digits, mult) = match v.chars().last()? {
        'k' => (&v[..v.len() - 1], 1024),
        'm' => (&v[..v.len() - 1], 1024 * 1024),
        'g' => (&v[..v.len() - 1], 1024 * 1024 * 1024),
        _ => (v.as_str(), 1),
    };
    digits.trim().parse::<u64>().ok()?.checked_mul(mult)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_set_arg ─────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_on_off() {
        assert_eq!(parse_set_arg("autosave"), SetDirective::On("autosave".into()));
        assert_eq!(parse_set_arg("noas"), SetDirective::Off("as".into()));
        assert_eq!(parse_set_arg("nonumber"), SetDirective::Off("number".into()));
        assert_eq!(parse_set_arg("nowrap"), SetDirective::Off("wrap".into()));
    }

    #[test]
    fn parse_toggle_and_query() {
        assert_eq!(parse_set_arg("ic!"), SetDirective::Toggle("ic".into()));
        assert_eq!(parse_set_arg("theme?"), SetDirective::Query("theme".into()));
    }

    #[test]
    fn parse_assign() {
        assert_eq!(
            parse_set_arg("theme=dark"),
            SetDirective::Assign("theme".into(), "dark".into())
        );
        assert_eq!(
            parse_set_arg("font=Fira=Code"),
            SetDirective::Assign("font".into(), "Fira=Code".into())
        );
    }

    #[test]
    fn bare_value_option_is_query() {
        assert_eq!(parse_set_arg("fontsize"), SetDirective::Query("fontsize".into()));
        assert_eq!(parse_set_arg("lang"), SetDirective::Query("lang".into()));
    }

    #[test]
    fn number_not_confused_with_no_prefix() {
        assert_eq!(parse_set_arg("number"), SetDirective::On("number".into()));
        assert_eq!(parse_set_arg("notheme"), SetDirective::On("notheme".into()));
    }

    #[test]
    fn parse_multiple() {
        assert_eq!(
            parse_set("theme=monokai noic all"),
            vec![
                SetDirective::Assign("theme".into(), "monokai".into()),
                SetDirective::Off("ic".into()),
                SetDirective::ShowAll,
            ]
        );
        assert_eq!(parse_set("  "), vec![SetDirective::ShowChanged]);
    }

    #[test]
    fn names() {
        assert_eq!(canonical_bool("nu"), Some("number"));
        assert_eq!(canonical_value("asi"), Some("autosaveinterval"));
        assert!(!is_known_option("foobar"));
    }

    #[test]
    fn format_bool_on_off() {
        assert_eq!(format_bool("autosave", true), "autosave");
        assert_eq!(format_bool("autosave", false), "noautosave");
    }

    #[test]
    fn sizes() {
        assert_eq!(parse_size("512"), Some(512));
        assert_eq!(parse_size("4k"), Some(4096));
        assert_eq!(parse_size("10M"), Some(10 * 1024 * 1024));
        assert_eq!(parse_size("lots"), None);
        assert_eq!(parse_size(""), None);
    }
}
