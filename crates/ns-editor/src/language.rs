//! Languages, extension lookup, and the compiled highlight rule tables.
//!
//! A [`Language`] is picked from the file extension (or set explicitly by
//! the user). Each language with highlighting maps to an ordered list of
//! [`Rule`]s: a [`Category`], a compiled regex, and the capture group that
//! is tagged. Rules run in list order and later rules paint over earlier
//! ones.
//!
//! The tables are static. [`LanguageRegistry::builtin`] compiles all of them
//! once at startup; a pattern that fails to compile is reported there as a
//! [`RegistryError`] instead of surfacing mid-edit.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use regex::Regex;
use tracing::debug;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Every language the editor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Text,
    Python,
    JavaScript,
    TypeScript,
    Html,
    Css,
    Json,
    C,
    Cpp,
    Rust,
    Markdown,
    Xml,
    Yaml,
    Sql,
}

const ALL_LANGUAGES: &[Language] = &[
    Language::Text,
    Language::Python,
    Language::JavaScript,
    Language::TypeScript,
    Language::Html,
    Language::Css,
    Language::Json,
    Language::C,
    Language::Cpp,
    Language::Rust,
    Language::Markdown,
    Language::Xml,
    Language::Yaml,
    Language::Sql,
];

/// Extension (lowercase, no dot) → language.
const EXTENSIONS: &[(&str, Language)] = &[
    ("py", Language::Python),
    ("pyw", Language::Python),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("html", Language::Html),
    ("htm", Language::Html),
    ("css", Language::Css),
    ("scss", Language::Css),
    ("json", Language::Json),
    ("c", Language::C),
    ("h", Language::C),
    ("cpp", Language::Cpp),
    ("hpp", Language::Cpp),
    ("cc", Language::Cpp),
    ("rs", Language::Rust),
    ("md", Language::Markdown),
    ("xml", Language::Xml),
    ("yml", Language::Yaml),
    ("yaml", Language::Yaml),
    ("sql", Language::Sql),
    ("txt", Language::Text),
];

impl Language {
    /// Lowercase identifier, as used in `set language=...`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Html => "html",
            Self::Css => "css",
            Self::Json => "json",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Rust => "rust",
            Self::Markdown => "markdown",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
            Self::Sql => "sql",
        }
    }

    /// Name shown in the status bar.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Json => "JSON",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Rust => "Rust",
            Self::Markdown => "Markdown",
            Self::Xml => "XML",
            Self::Yaml => "YAML",
            Self::Sql => "SQL",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        ALL_LANGUAGES
    }

    /// Parse a language name (case-insensitive). Accepts the display names
    /// and a few common abbreviations.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "js" => return Some(Self::JavaScript),
            "ts" => return Some(Self::TypeScript),
            "py" => return Some(Self::Python),
            "c++" => return Some(Self::Cpp),
            "plain" | "txt" => return Some(Self::Text),
            _ => {}
        }
        ALL_LANGUAGES.iter().copied().find(|l| l.name() == name)
    }

    /// Look up an extension (with or without the leading dot).
    /// Unknown extensions are plain text.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map_or(Self::Text, |&(_, lang)| lang)
    }

    /// Detect a language from a file path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Text, Self::from_extension)
    }

    /// The language whose rule table this one borrows.
    const fn rule_source(self) -> Self {
        match self {
            Self::TypeScript => Self::JavaScript,
            Self::Cpp => Self::C,
            other => other,
        }
    }

    /// Line comment style for comment toggling.
    #[must_use]
    pub const fn comment_style(self) -> CommentStyle {
        match self {
            Self::JavaScript | Self::TypeScript | Self::C | Self::Cpp | Self::Rust | Self::Json => {
                CommentStyle::line("//")
            }
            Self::Css => CommentStyle::block("/*", "*/"),
            Self::Html | Self::Xml | Self::Markdown => CommentStyle::block("<!--", "-->"),
            Self::Sql => CommentStyle::line("--"),
            Self::Text | Self::Python | Self::Yaml => CommentStyle::line("#"),
        }
    }

    /// Keywords offered by completion (and matched by the keyword rule).
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Python => PYTHON_KEYWORDS,
            Self::JavaScript | Self::TypeScript => JS_KEYWORDS,
            Self::C | Self::Cpp => C_KEYWORDS,
            Self::Rust => RUST_KEYWORDS,
            Self::Json => &["true", "false", "null"],
            Self::Html => HTML_TAGS,
            Self::Css => CSS_PROPERTIES,
            Self::Text | Self::Markdown | Self::Xml | Self::Yaml | Self::Sql => &[],
        }
    }

    /// Builtin names offered by completion (and matched by the builtin rule).
    #[must_use]
    pub const fn builtins(self) -> &'static [&'static str] {
        match self {
            Self::Python => PYTHON_BUILTINS,
            Self::JavaScript | Self::TypeScript => JS_BUILTINS,
            Self::C | Self::Cpp => C_BUILTINS,
            Self::Rust => RUST_BUILTINS,
            _ => &[],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How a language writes a single-line comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStyle {
    pub open: &'static str,
    /// Closing marker for block-only languages (CSS, HTML).
    pub close: Option<&'static str>,
}

impl CommentStyle {
    const fn line(open: &'static str) -> Self {
        Self { open, close: None }
    }

    const fn block(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close: Some(close),
        }
    }
}

// ---------------------------------------------------------------------------
// Word lists
// ---------------------------------------------------------------------------

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

const PYTHON_BUILTINS: &[&str] = &[
    "abs", "all", "any", "ascii", "bin", "bool", "bytearray", "bytes", "callable", "chr",
    "classmethod", "compile", "complex", "delattr", "dict", "dir", "divmod", "enumerate",
    "eval", "exec", "filter", "float", "format", "frozenset", "getattr", "globals", "hasattr",
    "hash", "help", "hex", "id", "input", "int", "isinstance", "issubclass", "iter", "len",
    "list", "locals", "map", "max", "memoryview", "min", "next", "object", "oct", "open", "ord",
    "pow", "print", "property", "range", "repr", "reversed", "round", "set", "setattr", "slice",
    "sorted", "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "zip",
    "__import__",
];

const JS_KEYWORDS: &[&str] = &[
    "abstract", "await", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "debugger", "default", "delete", "do", "double", "else", "enum", "export",
    "extends", "false", "final", "finally", "float", "for", "function", "goto", "if",
    "implements", "import", "in", "instanceof", "int", "interface", "let", "long", "native",
    "new", "null", "package", "private", "protected", "public", "return", "short", "static",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "true", "try",
    "typeof", "var", "void", "volatile", "while", "with", "yield",
];

const JS_BUILTINS: &[&str] = &[
    "Array", "Boolean", "Date", "Error", "Function", "JSON", "Math", "Number", "Object",
    "RegExp", "String", "console", "document", "window", "undefined", "NaN", "Infinity",
];

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while",
];

const C_BUILTINS: &[&str] = &[
    "printf", "scanf", "malloc", "free", "sizeof", "strlen", "strcpy", "strcmp", "strcat",
    "fopen", "fclose", "fread", "fwrite",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

const RUST_BUILTINS: &[&str] = &[
    "Option", "Some", "None", "Result", "Ok", "Err", "Vec", "String", "Box", "Rc", "Arc",
    "HashMap", "bool", "char", "str", "u8", "u16", "u32", "u64", "usize", "i8", "i16", "i32",
    "i64", "isize", "f32", "f64",
];

const HTML_TAGS: &[&str] = &[
    "html", "head", "body", "div", "span", "p", "a", "img", "ul", "ol", "li", "h1", "h2", "h3",
    "h4", "h5", "h6", "table", "tr", "td", "th", "form", "input", "button", "select", "option",
    "textarea", "script", "style", "link", "meta", "title",
];

const CSS_PROPERTIES: &[&str] = &[
    "color", "background", "font-size", "font-family", "margin", "padding", "border", "width",
    "height", "display", "position", "top", "right", "bottom", "left", "float", "clear",
    "text-align", "font-weight", "text-decoration", "line-height", "letter-spacing",
    "word-spacing", "vertical-align", "white-space", "list-style", "cursor", "overflow",
    "visibility", "z-index", "opacity", "transform", "transition", "animation", "box-shadow",
    "border-radius", "flex", "grid",
];

// ---------------------------------------------------------------------------
// Categories & rules
// ---------------------------------------------------------------------------

/// What a highlighted span is. One-to-one with the theme's syntax palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Keyword,
    Builtin,
    String,
    Comment,
    Number,
    Function,
    Class,
    Operator,
    Bracket,
    Tag,
    Attribute,
    CssProperty,
    CssValue,
}

impl Category {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Builtin => "builtin",
            Self::String => "string",
            Self::Comment => "comment",
            Self::Number => "number",
            Self::Function => "function",
            Self::Class => "class",
            Self::Operator => "operator",
            Self::Bracket => "bracket",
            Self::Tag => "tag",
            Self::Attribute => "attribute",
            Self::CssProperty => "css_property",
            Self::CssValue => "css_value",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rule before compilation.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub category: Category,
    pub pattern: &'static str,
    /// Capture group to tag; 0 is the whole match.
    pub group: usize,
}

const fn rule(category: Category, pattern: &'static str) -> RuleSpec {
    RuleSpec {
        category,
        pattern,
        group: 0,
    }
}

const fn rule_group(category: Category, pattern: &'static str, group: usize) -> RuleSpec {
    RuleSpec {
        category,
        pattern,
        group,
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub category: Category,
    pub regex: Regex,
    pub group: usize,
}

// Shared fragments. The keyword and builtin alternations are generated from
// the word lists above so completion and highlighting never disagree.
const QUOTED_STRING: &str = r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#;
const BLOCK_COMMENT: &str = r"(?s)/\*.*?\*/";
const LINE_COMMENT_SLASH: &str = r"//.*";
const OPERATORS: &str = r"[+\-*/%=<>!&|^~]";
const BRACKETS: &str = r"[(){}\[\]]";
const PUNCTUATION: &str = r"[,:;]";
const KEYWORDS: &str = "\u{0}keywords";
const BUILTINS: &str = "\u{0}builtins";

/// Rule tables in application order. `KEYWORDS` / `BUILTINS` are
/// placeholders expanded from the language's word lists.
const fn rule_specs(language: Language) -> &'static [RuleSpec] {
    match language.rule_source() {
        Language::Python => tables::PYTHON,
        Language::JavaScript => tables::JAVASCRIPT,
        Language::Html => tables::HTML,
        Language::Css => tables::CSS,
        Language::Json => tables::JSON,
        Language::C => tables::C_FAMILY,
        Language::Rust => tables::RUST,
        _ => &[],
    }
}

mod tables {
    use super::{
        BLOCK_COMMENT, BRACKETS, BUILTINS, Category as C, KEYWORDS, LINE_COMMENT_SLASH,
        OPERATORS, PUNCTUATION, QUOTED_STRING, RuleSpec, rule, rule_group,
    };

    // Python has no rule for the name after `def`: only the keyword is
    // tagged, the defined name stays plain.
    pub const PYTHON: &[RuleSpec] = &[
        rule(C::Keyword, KEYWORDS),
        rule(C::Builtin, BUILTINS),
        rule(C::String, QUOTED_STRING),
        rule(C::String, r#"(?s)""".*?"""|'''.*?'''"#),
        rule(C::Comment, r"#.*"),
        rule(C::Number, r"\b\d+\.?\d*\b"),
        rule_group(C::Class, r"\bclass\s+(\w+)", 1),
        rule(C::Operator, OPERATORS),
        rule(C::Bracket, BRACKETS),
    ];

    pub const JAVASCRIPT: &[RuleSpec] = &[
        rule(C::Keyword, KEYWORDS),
        rule(C::Builtin, BUILTINS),
        rule(C::String, QUOTED_STRING),
        rule(C::String, r"`[^`]*`"),
        rule(C::Comment, LINE_COMMENT_SLASH),
        rule(C::Comment, BLOCK_COMMENT),
        rule(C::Number, r"\b\d+\.?\d*\b"),
        rule_group(C::Function, r"\bfunction\s+(\w+)", 1),
        rule_group(C::Class, r"\bclass\s+(\w+)", 1),
        rule(C::Operator, OPERATORS),
        rule(C::Bracket, BRACKETS),
    ];

    pub const HTML: &[RuleSpec] = &[
        rule(C::Tag, r"</?[a-zA-Z][^>]*>"),
        rule_group(C::Attribute, r"\b([a-zA-Z-]+)=", 1),
        rule(C::String, QUOTED_STRING),
        rule(C::Comment, r"(?s)<!--.*?-->"),
        rule(C::Bracket, r"[<>]"),
    ];

    pub const CSS: &[RuleSpec] = &[
        rule_group(C::CssProperty, r"\b([a-zA-Z-]+)\s*:", 1),
        rule(C::CssValue, r":\s*[^;}\n]+"),
        rule(C::String, QUOTED_STRING),
        rule(C::Comment, BLOCK_COMMENT),
        rule(
            C::Number,
            r"\b\d+(?:px|em|rem|%|vh|vw|pt|pc|in|cm|mm|ex|ch|vmin|vmax)?\b",
        ),
        rule(C::Bracket, BRACKETS),
        rule(C::Operator, PUNCTUATION),
    ];

    pub const JSON: &[RuleSpec] = &[
        rule(C::String, QUOTED_STRING),
        rule(C::Number, r"\b\d+\.?\d*\b"),
        rule(C::Keyword, KEYWORDS),
        rule(C::Bracket, BRACKETS),
        rule(C::Operator, PUNCTUATION),
    ];

    pub const C_FAMILY: &[RuleSpec] = &[
        rule(C::Keyword, KEYWORDS),
        rule(C::Builtin, BUILTINS),
        rule(C::String, QUOTED_STRING),
        rule(C::Comment, LINE_COMMENT_SLASH),
        rule(C::Comment, BLOCK_COMMENT),
        rule(C::Number, r"\b\d+\.?\d*[fFlLuU]?\b"),
        rule(C::Operator, OPERATORS),
        rule(C::Bracket, BRACKETS),
    ];

    pub const RUST: &[RuleSpec] = &[
        rule(C::Keyword, KEYWORDS),
        rule(C::Builtin, BUILTINS),
        rule_group(C::Builtin, r"\b(\w+)!\s*[(\[{]", 1),
        rule_group(C::Function, r"\bfn\s+(\w+)", 1),
        rule_group(C::Class, r"\b(?:struct|enum|trait|type|union)\s+(\w+)", 1),
        rule(C::String, r#""(?:[^"\\]|\\.)*""#),
        rule(C::Comment, LINE_COMMENT_SLASH),
        rule(C::Comment, BLOCK_COMMENT),
        rule(
            C::Number,
            r"\b\d[\d_]*(?:\.\d+)?(?:[iu](?:8|16|32|64|128|size)|f32|f64)?\b",
        ),
        rule(C::Operator, OPERATORS),
        rule(C::Bracket, BRACKETS),
    ];
}

/// `\b(?:w1|w2|...)\b` over escaped words.
fn word_alternation(words: &[&str]) -> String {
    let alts: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    format!(r"\b(?:{})\b", alts.join("|"))
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A rule table entry that failed to compile.
#[derive(Debug)]
pub struct RegistryError {
    pub language: Language,
    pub pattern: String,
    pub source: regex::Error,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} highlight pattern {:?}: {}",
            self.language.name(),
            self.pattern,
            self.source
        )
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Compiled rule tables for every language. Immutable once built.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    tables: HashMap<Language, Vec<Rule>>,
}

impl LanguageRegistry {
    /// Compile the builtin rule tables.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for &language in ALL_LANGUAGES {
            if language.rule_source() != language {
                continue;
            }
            let specs = rule_specs(language);
            if specs.is_empty() {
                continue;
            }
            registry.insert(language, specs)?;
        }
        debug!(languages = registry.tables.len(), "compiled highlight rules");
        Ok(registry)
    }

    /// Compile `specs` as the rule table for `language`, replacing any
    /// previous table.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile; the registry is
    /// unchanged in that case.
    pub fn insert(&mut self, language: Language, specs: &[RuleSpec]) -> Result<(), RegistryError> {
        let rules = specs
            .iter()
            .map(|spec| compile(language, spec))
            .collect::<Result<Vec<_>, _>>()?;
        self.tables.insert(language, rules);
        Ok(())
    }

    /// Rules for a language, in application order. Empty for languages
    /// without highlighting.
    #[must_use]
    pub fn rules(&self, language: Language) -> &[Rule] {
        self.tables
            .get(&language.rule_source())
            .map_or(&[], Vec::as_slice)
    }
}

fn compile(language: Language, spec: &RuleSpec) -> Result<Rule, RegistryError> {
    let pattern = match spec.pattern {
        KEYWORDS => word_alternation(language.keywords()),
        BUILTINS => word_alternation(language.builtins()),
        p => p.to_string(),
    };
    let regex = Regex::new(&pattern).map_err(|source| RegistryError {
        language,
        pattern: pattern.clone(),
        source,
    })?;
    Ok(Rule {
        category: spec.category,
        regex,
        group: spec.group,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
