//! Code-likeness scoring for candidate spans

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Minimum share of indented lines for structural qualification
pub const MIN_INDENT_DENSITY: f64 = 0.2;
/// Minimum code-line ratio for a bare (undelimited) document
pub const MIN_BARE_CODE_RATIO: f64 = 0.5;
const DENSE_TERMINATORS: f64 = 0.3;
const MOSTLY_CODE_LINES: f64 = 0.3;

/// Markup, declaration and import-style tokens, matched case-insensitively
const DECLARATION_TOKENS: &[&str] = &[
    "<!doctype",
    "<html",
    "<head",
    "<body",
    "<div",
    "<script",
    "<style",
    "<?php",
    "#!/",
    "def ",
    "class ",
    "import ",
    "function ",
    "function(",
    "const ",
    "let ",
    "var ",
    "=>",
    "#include",
    "package ",
    "func ",
    "fn ",
    "require(",
    "module.exports",
    "export ",
    "create table",
    "insert into",
];

/// Tokens only meaningful in their conventional upper case
const UPPERCASE_TOKENS: &[&str] = &["SELECT ", "UPDATE ", "DELETE FROM", "FROM ", "RUN ", "EXPOSE "];

/// Fence languages that mark a block as code on their own
const CODE_LANGUAGES: &[&str] = &[
    "html", "htm", "css", "scss", "js", "javascript", "jsx", "ts", "typescript", "tsx", "python",
    "py", "sql", "dockerfile", "docker", "yaml", "yml", "bash", "sh", "shell", "json", "go",
    "rust", "rs", "java", "ruby", "rb", "php", "c", "cpp", "csharp", "cs", "kotlin", "swift",
];

/// A single reason a span looked like code
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Signal {
    Keyword(&'static str),
    LanguageTag(String),
    BalancedBrackets,
    Terminators,
    Indentation,
    CodeLines,
    Vocabulary(&'static str),
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Keyword(token) => write!(f, "keyword:{}", token.trim()),
            Signal::LanguageTag(lang) => write!(f, "lang:{}", lang),
            Signal::BalancedBrackets => f.write_str("balanced"),
            Signal::Terminators => f.write_str("terminators"),
            Signal::Indentation => f.write_str("indentation"),
            Signal::CodeLines => f.write_str("code-lines"),
            Signal::Vocabulary(term) => write!(f, "vocab:{}", term.trim()),
        }
    }
}

/// Composite code-likeness measurements for one span
#[derive(Debug, Clone, PartialEq)]
pub struct CodeSignals {
    pub keyword_hits: Vec<&'static str>,
    pub language_tag: bool,
    pub balanced: bool,
    pub terminator_density: f64,
    pub indentation_density: f64,
    pub code_line_ratio: f64,
}

impl CodeSignals {
    pub fn analyze(text: &str, language: Option<&str>) -> Self {
        let lower = text.to_lowercase();
        let mut keyword_hits: Vec<&'static str> = DECLARATION_TOKENS
            .iter()
            .copied()
            .filter(|token| contains_term(&lower, token))
            .collect();
        keyword_hits.extend(
            UPPERCASE_TOKENS
                .iter()
                .copied()
                .filter(|token| contains_term(text, token)),
        );

        let language_tag = language
            .map(|lang| CODE_LANGUAGES.contains(&lang))
            .unwrap_or(false);

        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let total = lines.len().max(1) as f64;

        let terminated = lines
            .iter()
            .filter(|l| {
                let t = l.trim_end();
                t.ends_with(';') || t.ends_with('{') || t.ends_with('}')
            })
            .count();
        let indented = lines
            .iter()
            .filter(|l| l.starts_with("  ") || l.starts_with('\t'))
            .count();
        let code_lines = lines.iter().filter(|l| looks_like_code_line(l)).count();

        Self {
            keyword_hits,
            language_tag,
            balanced: has_balanced_structure(text),
            terminator_density: terminated as f64 / total,
            indentation_density: indented as f64 / total,
            code_line_ratio: code_lines as f64 / total,
        }
    }

    /// Strong hit, or balanced structure with enough indentation
    pub fn qualifies(&self) -> bool {
        self.has_strong_hit() || (self.balanced && self.indentation_density >= MIN_INDENT_DENSITY)
    }

    /// Stricter test for a span that had no delimiters around it
    pub fn qualifies_bare(&self) -> bool {
        !self.keyword_hits.is_empty() && self.code_line_ratio >= MIN_BARE_CODE_RATIO
    }

    pub fn has_strong_hit(&self) -> bool {
        !self.keyword_hits.is_empty() || self.language_tag
    }

    pub fn to_signal_set(&self, language: Option<&str>) -> BTreeSet<Signal> {
        let mut set: BTreeSet<Signal> = self.keyword_hits.iter().copied().map(Signal::Keyword).collect();
        if self.language_tag {
            if let Some(lang) = language {
                set.insert(Signal::LanguageTag(lang.to_string()));
            }
        }
        if self.balanced {
            set.insert(Signal::BalancedBrackets);
        }
        if self.terminator_density >= DENSE_TERMINATORS {
            set.insert(Signal::Terminators);
        }
        if self.indentation_density >= MIN_INDENT_DENSITY {
            set.insert(Signal::Indentation);
        }
        if self.code_line_ratio >= MOSTLY_CODE_LINES {
            set.insert(Signal::CodeLines);
        }
        set
    }
}

/// Substring search that refuses to match in the middle of a word.
///
/// `it(` must not hit `submit(`, `def ` must not hit `undef `.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let needs_boundary = term
        .chars()
        .next()
        .map(|c| c.is_alphanumeric() || c == '_')
        .unwrap_or(false);

    haystack.match_indices(term).any(|(idx, _)| {
        !needs_boundary
            || haystack[..idx]
                .chars()
                .next_back()
                .map(|c| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(true)
    })
}

fn has_balanced_structure(text: &str) -> bool {
    let mut braces = 0i64;
    let mut parens = 0i64;
    let mut saw_brace = false;
    let mut saw_paren = false;

    for c in text.chars() {
        match c {
            '{' => {
                braces += 1;
                saw_brace = true;
            }
            '}' => braces -= 1,
            '(' => {
                parens += 1;
                saw_paren = true;
            }
            ')' => parens -= 1,
            _ => {}
        }
        if braces < 0 || parens < 0 {
            return false;
        }
    }

    saw_brace && saw_paren && braces == 0 && parens == 0
}

fn looks_like_code_line(line: &str) -> bool {
    let t = line.trim();
    t.starts_with('#')
        || t.starts_with("//")
        || t.starts_with("/*")
        || t.starts_with('<')
        || t.contains('=')
        || t.ends_with(':')
        || t.ends_with(';')
        || t.ends_with('{')
        || t.ends_with('}')
        || ["def ", "class ", "import ", "from ", "return", "if ", "for ", "while "]
            .iter()
            .any(|kw| t.starts_with(kw))
}
