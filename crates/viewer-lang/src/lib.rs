#![warn(missing_docs)]
//! `viewer-lang` - data-driven language configuration for the code viewer engine.
//!
//! This crate stays dependency-free. It names the supported source languages, the lexical
//! categories used for coloring, and the per-language tokens the fold detector needs
//! (comment markers and block delimiters). Pattern tables live in `viewer-highlight`.

use std::fmt;

/// A supported source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    /// Java.
    Java,
    /// Kotlin.
    Kotlin,
    /// Python.
    Python,
    /// JavaScript (`js`).
    JavaScript,
    /// TypeScript (`ts`).
    TypeScript,
    /// C# (`cs`).
    CSharp,
}

impl LanguageId {
    /// Every built-in language, in registry order.
    pub const ALL: [LanguageId; 6] = [
        LanguageId::Java,
        LanguageId::Kotlin,
        LanguageId::Python,
        LanguageId::JavaScript,
        LanguageId::TypeScript,
        LanguageId::CSharp,
    ];

    /// Resolve a language identifier or alias (ASCII case-insensitive).
    ///
    /// Returns `None` for unknown identifiers; callers fall back to an empty profile.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|lang| {
            lang.name().eq_ignore_ascii_case(name)
                || lang
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name))
        })
    }

    /// Canonical identifier (`"java"`, `"python"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            LanguageId::Java => "java",
            LanguageId::Kotlin => "kotlin",
            LanguageId::Python => "python",
            LanguageId::JavaScript => "javascript",
            LanguageId::TypeScript => "typescript",
            LanguageId::CSharp => "csharp",
        }
    }

    /// Short aliases accepted by [`LanguageId::from_name`].
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            LanguageId::Java => &[],
            LanguageId::Kotlin => &["kt"],
            LanguageId::Python => &["py"],
            LanguageId::JavaScript => &["js"],
            LanguageId::TypeScript => &["ts"],
            LanguageId::CSharp => &["cs"],
        }
    }

    /// Guess a language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "java" => Some(LanguageId::Java),
            "kt" | "kts" => Some(LanguageId::Kotlin),
            "py" | "pyi" => Some(LanguageId::Python),
            "js" | "mjs" | "cjs" | "jsx" => Some(LanguageId::JavaScript),
            "ts" | "tsx" | "mts" => Some(LanguageId::TypeScript),
            "cs" => Some(LanguageId::CSharp),
            _ => None,
        }
    }

    /// Language configuration (comments + fold delimiters).
    pub fn config(self) -> LanguageConfig {
        let comments = match self {
            LanguageId::Python => CommentConfig::line("#"),
            _ => CommentConfig::line_and_block("//", "/*", "*/"),
        };
        LanguageConfig {
            comments,
            fold: FoldDelimiters::BRACES,
        }
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lexical category of a highlighted span.
///
/// The set is closed: every span the engine emits carries one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Reserved words.
    Keyword,
    /// String and character literals.
    String,
    /// Line and block comments.
    Comment,
    /// Numeric literals.
    Number,
    /// Annotations, decorators and attributes.
    Annotation,
    /// Class / type names.
    Class,
    /// Method / function names.
    Method,
    /// Operator runs.
    Operator,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 8] = [
        Category::Keyword,
        Category::String,
        Category::Comment,
        Category::Number,
        Category::Annotation,
        Category::Class,
        Category::Method,
        Category::Operator,
    ];

    /// Lower-case name (`"keyword"`, `"string"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Category::Keyword => "keyword",
            Category::String => "string",
            Category::Comment => "comment",
            Category::Number => "number",
            Category::Annotation => "annotation",
            Category::Class => "class",
            Category::Method => "method",
            Category::Operator => "operator",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comment tokens/config for a given language.
///
/// The fold detector uses these as "inside a comment" markers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Tokens whose presence on a line marks it as "inside a comment" for fold detection:
    /// the line token and the block start token.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        [self.line.as_deref(), self.block_start.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
    }
}

/// Opening/closing delimiters that bound a foldable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldDelimiters {
    /// Opening delimiter.
    pub open: char,
    /// Closing delimiter.
    pub close: char,
}

impl FoldDelimiters {
    /// `{` / `}`.
    pub const BRACES: Self = Self {
        open: '{',
        close: '}',
    };
}

/// Per-language settings used by the engine outside of highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Comment tokens.
    pub comments: CommentConfig,
    /// Fold delimiters.
    pub fold: FoldDelimiters,
}

impl LanguageConfig {
    /// Settings used when no language is active: C-style comment markers and braces.
    pub fn fallback() -> Self {
        Self {
            comments: CommentConfig::line_and_block("//", "/*", "*/"),
            fold: FoldDelimiters::BRACES,
        }
    }

    /// Settings for an optional language, using [`LanguageConfig::fallback`] for `None`.
    pub fn for_language(language: Option<LanguageId>) -> Self {
        language.map_or_else(Self::fallback, LanguageId::config)
    }
}
