//! The built-in pattern tables and the registry that serves them.

use crate::error::RegistryError;
use crate::profile::{LanguageProfile, ProfileBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use viewer_lang::{Category, LanguageId};

/// Per-language profiles, built once and looked up by identifier.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    profiles: HashMap<LanguageId, Arc<LanguageProfile>>,
    empty: Arc<LanguageProfile>,
}

impl PatternRegistry {
    /// A registry with no profiles; every lookup returns the empty profile.
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            empty: Arc::new(LanguageProfile::empty()),
        }
    }

    /// Compile the profiles for every built-in language.
    ///
    /// Fails on the first malformed pattern, so a broken table never reaches a viewer.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for language in LanguageId::ALL {
            registry.register(builtin_profile(language)?);
        }
        Ok(registry)
    }

    /// Add or replace a profile. Profiles without a language are ignored.
    pub fn register(&mut self, profile: LanguageProfile) {
        if let Some(language) = profile.language() {
            self.profiles.insert(language, Arc::new(profile));
        }
    }

    /// Profile for a language identifier or alias. Unknown identifiers get the empty profile.
    pub fn profile_for(&self, name: &str) -> Arc<LanguageProfile> {
        match LanguageId::from_name(name) {
            Some(language) => self.profile(language),
            None => Arc::clone(&self.empty),
        }
    }

    /// Profile for a resolved language (empty if none is registered).
    pub fn profile(&self, language: LanguageId) -> Arc<LanguageProfile> {
        self.profiles
            .get(&language)
            .map_or_else(|| Arc::clone(&self.empty), Arc::clone)
    }

    /// Languages with a registered profile.
    pub fn languages(&self) -> impl Iterator<Item = LanguageId> + '_ {
        LanguageId::ALL
            .into_iter()
            .filter(|language| self.profiles.contains_key(language))
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const C_STYLE_COMMENT: &str = r"//.*|/\*[\s\S]*?\*/";
const C_STYLE_OPERATOR: &str = r"[+\-*/%&|^!~=<>?:]+";
const QUOTED_STRING: &str = r#""([^"\\]|\\.)*"|'([^'\\]|\\.)*'"#;
const DOTTED_ANNOTATION: &str = r"@[\w.]+";

/// Build the profile for one built-in language.
///
/// Rules run in this order: operator, number, class, method, keyword, annotation, string,
/// comment. Later rules win on overlap, so strings and comments repaint anything matched
/// inside them, and keywords repaint method-call lookalikes such as `if (`.
pub fn builtin_profile(language: LanguageId) -> Result<LanguageProfile, RegistryError> {
    let builder = LanguageProfile::builder(Some(language));
    let builder = match language {
        LanguageId::Java => java(builder),
        LanguageId::Kotlin => kotlin(builder),
        LanguageId::Python => python(builder),
        LanguageId::JavaScript => javascript(builder),
        LanguageId::TypeScript => typescript(builder),
        LanguageId::CSharp => csharp(builder),
    };
    builder.build()
}

fn keywords(words: &str) -> String {
    format!(r"\b({words})\b")
}

fn java(builder: ProfileBuilder) -> ProfileBuilder {
    builder
        .rule(Category::Operator, C_STYLE_OPERATOR)
        .rule(Category::Number, r"\b\d+(\.\d+)?([eE][+-]?\d+)?[fFdD]?\b")
        .rule_group(Category::Class, r"\b([A-Z]\w*)\b", 1)
        .rule_group(Category::Method, r"\b([a-z]\w*)\s*\(", 1)
        .rule(
            Category::Keyword,
            keywords(
                "abstract|assert|boolean|break|byte|case|catch|char|class|const|continue|default|\
                 do|double|else|enum|extends|final|finally|float|for|goto|if|implements|import|\
                 instanceof|int|interface|long|native|new|package|private|protected|public|return|\
                 short|static|strictfp|super|switch|synchronized|this|throw|throws|transient|try|\
                 void|volatile|while|true|false|null",
            ),
        )
        .rule(Category::Annotation, DOTTED_ANNOTATION)
        .rule(Category::String, QUOTED_STRING)
        .rule(Category::Comment, C_STYLE_COMMENT)
}

fn kotlin(builder: ProfileBuilder) -> ProfileBuilder {
    builder
        .rule(Category::Operator, C_STYLE_OPERATOR)
        .rule(Category::Number, r"\b\d+(\.\d+)?([eE][+-]?\d+)?[fFdDL]?\b")
        .rule_group(Category::Class, r"\b([A-Z]\w*)\b", 1)
        .rule_group(Category::Method, r"\b([a-z]\w*)\s*\(", 1)
        .rule(
            Category::Keyword,
            keywords(
                "abstract|actual|annotation|as|break|by|catch|class|companion|const|constructor|\
                 continue|crossinline|data|do|dynamic|else|enum|expect|external|false|final|\
                 finally|for|fun|get|if|import|in|infix|init|inline|inner|interface|internal|is|\
                 lateinit|noinline|null|object|open|operator|out|override|package|private|\
                 protected|public|reified|return|sealed|set|super|suspend|tailrec|this|throw|true|\
                 try|typealias|val|var|vararg|when|where|while",
            ),
        )
        .rule(Category::Annotation, DOTTED_ANNOTATION)
        .rule(
            Category::String,
            r#""""[\s\S]*?"""|"([^"\\]|\\.)*"|'([^'\\]|\\.)*'"#,
        )
        .rule(Category::Comment, C_STYLE_COMMENT)
}

fn python(builder: ProfileBuilder) -> ProfileBuilder {
    builder
        .rule(Category::Operator, r"[+\-*/%&|^!~=<>@]+")
        .rule(Category::Number, r"\b\d+(\.\d+)?([eE][+-]?\d+)?j?\b")
        .rule_group(Category::Class, r"\bclass\s+([A-Za-z_]\w*)", 1)
        .rule_group(Category::Method, r"\bdef\s+([A-Za-z_]\w*)", 1)
        .rule(
            Category::Keyword,
            keywords(
                "and|as|assert|async|await|break|class|continue|def|del|elif|else|except|False|\
                 finally|for|from|global|if|import|in|is|lambda|None|nonlocal|not|or|pass|raise|\
                 return|True|try|while|with|yield",
            ),
        )
        .rule(Category::Annotation, DOTTED_ANNOTATION)
        .rule(
            Category::String,
            r#""""[\s\S]*?"""|'''[\s\S]*?'''|"([^"\\]|\\.)*"|'([^'\\]|\\.)*'"#,
        )
        .rule(Category::Comment, r"#.*")
}

fn javascript(builder: ProfileBuilder) -> ProfileBuilder {
    builder
        .rule(Category::Operator, C_STYLE_OPERATOR)
        .rule(Category::Number, r"\b\d+(\.\d+)?([eE][+-]?\d+)?\b")
        .rule_group(Category::Class, r"\bclass\s+([A-Za-z_$][\w$]*)", 1)
        .rule_group(Category::Method, r"\b([A-Za-z_$][\w$]*)\s*\(", 1)
        .rule(
            Category::Keyword,
            keywords(
                "async|await|break|case|catch|class|const|continue|debugger|default|delete|do|\
                 else|export|extends|finally|for|function|if|import|in|instanceof|let|new|of|\
                 return|super|switch|this|throw|try|typeof|var|void|while|with|yield",
            ),
        )
        .rule(
            Category::String,
            r#"`[\s\S]*?`|"([^"\\]|\\.)*"|'([^'\\]|\\.)*'"#,
        )
        .rule(Category::Comment, C_STYLE_COMMENT)
}

fn typescript(builder: ProfileBuilder) -> ProfileBuilder {
    builder
        .rule(Category::Operator, C_STYLE_OPERATOR)
        .rule(Category::Number, r"\b\d+(\.\d+)?([eE][+-]?\d+)?\b")
        .rule_group(Category::Class, r"\bclass\s+([A-Za-z_$][\w$]*)", 1)
        .rule_group(Category::Method, r"\b([A-Za-z_$][\w$]*)\s*\(", 1)
        .rule(
            Category::Keyword,
            keywords(
                "abstract|any|as|async|await|boolean|break|case|catch|class|const|constructor|\
                 continue|debugger|declare|default|delete|do|else|enum|export|extends|finally|for|\
                 from|function|get|if|implements|import|in|infer|instanceof|interface|is|keyof|\
                 let|module|namespace|never|new|null|number|object|of|package|private|protected|\
                 public|readonly|require|return|set|static|string|super|switch|symbol|this|throw|\
                 try|type|typeof|undefined|unique|unknown|var|void|while|with|yield",
            ),
        )
        .rule(Category::Annotation, DOTTED_ANNOTATION)
        .rule(
            Category::String,
            r#"`[\s\S]*?`|"([^"\\]|\\.)*"|'([^'\\]|\\.)*'"#,
        )
        .rule(Category::Comment, C_STYLE_COMMENT)
}

fn csharp(builder: ProfileBuilder) -> ProfileBuilder {
    builder
        .rule(Category::Operator, C_STYLE_OPERATOR)
        .rule(Category::Number, r"\b\d+(\.\d+)?([eE][+-]?\d+)?[fFdDmM]?\b")
        .rule_group(Category::Class, r"\bclass\s+([A-Za-z_]\w*)", 1)
        .rule_group(Category::Method, r"\b([A-Za-z_]\w*)\s*\(", 1)
        .rule(
            Category::Keyword,
            keywords(
                "abstract|as|base|bool|break|byte|case|catch|char|checked|class|const|continue|\
                 decimal|default|delegate|do|double|else|enum|event|explicit|extern|false|finally|\
                 fixed|float|for|foreach|goto|if|implicit|in|int|interface|internal|is|lock|long|\
                 namespace|new|null|object|operator|out|override|params|private|protected|public|\
                 readonly|ref|return|sbyte|sealed|short|sizeof|stackalloc|static|string|struct|\
                 switch|this|throw|true|try|typeof|uint|ulong|unchecked|unsafe|ushort|using|\
                 virtual|void|volatile|while",
            ),
        )
        .rule(Category::Annotation, r"\[\s*([A-Za-z_][\w.]*)\s*\]")
        .rule(
            Category::String,
            r#"@"[^"]*(?:""[^"]*)*"|"([^"\\]|\\.)*""#,
        )
        .rule(Category::Comment, C_STYLE_COMMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Span, flatten_spans};

    #[test]
    fn test_builtin_registry_compiles() {
        let registry = PatternRegistry::builtin().unwrap();
        assert_eq!(registry.languages().count(), LanguageId::ALL.len());
        for language in LanguageId::ALL {
            assert!(!registry.profile(language).is_empty(), "{language}");
        }
    }

    #[test]
    fn test_unknown_language_is_empty_profile() {
        let registry = PatternRegistry::builtin().unwrap();
        let profile = registry.profile_for("brainfuck");
        assert!(profile.is_empty());
        assert!(profile.language().is_none());
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = PatternRegistry::builtin().unwrap();
        assert_eq!(
            registry.profile_for("js").language(),
            Some(LanguageId::JavaScript)
        );
        assert_eq!(
            registry.profile_for("CS").language(),
            Some(LanguageId::CSharp)
        );
    }

    #[test]
    fn test_java_categories_resolve_with_last_write_wins() {
        let registry = PatternRegistry::builtin().unwrap();
        let profile = registry.profile(LanguageId::Java);
        let text = "if (x) { return \"if\"; } // done";
        let runs = flatten_spans(&profile.classify(text), text.chars().count());
        let category_at = |pos: usize| {
            runs.iter()
                .find(|run| run.start <= pos && pos < run.end)
                .map(|run| run.category)
        };

        // `if (` also matches the method rule; the keyword rule runs later.
        assert_eq!(category_at(0), Some(Category::Keyword));
        assert_eq!(category_at(9), Some(Category::Keyword));
        // "if" inside the string literal is painted as string.
        assert_eq!(category_at(17), Some(Category::String));
        assert_eq!(category_at(text.len() - 1), Some(Category::Comment));
    }

    #[test]
    fn test_python_class_name_uses_capture_group() {
        let registry = PatternRegistry::builtin().unwrap();
        let spans = registry
            .profile(LanguageId::Python)
            .classify("class Foo:\n    pass");
        assert!(spans.contains(&Span::new(6, 9, Category::Class)));
        assert!(spans.contains(&Span::new(0, 5, Category::Keyword)));
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let registry = PatternRegistry::builtin().unwrap();
        let spans = registry
            .profile(LanguageId::Java)
            .classify("/* a\nb */ int x;");
        assert!(spans.contains(&Span::new(0, 9, Category::Comment)));
    }
}
