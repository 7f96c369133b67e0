//! Language profiles: ordered `category -> matcher` tables.

use crate::error::RegistryError;
use crate::span::{CharIndex, Span};
use regex::Regex;
use std::ops::Range;
use viewer_lang::{Category, LanguageId};

/// A single regex matcher bound to a category.
///
/// Matchers hold no scan state, so the same rule can run any number of times over any text.
#[derive(Debug, Clone)]
pub struct PatternRule {
    category: Category,
    regex: Regex,
    capture_group: Option<usize>,
}

impl PatternRule {
    /// Compile `pattern` for `category`.
    pub fn new(category: Category, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            category,
            regex: Regex::new(pattern)?,
            capture_group: None,
        })
    }

    /// Color only a capture group of each match.
    ///
    /// Example (Python class name):
    /// - pattern: `\bclass\s+([A-Za-z_]\w*)`
    /// - capture_group: `1` (the name)
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    /// The category this rule emits.
    pub fn category(&self) -> Category {
        self.category
    }

    /// The pattern source.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Capture group colored by this rule, if any.
    pub fn capture_group(&self) -> Option<usize> {
        self.capture_group
    }

    /// Find the next match starting at or after byte position `pos`.
    ///
    /// Returns the colored byte range (the capture group when one is configured). Matches whose
    /// group did not participate are skipped, so `None` always means no further match.
    pub fn find_at(&self, text: &str, pos: usize) -> Option<Range<usize>> {
        if pos > text.len() {
            return None;
        }
        let Some(group) = self.capture_group else {
            return self.regex.find_at(text, pos).map(|m| m.range());
        };
        let mut at = pos;
        while at <= text.len() {
            let caps = self.regex.captures_at(text, at)?;
            if let Some(m) = caps.get(group) {
                return Some(m.range());
            }
            let whole = caps.get(0)?;
            at = if whole.end() > whole.start() {
                whole.end()
            } else {
                // empty match: step one char forward
                whole.end() + text[whole.end()..].chars().next()?.len_utf8()
            };
        }
        None
    }

    /// Spans for every non-overlapping match over the whole `text`, in character offsets.
    pub fn spans(&self, text: &str) -> Vec<Span> {
        let mut out = Vec::new();
        self.collect_spans(text, &CharIndex::new(text), &mut out);
        out
    }

    /// Append one span per non-overlapping match over the whole `text`.
    pub fn collect_spans(&self, text: &str, index: &CharIndex, out: &mut Vec<Span>) {
        let mut push = |range: Range<usize>| {
            let start = index.byte_to_char(range.start);
            let end = index.byte_to_char(range.end);
            if start < end {
                out.push(Span::new(start, end, self.category));
            }
        };

        match self.capture_group {
            Some(group) => {
                for caps in self.regex.captures_iter(text) {
                    if let Some(m) = caps.get(group) {
                        push(m.range());
                    }
                }
            }
            None => {
                for m in self.regex.find_iter(text) {
                    push(m.range());
                }
            }
        }
    }
}

/// An immutable, ordered set of pattern rules for one language.
///
/// Rule order is significant: spans are emitted rule by rule, and renderers let later spans win
/// where they overlap.
#[derive(Debug, Clone, Default)]
pub struct LanguageProfile {
    language: Option<LanguageId>,
    rules: Vec<PatternRule>,
}

impl LanguageProfile {
    /// A profile with no rules. Classifying with it yields no spans.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a profile. `language` is `None` for custom, unregistered profiles.
    pub fn builder(language: Option<LanguageId>) -> ProfileBuilder {
        ProfileBuilder {
            language,
            rules: Vec::new(),
        }
    }

    /// The language this profile highlights, if any.
    pub fn language(&self) -> Option<LanguageId> {
        self.language
    }

    /// Returns `true` if the profile has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Categories in application order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.rules.iter().map(PatternRule::category)
    }

    /// Classify the whole `text`.
    ///
    /// Spans are grouped by rule in application order, and by position within a rule.
    pub fn classify(&self, text: &str) -> Vec<Span> {
        if self.rules.is_empty() || text.is_empty() {
            return Vec::new();
        }
        let index = CharIndex::new(text);
        let mut spans = Vec::new();
        for rule in &self.rules {
            rule.collect_spans(text, &index, &mut spans);
        }
        spans
    }
}

/// Builder for [`LanguageProfile`]; compiles and validates every rule in [`ProfileBuilder::build`].
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    language: Option<LanguageId>,
    rules: Vec<(Category, String, Option<usize>)>,
}

impl ProfileBuilder {
    /// Add a rule that colors whole matches.
    pub fn rule(mut self, category: Category, pattern: impl Into<String>) -> Self {
        self.rules.push((category, pattern.into(), None));
        self
    }

    /// Add a rule that colors capture group `group` of each match.
    pub fn rule_group(
        mut self,
        category: Category,
        pattern: impl Into<String>,
        group: usize,
    ) -> Self {
        self.rules.push((category, pattern.into(), Some(group)));
        self
    }

    /// Compile all rules, failing on the first malformed one.
    pub fn build(self) -> Result<LanguageProfile, RegistryError> {
        let profile_name = self.language.map_or("custom", LanguageId::name);
        let mut rules = Vec::with_capacity(self.rules.len());

        for (category, pattern, group) in self.rules {
            let rule = PatternRule::new(category, &pattern).map_err(|source| {
                RegistryError::InvalidPattern {
                    language: profile_name.to_string(),
                    category,
                    source,
                }
            })?;
            let rule = match group {
                Some(group) if group >= rule.regex.captures_len() => {
                    return Err(RegistryError::MissingCaptureGroup {
                        language: profile_name.to_string(),
                        category,
                        group,
                    });
                }
                Some(group) => rule.with_capture_group(group),
                None => rule,
            };
            rules.push(rule);
        }

        Ok(LanguageProfile {
            language: self.language,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_at_resumes_from_position() {
        let rule = PatternRule::new(Category::Number, r"\d+").unwrap();
        let text = "a 12 b 345";
        assert_eq!(rule.find_at(text, 0), Some(2..4));
        assert_eq!(rule.find_at(text, 4), Some(7..10));
        assert_eq!(rule.find_at(text, 10), None);
        assert_eq!(rule.find_at(text, 99), None);
    }

    #[test]
    fn test_find_at_skips_matches_without_the_group() {
        let rule = PatternRule::new(Category::Class, r"(A)|b")
            .unwrap()
            .with_capture_group(1);
        let text = "b A b";
        assert_eq!(rule.find_at(text, 0), Some(2..3));
        assert_eq!(rule.find_at(text, 3), None);
        assert_eq!(rule.spans(text), vec![Span::new(2, 3, Category::Class)]);

        // Empty whole matches must not stall the scan.
        let empty = PatternRule::new(Category::Class, r"(x)?")
            .unwrap()
            .with_capture_group(1);
        assert_eq!(empty.find_at("ab\u{e9}x", 0), Some(4..5));
    }

    #[test]
    fn test_capture_group_spans() {
        let profile = LanguageProfile::builder(None)
            .rule_group(Category::Method, r"\bdef\s+([A-Za-z_]\w*)", 1)
            .build()
            .unwrap();
        let spans = profile.classify("def run(): pass\ndef stop(): pass");
        assert_eq!(
            spans,
            vec![
                Span::new(4, 7, Category::Method),
                Span::new(20, 24, Category::Method),
            ]
        );
    }

    #[test]
    fn test_spans_use_char_offsets() {
        let profile = LanguageProfile::builder(None)
            .rule(Category::String, r#""[^"]*""#)
            .build()
            .unwrap();
        let spans = profile.classify("x = \"你好\"");
        assert_eq!(spans, vec![Span::new(4, 8, Category::String)]);
    }

    #[test]
    fn test_builder_rejects_bad_pattern() {
        let err = LanguageProfile::builder(Some(LanguageId::Java))
            .rule(Category::Keyword, "(unclosed")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidPattern {
                category: Category::Keyword,
                ..
            }
        ));
        assert!(err.to_string().contains("java"));
    }

    #[test]
    fn test_builder_rejects_missing_group() {
        let err = LanguageProfile::builder(None)
            .rule_group(Category::Class, r"class \w+", 1)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingCaptureGroup { group: 1, .. }
        ));
    }

    #[test]
    fn test_empty_profile_classifies_nothing() {
        let profile = LanguageProfile::empty();
        assert!(profile.is_empty());
        assert!(profile.classify("class Foo {}").is_empty());
    }
}
