//! Literal search with cyclic result navigation.
//!
//! All public inputs/outputs are **character offsets**. The scan is sequential and each next scan
//! starts one character after the previous match start, so matches may overlap (`"aa"` in `"aaa"`
//! matches at 0 and 1).

use regex::{Regex, RegexBuilder};
use std::ops::Range;
use viewer_highlight::CharIndex;

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

/// A match, expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Returns the length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

fn compile_search_regex(query: &str, options: SearchOptions) -> Option<Regex> {
    // An escaped literal always compiles; only absurd size limits could fail here.
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(!options.case_sensitive)
        .build()
        .ok()
}

/// Find every occurrence of `query` in `text`, overlapping ones included.
///
/// Returns an empty list for an empty query.
pub fn find_all_overlapping(text: &str, query: &str, options: SearchOptions) -> Vec<SearchMatch> {
    if query.is_empty() || text.is_empty() {
        return Vec::new();
    }
    let Some(re) = compile_search_regex(query, options) else {
        return Vec::new();
    };
    let index = CharIndex::new(text);

    let mut matches = Vec::new();
    let mut from_char = 0usize;
    while from_char < index.char_count() {
        let Some(m) = re.find_at(text, index.char_to_byte(from_char)) else {
            break;
        };
        let start = index.byte_to_char(m.start());
        let end = index.byte_to_char(m.end());
        if start < end {
            matches.push(SearchMatch { start, end });
        }
        from_char = start + 1;
    }
    matches
}

/// The result of one search, plus the navigation cursor.
///
/// A state with no matches has no current result. Navigation wraps in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    query: String,
    options: SearchOptions,
    matches: Vec<SearchMatch>,
    current: Option<usize>,
}

impl SearchState {
    /// Run a search over `text`. The current result is the first match, if any.
    pub fn new(text: &str, query: &str, options: SearchOptions) -> Self {
        let matches = find_all_overlapping(text, query, options);
        let current = (!matches.is_empty()).then_some(0);
        Self {
            query: query.to_string(),
            options,
            matches,
            current,
        }
    }

    /// The query this state was built from.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The options this state was built with.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// All matches in ascending start order.
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Index of the current result.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The current result.
    pub fn current_match(&self) -> Option<SearchMatch> {
        self.matches.get(self.current?).copied()
    }

    /// Move to the next result, wrapping after the last. Returns `false` if there are no matches.
    pub fn next_match(&mut self) -> bool {
        let count = self.matches.len();
        if count == 0 {
            return false;
        }
        self.current = Some(self.current.map_or(0, |idx| (idx + 1) % count));
        true
    }

    /// Move to the previous result, wrapping before the first. Returns `false` if there are no
    /// matches.
    pub fn previous_match(&mut self) -> bool {
        let count = self.matches.len();
        if count == 0 {
            return false;
        }
        self.current = Some(self.current.map_or(count - 1, |idx| (idx + count - 1) % count));
        true
    }

    /// Range to highlight for the current result, clamped to a buffer of `text_len` characters.
    ///
    /// Results are not recomputed when the buffer changes, so the stored range may be stale.
    pub fn current_highlight(&self, text_len: usize) -> Option<Range<usize>> {
        let m = self.current_match()?;
        let start = m.start.min(text_len);
        let end = m.end.min(text_len);
        (start < end).then_some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(matches: &[SearchMatch]) -> Vec<usize> {
        matches.iter().map(|m| m.start).collect()
    }

    #[test]
    fn test_overlapping_matches() {
        let matches = find_all_overlapping("aaa", "aa", SearchOptions::default());
        assert_eq!(starts(&matches), vec![0, 1]);
        assert!(matches.iter().all(|m| m.len() == 2));
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(find_all_overlapping("abc", "", SearchOptions::default()).is_empty());
        let state = SearchState::new("abc", "", SearchOptions::default());
        assert_eq!(state.current_index(), None);
    }

    #[test]
    fn test_case_insensitive() {
        let options = SearchOptions {
            case_sensitive: false,
        };
        let matches = find_all_overlapping("Foo foo FOO", "foo", options);
        assert_eq!(starts(&matches), vec![0, 4, 8]);
        let matches = find_all_overlapping("Foo foo FOO", "foo", SearchOptions::default());
        assert_eq!(starts(&matches), vec![4]);
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let matches = find_all_overlapping("你好你好", "你", SearchOptions::default());
        assert_eq!(starts(&matches), vec![0, 2]);
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let mut state = SearchState::new("abcabcabc", "abc", SearchOptions::default());
        assert_eq!(state.current_index(), Some(0));
        assert!(state.previous_match());
        assert_eq!(state.current_match().map(|m| m.start), Some(6));
        assert!(state.next_match());
        assert_eq!(state.current_match().map(|m| m.start), Some(0));
    }

    #[test]
    fn test_no_matches_never_navigates() {
        let mut state = SearchState::new("abc", "zzz", SearchOptions::default());
        assert!(!state.next_match());
        assert!(!state.previous_match());
        assert_eq!(state.current_highlight(3), None);
    }

    #[test]
    fn test_highlight_is_clamped() {
        let state = SearchState::new("hello world", "world", SearchOptions::default());
        assert_eq!(state.current_highlight(11), Some(6..11));
        assert_eq!(state.current_highlight(8), Some(6..8));
        assert_eq!(state.current_highlight(4), None);
    }
}
