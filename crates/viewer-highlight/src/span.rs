//! Classified spans and the char/byte offset bookkeeping they need.

use viewer_lang::Category;

/// A classified half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// Lexical category.
    pub category: Category,
}

impl Span {
    /// Create a span for `[start, end)`.
    pub fn new(start: usize, end: usize, category: Category) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if the span contains a character offset.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// A non-overlapping colored run produced by [`flatten_spans`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledRun {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// Winning category for every character in the run.
    pub category: Category,
}

/// Resolve possibly overlapping spans into ordered, non-overlapping runs.
///
/// Spans are painted in slice order, so a later span wins at every character it covers. Spans
/// are clamped to `text_len`; uncolored gaps produce no run.
pub fn flatten_spans(spans: &[Span], text_len: usize) -> Vec<StyledRun> {
    if spans.is_empty() || text_len == 0 {
        return Vec::new();
    }

    let mut paint: Vec<Option<Category>> = vec![None; text_len];
    for span in spans {
        let end = span.end.min(text_len);
        if span.start >= end {
            continue;
        }
        for slot in &mut paint[span.start..end] {
            *slot = Some(span.category);
        }
    }

    let mut runs: Vec<StyledRun> = Vec::new();
    for (pos, slot) in paint.into_iter().enumerate() {
        let Some(category) = slot else {
            continue;
        };
        match runs.last_mut() {
            Some(run) if run.end == pos && run.category == category => run.end = pos + 1,
            _ => runs.push(StyledRun {
                start: pos,
                end: pos + 1,
                category,
            }),
        }
    }
    runs
}

/// Character ↔ byte offset table for a UTF-8 string.
///
/// Regex matches are reported in bytes; everything the engine exposes is in characters.
#[derive(Debug)]
pub struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    /// Build the table for `text`.
    pub fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    /// Number of characters in the indexed text.
    pub fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    /// Byte offset of a character offset (clamped to the end of the text).
    pub fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text_len)
    }

    /// Character offset of a byte offset (rounded up to the next char boundary).
    pub fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flatten_last_write_wins() {
        let spans = [
            Span::new(0, 10, Category::Keyword),
            Span::new(3, 5, Category::String),
        ];
        let runs = flatten_spans(&spans, 10);
        assert_eq!(
            runs,
            vec![
                StyledRun {
                    start: 0,
                    end: 3,
                    category: Category::Keyword
                },
                StyledRun {
                    start: 3,
                    end: 5,
                    category: Category::String
                },
                StyledRun {
                    start: 5,
                    end: 10,
                    category: Category::Keyword
                },
            ]
        );
    }

    #[test]
    fn test_flatten_clamps_and_skips_gaps() {
        let spans = [
            Span::new(1, 2, Category::Number),
            Span::new(4, 99, Category::Comment),
        ];
        let runs = flatten_spans(&spans, 6);
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].start, runs[0].end), (1, 2));
        assert_eq!((runs[1].start, runs[1].end), (4, 6));
    }

    #[test]
    fn test_char_index_multibyte() {
        let index = CharIndex::new("a你b");
        assert_eq!(index.char_count(), 3);
        assert_eq!(index.char_to_byte(1), 1);
        assert_eq!(index.char_to_byte(2), 4);
        assert_eq!(index.byte_to_char(4), 2);
        assert_eq!(index.char_to_byte(99), 5);
    }
}
