//! Line-start index over the current buffer snapshot.
//!
//! The index is a plain, strictly increasing list of character offsets: entry `i` is where line
//! `i` begins. It is rebuilt wholesale from the buffer on every mutation, in one linear scan.

/// Line-start offsets for one buffer snapshot.
///
/// Invariants: never empty, `starts[0] == 0`, strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    char_count: usize,
}

impl LineIndex {
    /// Index for the empty buffer (a single empty line).
    pub fn new() -> Self {
        Self {
            starts: vec![0],
            char_count: 0,
        }
    }

    /// Build the index for `text`.
    ///
    /// Line count is `1 + number of '\n'`; a trailing newline opens an empty last line.
    pub fn rebuild(text: &str) -> Self {
        let mut starts = vec![0];
        let mut char_count = 0usize;
        for (pos, ch) in text.chars().enumerate() {
            if ch == '\n' {
                starts.push(pos + 1);
            }
            char_count = pos + 1;
        }
        Self { starts, char_count }
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Number of characters in the indexed buffer.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// The raw line-start offsets.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Offset where `line` begins. Lines past the end clamp to the last line.
    pub fn line_start(&self, line: usize) -> usize {
        let line = line.min(self.starts.len() - 1);
        self.starts[line]
    }

    /// Character range of `line`, excluding its terminating newline.
    pub fn line_range(&self, line: usize) -> std::ops::Range<usize> {
        let line = line.min(self.starts.len() - 1);
        let start = self.starts[line];
        let end = match self.starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.char_count,
        };
        start..end.max(start)
    }

    /// Line containing `offset`: the smallest `i` with `offset < starts[i + 1]`, or the last line.
    ///
    /// Offsets past the end of the buffer clamp to the last line.
    pub fn line_for_offset(&self, offset: usize) -> usize {
        // `partition_point` counts the starts `<= offset`; starts[0] == 0 keeps it >= 1.
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Offset of `(line, column)`, clamping the line to the buffer and the column to the line.
    pub fn offset_for_position(&self, line: usize, column: usize) -> usize {
        let range = self.line_range(line);
        (range.start + column).min(range.end)
    }

    /// `(line, column)` of `offset`, clamped to the end of the buffer.
    pub fn position_for_offset(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.char_count);
        let line = self.line_for_offset(offset);
        (line, offset - self.starts[line])
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_one_line() {
        let index = LineIndex::rebuild("");
        assert_eq!(index, LineIndex::new());
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_range(0), 0..0);
    }

    #[test]
    fn test_rebuild_records_line_starts() {
        let index = LineIndex::rebuild("ab\ncd\n\nef");
        assert_eq!(index.starts(), &[0, 3, 6, 7]);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_range(1), 3..5);
        assert_eq!(index.line_range(2), 6..6);
        assert_eq!(index.line_range(3), 7..9);
    }

    #[test]
    fn test_trailing_newline_opens_empty_line() {
        let index = LineIndex::rebuild("a\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_range(1), 2..2);
    }

    #[test]
    fn test_line_for_offset_boundaries() {
        let index = LineIndex::rebuild("ab\ncd");
        assert_eq!(index.line_for_offset(0), 0);
        // The newline belongs to the line it terminates.
        assert_eq!(index.line_for_offset(2), 0);
        assert_eq!(index.line_for_offset(3), 1);
        assert_eq!(index.line_for_offset(5), 1);
        assert_eq!(index.line_for_offset(500), 1);
    }

    #[test]
    fn test_offsets_are_chars_not_bytes() {
        let index = LineIndex::rebuild("你好\n世界");
        assert_eq!(index.starts(), &[0, 3]);
        assert_eq!(index.char_count(), 5);
        assert_eq!(index.position_for_offset(4), (1, 1));
    }

    #[test]
    fn test_position_round_trip_clamps() {
        let index = LineIndex::rebuild("abc\nde");
        assert_eq!(index.offset_for_position(1, 1), 5);
        assert_eq!(index.offset_for_position(1, 99), 6);
        assert_eq!(index.offset_for_position(9, 0), 4);
        assert_eq!(index.position_for_offset(99), (1, 2));
        assert_eq!(index.line_start(42), 4);
    }
}
