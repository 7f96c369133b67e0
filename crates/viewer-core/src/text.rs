//! Unicode-aware cell measurement for monospace hosts.
//!
//! Widths follow UAX #11; tabs advance to the next tab stop. Column lookups snap to grapheme
//! cluster boundaries so a pointer never lands inside a cluster.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells) used when a caller does not specify a tab width.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Calculate visual width of a character (based on UAX #11)
///
/// Return value:
/// - 1: Narrow character (ASCII, etc.)
/// - 2: Wide character (CJK, fullwidth, etc.)
/// - 0: Zero-width character (combining characters, etc.)
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Visual width (in cells) of `ch` when it starts at `cell_offset_in_line`.
pub fn cell_width_at(ch: char, cell_offset_in_line: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - cell_offset_in_line % tab_width
    } else {
        char_width(ch)
    }
}

/// Total visual width of `line`, interpreting `'\t'` using `tab_width`.
pub fn str_width(line: &str, tab_width: usize) -> usize {
    visual_x_for_column(line, usize::MAX, tab_width)
}

/// Cell offset from the start of the line to the given character column.
pub fn visual_x_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    let mut x = 0usize;
    for ch in line.chars().take(column) {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// Character column of the grapheme cluster covering cell `x`.
///
/// Cells past the end of the line map to the line's character count.
pub fn column_for_visual_x(line: &str, x: usize, tab_width: usize) -> usize {
    let mut cell = 0usize;
    let mut column = 0usize;
    for grapheme in line.graphemes(true) {
        let start_column = column;
        for ch in grapheme.chars() {
            cell = cell.saturating_add(cell_width_at(ch, cell, tab_width));
            column += 1;
        }
        if x < cell {
            return start_column;
        }
    }
    column
}

/// Number of decimal digits needed to print `n` (at least 1).
pub fn decimal_digits(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |log| log as usize + 1)
}
