//! Viewport mapping: pixel positions to lines and offsets.
//!
//! Nothing here is cached. Every query reads the host's current scroll position and line metrics,
//! so results are always consistent with the latest layout. Hosts that hide folded lines report
//! them with zero height; the searches below skip such lines naturally.

use crate::host::Host;
use crate::line_index::LineIndex;
use crate::text::{DEFAULT_TAB_WIDTH, column_for_visual_x, decimal_digits};

/// Inclusive range of lines intersecting the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportRange {
    /// First visible line.
    pub first: usize,
    /// Last visible line (inclusive).
    pub last: usize,
}

impl ViewportRange {
    /// Check if `line` is in range.
    pub fn contains(&self, line: usize) -> bool {
        line >= self.first && line <= self.last
    }

    /// Number of lines in range.
    pub fn len(&self) -> usize {
        self.last + 1 - self.first
    }

    /// Always `false`: a range holds at least one line.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Line under content coordinate `y`: the first line whose bottom edge lies below `y`.
///
/// Above the first line clamps to 0; below the last line clamps to the last line.
pub fn line_at_y<H: Host + ?Sized>(host: &H, line_count: usize, y: f32) -> usize {
    let last = line_count.saturating_sub(1);
    // Metrics are monotonic in line order, so `bottom <= y` partitions the lines.
    let (mut lo, mut hi) = (0usize, line_count);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if host.line_metrics(mid).bottom <= y {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo.min(last)
}

/// Lines intersecting `[scroll_top, scroll_top + viewport_height]`.
pub fn visible_line_range<H: Host + ?Sized>(host: &H, line_count: usize) -> ViewportRange {
    let top = host.scroll_top();
    let first = line_at_y(host, line_count, top);
    let last = line_at_y(host, line_count, top + host.viewport_height());
    ViewportRange {
        first,
        last: last.max(first),
    }
}

/// Horizontal geometry of the text area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextGeometry {
    /// Width of one monospace cell.
    pub cell_width: f32,
    /// Gutter width; 0 when line numbers are hidden.
    pub gutter_width: f32,
    /// Horizontal scroll of the text area.
    pub scroll_left: f32,
    /// Tab stop width in cells.
    pub tab_width: usize,
}

impl TextGeometry {
    /// Geometry with no gutter and no horizontal scroll.
    pub fn new(cell_width: f32) -> Self {
        Self {
            cell_width,
            gutter_width: 0.0,
            scroll_left: 0.0,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    /// Set the gutter width.
    pub fn with_gutter(mut self, gutter_width: f32) -> Self {
        self.gutter_width = gutter_width.max(0.0);
        self
    }
}

/// Gutter width for `line_count` lines: widest line number plus padding on both sides.
pub fn gutter_width(line_count: usize, digit_width: f32, padding: f32) -> f32 {
    decimal_digits(line_count.max(1)) as f32 * digit_width + 2.0 * padding
}

/// What a pointer position resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The line-number gutter next to `line`.
    Gutter {
        /// Logical line.
        line: usize,
    },
    /// Text on `line`, at character `offset` in the buffer.
    Text {
        /// Logical line.
        line: usize,
        /// Buffer character offset (clamped to the line).
        offset: usize,
    },
}

impl Hit {
    /// The logical line that was hit.
    pub fn line(&self) -> usize {
        match *self {
            Hit::Gutter { line } | Hit::Text { line, .. } => line,
        }
    }
}

/// Resolve a pointer position in viewport coordinates.
///
/// `y` is offset by the host's scroll position before the line lookup. `x` inside the gutter
/// always hits the gutter; gutters stay fixed while the text scrolls horizontally.
pub fn hit_test<H: Host + ?Sized>(
    host: &H,
    index: &LineIndex,
    text: &str,
    geometry: &TextGeometry,
    x: f32,
    y: f32,
) -> Hit {
    let line = line_at_y(host, index.line_count(), y + host.scroll_top());
    if x < geometry.gutter_width {
        return Hit::Gutter { line };
    }

    let range = index.line_range(line);
    let line_text: String = text
        .chars()
        .skip(range.start)
        .take(range.end - range.start)
        .collect();

    let text_x = x - geometry.gutter_width + geometry.scroll_left;
    let cell = if geometry.cell_width > 0.0 {
        (text_x.max(0.0) / geometry.cell_width) as usize
    } else {
        0
    };
    let column = column_for_visual_x(&line_text, cell, geometry.tab_width);
    Hit::Text {
        line,
        offset: index.offset_for_position(line, column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::VirtualHost;

    #[test]
    fn test_line_at_y_clamps() {
        let host = VirtualHost::new(10.0, 35.0);
        assert_eq!(line_at_y(&host, 5, -3.0), 0);
        assert_eq!(line_at_y(&host, 5, 0.0), 0);
        assert_eq!(line_at_y(&host, 5, 9.9), 0);
        assert_eq!(line_at_y(&host, 5, 10.0), 1);
        assert_eq!(line_at_y(&host, 5, 1000.0), 4);
        assert_eq!(line_at_y(&host, 0, 10.0), 0);
    }

    #[test]
    fn test_visible_range_follows_scroll() {
        let mut host = VirtualHost::new(10.0, 35.0);
        assert_eq!(
            visible_line_range(&host, 100),
            ViewportRange { first: 0, last: 3 }
        );
        host.set_scroll_top(25.0);
        let range = visible_line_range(&host, 100);
        assert_eq!(range, ViewportRange { first: 2, last: 6 });
        assert_eq!(range.len(), 5);
        assert_eq!(
            visible_line_range(&host, 4),
            ViewportRange { first: 2, last: 3 }
        );
    }

    #[test]
    fn test_gutter_width_grows_with_digits() {
        assert_eq!(gutter_width(9, 8.0, 10.0), 28.0);
        assert_eq!(gutter_width(10, 8.0, 10.0), 36.0);
        assert_eq!(gutter_width(0, 8.0, 10.0), 28.0);
    }

    #[test]
    fn test_hit_test_gutter_and_text() {
        let text = "ab\n你好x";
        let index = LineIndex::rebuild(text);
        let host = VirtualHost::new(10.0, 100.0);
        let geometry = TextGeometry::new(5.0).with_gutter(20.0);

        assert_eq!(
            hit_test(&host, &index, text, &geometry, 3.0, 12.0),
            Hit::Gutter { line: 1 }
        );
        // Cells on line 1: [你 0-1][好 2-3][x 4].
        assert_eq!(
            hit_test(&host, &index, text, &geometry, 20.0 + 5.0 * 2.0, 12.0),
            Hit::Text { line: 1, offset: 4 }
        );
        assert_eq!(
            hit_test(&host, &index, text, &geometry, 500.0, 1.0),
            Hit::Text { line: 0, offset: 2 }
        );
    }
}
