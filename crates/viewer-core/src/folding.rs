//! Fold detection and fold state.
//!
//! Regions are found with a delimiter stack over whole lines. A line that mentions a comment
//! marker anywhere is ignored for both delimiters (substring check only, so multi-line comments
//! and delimiters inside strings are deliberately not understood).
//!
//! Re-detection replaces every region. Collapsed state survives a re-detection when a region with
//! the same structural identity (nesting depth, trimmed header line, and occurrence among equal
//! headers) still exists, so edits above a collapsed block do not expand it.

use std::collections::HashSet;
use viewer_lang::LanguageConfig;

/// A foldable block of lines.
///
/// `end_line > start_line + 1` always holds for detected regions. When collapsed, lines
/// `start_line + 1 ..= end_line` are hidden and the header line stays visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRegion {
    /// Line holding the opening delimiter.
    pub start_line: usize,
    /// Line holding the matching closing delimiter (inclusive).
    pub end_line: usize,
    /// Number of enclosing regions when the opening delimiter was seen.
    pub depth: usize,
    /// Whether folded
    pub is_collapsed: bool,
}

impl FoldRegion {
    /// Create an expanded region at nesting depth 0.
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            depth: 0,
            is_collapsed: false,
        }
    }

    /// Toggle fold state
    pub fn toggle(&mut self) {
        self.is_collapsed = !self.is_collapsed;
    }

    /// Check if line number is within fold region (header and closing line included).
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Number of lines hidden when collapsed.
    pub fn hidden_line_count(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Scan `lines` for delimiter-matched regions.
///
/// Result is sorted by `(start_line, end_line)`. Unmatched closers are ignored; unmatched openers
/// never produce a region.
pub fn detect_regions<'a, I>(lines: I, config: &LanguageConfig) -> Vec<FoldRegion>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stack: Vec<usize> = Vec::new();
    let mut regions = Vec::new();

    for (line_no, line) in lines.into_iter().enumerate() {
        if config.comments.markers().any(|marker| line.contains(marker)) {
            continue;
        }
        if line.contains(config.fold.open) {
            stack.push(line_no);
        }
        if line.contains(config.fold.close)
            && let Some(start_line) = stack.pop()
            && line_no > start_line + 1
        {
            regions.push(FoldRegion {
                start_line,
                end_line: line_no,
                depth: stack.len(),
                is_collapsed: false,
            });
        }
    }

    regions.sort_by_key(|r| (r.start_line, r.end_line));
    regions
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FoldKey {
    depth: usize,
    header: String,
    occurrence: usize,
}

fn fold_keys(regions: &[FoldRegion], lines: &[&str]) -> Vec<FoldKey> {
    let mut seen: Vec<(usize, &str)> = Vec::new();
    regions
        .iter()
        .map(|region| {
            let header = lines.get(region.start_line).map_or("", |line| line.trim());
            let occurrence = seen
                .iter()
                .filter(|(depth, text)| *depth == region.depth && *text == header)
                .count();
            seen.push((region.depth, header));
            FoldKey {
                depth: region.depth,
                header: header.to_string(),
                occurrence,
            }
        })
        .collect()
}

/// Folding manager: the current region set, collapsed flags, and the derived hidden-line map.
#[derive(Debug, Clone, Default)]
pub struct FoldingManager {
    regions: Vec<FoldRegion>,
    keys: Vec<FoldKey>,
    /// Merged, sorted, disjoint inclusive ranges of hidden lines.
    hidden: Vec<(usize, usize)>,
}

impl FoldingManager {
    /// Create an empty folding manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_hidden(&mut self) {
        self.hidden.clear();
        for region in self.regions.iter().filter(|r| r.is_collapsed) {
            let (start, end) = (region.start_line + 1, region.end_line);
            match self.hidden.last_mut() {
                Some(last) if start <= last.1 + 1 => last.1 = last.1.max(end),
                _ => self.hidden.push((start, end)),
            }
        }
    }

    /// Re-detect regions over `lines`, carrying collapsed flags over by structural identity.
    pub fn redetect(&mut self, lines: &[&str], config: &LanguageConfig) {
        let regions = detect_regions(lines.iter().copied(), config);
        self.replace_regions(regions, lines);
    }

    /// Replace the region set. `lines` is the buffer the regions were detected on.
    ///
    /// A new region is collapsed if it was passed in collapsed, or if a previously collapsed
    /// region had the same structural identity.
    pub fn replace_regions(&mut self, mut regions: Vec<FoldRegion>, lines: &[&str]) {
        regions.sort_by_key(|r| (r.start_line, r.end_line));
        regions.dedup_by(|a, b| a.start_line == b.start_line && a.end_line == b.end_line);
        regions.retain(|r| r.end_line > r.start_line + 1);

        let collapsed: HashSet<&FoldKey> = self
            .regions
            .iter()
            .zip(&self.keys)
            .filter(|(region, _)| region.is_collapsed)
            .map(|(_, key)| key)
            .collect();

        let keys = fold_keys(&regions, lines);
        for (region, key) in regions.iter_mut().zip(&keys) {
            if collapsed.contains(key) {
                region.is_collapsed = true;
            }
        }

        self.regions = regions;
        self.keys = keys;
        self.rebuild_hidden();
    }

    /// Clear all fold regions.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.keys.clear();
        self.hidden.clear();
    }

    /// Get all fold regions, sorted by `(start_line, end_line)`.
    pub fn regions(&self) -> &[FoldRegion] {
        &self.regions
    }

    /// Innermost region whose header is `start_line`.
    pub fn region_starting_at(&self, start_line: usize) -> Option<&FoldRegion> {
        let idx = self.innermost_starting_at(start_line)?;
        self.regions.get(idx)
    }

    fn innermost_starting_at(&self, start_line: usize) -> Option<usize> {
        // Sorted by (start, end): the first hit is the innermost.
        let idx = self.regions.partition_point(|r| r.start_line < start_line);
        self.regions
            .get(idx)
            .filter(|r| r.start_line == start_line)
            .map(|_| idx)
    }

    /// Toggle the region starting at `start_line`. Returns `false` if there is none.
    pub fn toggle(&mut self, start_line: usize) -> bool {
        let Some(idx) = self.innermost_starting_at(start_line) else {
            return false;
        };
        self.regions[idx].toggle();
        self.rebuild_hidden();
        true
    }

    /// Expand all folds
    pub fn expand_all(&mut self) {
        for region in &mut self.regions {
            region.is_collapsed = false;
        }
        self.rebuild_hidden();
    }

    /// Collapse all regions
    pub fn collapse_all(&mut self) {
        for region in &mut self.regions {
            region.is_collapsed = true;
        }
        self.rebuild_hidden();
    }

    /// Whether `line` is inside a collapsed region (headers are never hidden).
    pub fn is_line_hidden(&self, line: usize) -> bool {
        let idx = self.hidden.partition_point(|&(_, end)| end < line);
        self.hidden
            .get(idx)
            .is_some_and(|&(start, _)| start <= line)
    }

    /// Visual row for `logical_line`, or `None` if the line is folded away.
    pub fn logical_to_visual(&self, logical_line: usize) -> Option<usize> {
        if self.is_line_hidden(logical_line) {
            return None;
        }
        let hidden_before: usize = self
            .hidden
            .iter()
            .take_while(|&&(_, end)| end < logical_line)
            .map(|&(start, end)| end - start + 1)
            .sum();
        Some(logical_line - hidden_before)
    }

    /// Logical line shown at `visual_row`.
    pub fn visual_to_logical(&self, visual_row: usize) -> usize {
        let mut logical = visual_row;
        for &(start, end) in &self.hidden {
            if start > logical {
                break;
            }
            logical += end - start + 1;
        }
        logical
    }

    /// Number of visual rows for a buffer of `line_count` lines.
    pub fn visual_line_count(&self, line_count: usize) -> usize {
        let hidden: usize = self
            .hidden
            .iter()
            .filter(|&&(start, _)| start < line_count)
            .map(|&(start, end)| end.min(line_count - 1) - start + 1)
            .sum();
        line_count.saturating_sub(hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewer_lang::LanguageId;

    fn c_style() -> LanguageConfig {
        LanguageConfig::fallback()
    }

    fn lines(text: &str) -> Vec<&str> {
        text.split('\n').collect()
    }

    #[test]
    fn test_detects_block_with_body() {
        let regions = detect_regions(lines("a {\nb\nc\n}"), &c_style());
        assert_eq!(regions, vec![FoldRegion::new(0, 3)]);
    }

    #[test]
    fn test_adjacent_delimiters_are_not_foldable() {
        assert!(detect_regions(lines("a {\n}"), &c_style()).is_empty());
        assert!(detect_regions(lines("a { }"), &c_style()).is_empty());
        // One body line is enough.
        assert_eq!(detect_regions(lines("a {\nb\n}x"), &c_style()).len(), 1);
    }

    #[test]
    fn test_comment_lines_are_ignored() {
        let text = "f() {\n  // }\n  x\n}";
        let regions = detect_regions(lines(text), &c_style());
        assert_eq!(regions, vec![FoldRegion::new(0, 3)]);

        let python = LanguageId::Python.config();
        let regions = detect_regions(lines("d = {  # {\n1\n2\n}"), &python);
        assert!(regions.is_empty());
    }

    #[test]
    fn test_nested_regions_record_depth() {
        let text = "class A {\n  void f() {\n    x();\n  }\n}";
        let regions = detect_regions(lines(text), &c_style());
        assert_eq!(regions.len(), 2);
        assert_eq!((regions[0].start_line, regions[0].end_line), (0, 4));
        assert_eq!(regions[0].depth, 0);
        assert_eq!((regions[1].start_line, regions[1].end_line), (1, 3));
        assert_eq!(regions[1].depth, 1);
    }

    #[test]
    fn test_close_then_open_on_one_line() {
        let text = "if (a) {\n  x\n} else {\n  y\n}";
        let regions = detect_regions(lines(text), &c_style());
        // Line 2 pushes and then pops itself; the outer pair spans both branches.
        assert_eq!(regions, vec![FoldRegion::new(0, 4)]);
    }

    #[test]
    fn test_toggle_and_hidden_lines() {
        let text = "a {\nb\nc\n}\nd";
        let mut manager = FoldingManager::new();
        manager.redetect(&lines(text), &c_style());

        assert!(!manager.toggle(1));
        assert!(manager.toggle(0));
        assert!(!manager.is_line_hidden(0));
        assert!(manager.is_line_hidden(1));
        assert!(manager.is_line_hidden(3));
        assert!(!manager.is_line_hidden(4));

        assert_eq!(manager.logical_to_visual(4), Some(1));
        assert_eq!(manager.logical_to_visual(2), None);
        assert_eq!(manager.visual_to_logical(1), 4);
        assert_eq!(manager.visual_line_count(5), 2);

        manager.expand_all();
        assert_eq!(manager.visual_line_count(5), 5);
    }

    #[test]
    fn test_nested_collapsed_regions_merge() {
        let text = "A {\n B {\n  x\n }\n y\n}\nz";
        let mut manager = FoldingManager::new();
        manager.redetect(&lines(text), &c_style());
        manager.collapse_all();

        assert_eq!(manager.visual_line_count(7), 2);
        assert_eq!(manager.logical_to_visual(6), Some(1));
        assert_eq!(manager.visual_to_logical(1), 6);
    }

    #[test]
    fn test_collapsed_state_survives_edit_above() {
        let before = "fn a() {\n  1\n  2\n}\nfn b() {\n  3\n  4\n}";
        let mut manager = FoldingManager::new();
        manager.redetect(&lines(before), &c_style());
        assert!(manager.toggle(4));

        let after = format!("// header\n{before}");
        manager.redetect(&lines(&after), &c_style());

        let a = manager.region_starting_at(1).unwrap();
        let b = manager.region_starting_at(5).unwrap();
        assert!(!a.is_collapsed);
        assert!(b.is_collapsed);
    }

    #[test]
    fn test_collapsed_state_dropped_when_header_changes() {
        let mut manager = FoldingManager::new();
        manager.redetect(&lines("a {\nb\nc\n}"), &c_style());
        manager.toggle(0);
        manager.redetect(&lines("renamed {\nb\nc\n}"), &c_style());
        assert!(!manager.regions()[0].is_collapsed);
    }
}
