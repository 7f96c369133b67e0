//! 终端宿主：一行 = 一个单位高度，折叠隐藏的行高度为 0

use std::time::{Duration, Instant};
use viewer_core::{CodeViewer, Host, LineMetrics, TimerHandle, TimerKind, TimerQueue};

/// 没有定时器时的最长轮询间隔
pub const IDLE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct TerminalHost {
    epoch: Instant,
    timers: TimerQueue,
    /// 文本区可见行数
    rows: usize,
    /// 以行为单位的滚动位置（只计算可见行）
    scroll_top: usize,
    /// tops[i] = 第 i 行的顶部；最后一项是总高度
    tops: Vec<usize>,
    needs_redraw: bool,
    pending_scroll: Option<usize>,
}

impl TerminalHost {
    pub fn new(rows: usize) -> Self {
        Self {
            epoch: Instant::now(),
            timers: TimerQueue::new(),
            rows: rows.max(1),
            scroll_top: 0,
            tops: vec![0, 1],
            needs_redraw: true,
            pending_scroll: None,
        }
    }

    pub fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows.max(1);
        self.clamp_scroll();
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 根据当前折叠状态重算每行的顶部位置
    pub fn sync_layout(&mut self, viewer: &CodeViewer) {
        let line_count = viewer.line_index().line_count();
        self.tops.clear();
        self.tops.reserve(line_count + 1);
        let mut y = 0;
        for line in 0..line_count {
            self.tops.push(y);
            if !viewer.folds().is_line_hidden(line) {
                y += 1;
            }
        }
        self.tops.push(y);
        self.clamp_scroll();
    }

    fn total_rows(&self) -> usize {
        self.tops.last().copied().unwrap_or(0)
    }

    fn max_scroll_top(&self) -> usize {
        self.total_rows().saturating_sub(self.rows)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_top = self.scroll_top.saturating_add_signed(delta);
        self.clamp_scroll();
        self.needs_redraw = true;
    }

    /// 第一个可见行的行号
    pub fn top_line(&self) -> usize {
        // 第一个 bottom > scroll_top 的行
        let bottoms = &self.tops[1..];
        bottoms
            .partition_point(|&bottom| bottom <= self.scroll_top)
            .min(bottoms.len().saturating_sub(1))
    }

    /// 视口最后一行所在的行号（折叠隐藏的行不算）
    pub fn bottom_line(&self) -> usize {
        let last_row = self.scroll_top + self.rows - 1;
        let bottoms = &self.tops[1..];
        bottoms
            .partition_point(|&bottom| bottom <= last_row)
            .min(bottoms.len().saturating_sub(1))
            .max(self.top_line())
    }

    /// 把 `scroll_to_offset` 请求落实为滚动位置（需要 viewer 把偏移换算成行）
    pub fn apply_pending_scroll(&mut self, viewer: &CodeViewer) {
        let Some(offset) = self.pending_scroll.take() else {
            return;
        };
        let line = viewer.line_index().line_for_offset(offset);
        let Some(&row) = self.tops.get(line) else {
            return;
        };
        if row < self.scroll_top || row >= self.scroll_top + self.rows {
            // 目标行放在视口中间
            self.scroll_top = row.saturating_sub(self.rows / 2);
            self.clamp_scroll();
        }
        self.needs_redraw = true;
    }

    /// 下一次事件轮询最多等多久
    pub fn poll_timeout(&self) -> Duration {
        match self.timers.next_deadline() {
            Some(deadline) => deadline.saturating_sub(self.now()).min(IDLE_POLL),
            None => IDLE_POLL,
        }
    }

    /// 触发所有到期的定时器；返回触发的数量
    pub fn fire_due(&mut self, viewer: &mut CodeViewer) -> usize {
        let now = self.now();
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now) {
            tracing::trace!(handle = timer.handle.0, kind = ?timer.kind, "timer fired");
            viewer.on_timer(timer.handle, self);
            fired += 1;
        }
        fired
    }

    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}

impl Host for TerminalHost {
    fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    fn schedule_after(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let now = self.now();
        self.timers.schedule(now, delay, kind)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }

    fn scroll_to_offset(&mut self, offset: usize) {
        self.pending_scroll = Some(offset);
    }

    fn viewport_height(&self) -> f32 {
        self.rows as f32
    }

    fn scroll_top(&self) -> f32 {
        self.scroll_top as f32
    }

    fn line_metrics(&self, line: usize) -> LineMetrics {
        let last = self.tops.len().saturating_sub(1);
        let (top, bottom) = if line < last {
            (self.tops[line], self.tops[line + 1])
        } else {
            // 超出文档：按普通行继续向下排
            let top = self.total_rows() + (line - last);
            (top, top + 1)
        };
        LineMetrics {
            top: top as f32,
            baseline: bottom as f32,
            bottom: bottom as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewer_core::{TextGeometry, ViewerConfig};

    fn folded_viewer(host: &mut TerminalHost) -> CodeViewer {
        let mut viewer = CodeViewer::new(ViewerConfig::default()).unwrap();
        viewer.set_text("a {\nb\nc\n}\nd\ne", host);
        viewer.toggle_fold(0, host);
        host.sync_layout(&viewer);
        viewer
    }

    #[test]
    fn test_hidden_lines_have_zero_height() {
        let mut host = TerminalHost::new(10);
        let _viewer = folded_viewer(&mut host);
        assert_eq!(host.line_metrics(0).bottom, 1.0);
        assert_eq!(host.line_metrics(1).top, host.line_metrics(1).bottom);
        assert_eq!(host.line_metrics(4).top, 1.0);
        assert_eq!(host.total_rows(), 3);
    }

    #[test]
    fn test_pointer_below_fold_hits_the_next_visible_line() {
        let mut host = TerminalHost::new(10);
        let mut viewer = folded_viewer(&mut host);
        let geometry = TextGeometry::new(1.0).with_gutter(viewer.gutter_width(1.0));
        let hit = viewer.pointer_up(geometry.gutter_width + 0.5, 1.5, &geometry, &mut host);
        assert_eq!(hit.line(), 4);
    }

    #[test]
    fn test_pending_scroll_centers_far_lines() {
        let mut host = TerminalHost::new(4);
        let mut viewer = CodeViewer::new(ViewerConfig::default()).unwrap();
        let text: String = (0..40).map(|i| format!("row {i}\n")).collect();
        viewer.set_text(text, &mut host);
        host.sync_layout(&viewer);

        host.scroll_to_offset(viewer.line_index().line_start(30));
        host.apply_pending_scroll(&viewer);
        assert_eq!(host.top_line(), 28);
        assert_eq!(viewer.visible_line_range(&host).first, 28);
    }

    #[test]
    fn test_bottom_line_is_the_last_row_on_screen() {
        let mut host = TerminalHost::new(4);
        let mut viewer = CodeViewer::new(ViewerConfig::default()).unwrap();
        let text: String = (0..40).map(|i| format!("row {i}\n")).collect();
        viewer.set_text(text, &mut host);
        host.sync_layout(&viewer);
        assert_eq!((host.top_line(), host.bottom_line()), (0, 3));
        host.scroll_by(10);
        assert_eq!((host.top_line(), host.bottom_line()), (10, 13));

        // Short documents end at their last line.
        let mut host = TerminalHost::new(10);
        let viewer = folded_viewer(&mut host);
        assert_eq!((host.top_line(), host.bottom_line()), (0, 5));
        assert!(!viewer.folds().is_line_hidden(host.bottom_line()));
    }

    #[test]
    fn test_poll_timeout_is_bounded() {
        let mut host = TerminalHost::new(4);
        assert_eq!(host.poll_timeout(), IDLE_POLL);
        host.schedule_after(Duration::from_secs(5), TimerKind::Highlight);
        assert!(host.poll_timeout() <= IDLE_POLL);
    }
}
