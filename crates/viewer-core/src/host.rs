//! The seam between the engine and its host surface.
//!
//! The engine never owns a clock or a thread. It asks the host to schedule a callback and gets a
//! [`TimerHandle`] back; when the delay expires the host calls
//! [`CodeViewer::on_timer`](crate::CodeViewer::on_timer) with that handle. Handles the engine no
//! longer waits for are ignored, so a host may deliver a cancelled timer without harm.

use crate::viewer::CodeViewer;
use std::time::Duration;

/// Opaque identifier of a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u64);

/// What a scheduled callback is for. Hosts may use it for logging or prioritizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Debounced re-classification.
    Highlight,
    /// Next reveal animation step.
    RevealTick,
}

/// Vertical geometry of one line, in host pixels, relative to the top of the content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    /// Top edge.
    pub top: f32,
    /// Text baseline.
    pub baseline: f32,
    /// Bottom edge (exclusive).
    pub bottom: f32,
}

impl LineMetrics {
    /// Metrics of `line` when every line is `line_height` tall.
    pub fn uniform(line: usize, line_height: f32) -> Self {
        let top = line as f32 * line_height;
        Self {
            top,
            baseline: top + line_height * 0.8,
            bottom: top + line_height,
        }
    }

    /// Check if `y` falls on this line.
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom
    }
}

/// Services the engine consumes from its host.
pub trait Host {
    /// Ask for a repaint.
    fn request_redraw(&mut self);

    /// Schedule a callback after `delay`. Must return immediately.
    fn schedule_after(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle;

    /// Cancel a scheduled callback. Unknown or fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Scroll so that the character at `offset` is visible.
    fn scroll_to_offset(&mut self, offset: usize);

    /// Height of the visible area, in the same unit as [`LineMetrics`].
    fn viewport_height(&self) -> f32;

    /// Current vertical scroll position.
    fn scroll_top(&self) -> f32;

    /// Geometry of a logical line.
    fn line_metrics(&self, line: usize) -> LineMetrics;
}

/// A scheduled callback inside a [`TimerQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    /// Handle returned to the engine.
    pub handle: TimerHandle,
    /// Expiry, measured from the owner's epoch.
    pub deadline: Duration,
    /// Purpose of the callback.
    pub kind: TimerKind,
}

/// Deadline-ordered timer bookkeeping for hosts.
///
/// This is a pure data structure with no clock: callers pass `now` in, measured from any fixed
/// epoch they choose.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a timer expiring at `now + delay`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.timers.push(Timer {
            handle,
            deadline: now.saturating_add(delay),
            kind,
        });
        handle
    }

    /// Remove a timer. Returns `false` if it was not pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.handle != handle);
        self.timers.len() != before
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.deadline).min()
    }

    /// Remove and return the earliest timer due at `now`. Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Duration) -> Option<Timer> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= now)
            .min_by_key(|(_, timer)| (timer.deadline, timer.handle))
            .map(|(idx, _)| idx)?;
        Some(self.timers.remove(idx))
    }

    /// Whether `handle` is still pending.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|timer| timer.handle == handle)
    }

    /// Number of pending timers of `kind`.
    pub fn pending_of(&self, kind: TimerKind) -> usize {
        self.timers.iter().filter(|timer| timer.kind == kind).count()
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Returns `true` if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

/// A deterministic host with a virtual clock and uniform line heights.
///
/// Time only moves through [`VirtualHost::advance`] and [`VirtualHost::run_until_idle`], which
/// deliver due timers to a viewer in deadline order.
#[derive(Debug, Clone)]
pub struct VirtualHost {
    now: Duration,
    timers: TimerQueue,
    line_height: f32,
    viewport_height: f32,
    scroll_top: f32,
    redraw_count: usize,
    scroll_requests: Vec<usize>,
}

impl VirtualHost {
    /// Create a host with the given line height and viewport height.
    pub fn new(line_height: f32, viewport_height: f32) -> Self {
        Self {
            now: Duration::ZERO,
            timers: TimerQueue::new(),
            line_height,
            viewport_height,
            scroll_top: 0.0,
            redraw_count: 0,
            scroll_requests: Vec::new(),
        }
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Pending timers.
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Number of redraw requests received.
    pub fn redraw_count(&self) -> usize {
        self.redraw_count
    }

    /// Offsets passed to [`Host::scroll_to_offset`], oldest first.
    pub fn scroll_requests(&self) -> &[usize] {
        &self.scroll_requests
    }

    /// Set the vertical scroll position.
    pub fn set_scroll_top(&mut self, scroll_top: f32) {
        self.scroll_top = scroll_top.max(0.0);
    }

    /// Move the clock forward by `by`, firing every timer that comes due on the way.
    ///
    /// Timers scheduled by a callback fire in the same call if their deadline is reached.
    pub fn advance(&mut self, viewer: &mut CodeViewer, by: Duration) {
        let target = self.now.saturating_add(by);
        while let Some(timer) = self.timers.pop_due(target) {
            self.now = self.now.max(timer.deadline);
            viewer.on_timer(timer.handle, self);
        }
        self.now = target;
    }

    /// Fire timers until none are pending. Returns the virtual time spent.
    pub fn run_until_idle(&mut self, viewer: &mut CodeViewer) -> Duration {
        let start = self.now;
        while let Some(deadline) = self.timers.next_deadline() {
            let by = deadline.saturating_sub(self.now);
            self.advance(viewer, by);
        }
        self.now - start
    }
}

impl Host for VirtualHost {
    fn request_redraw(&mut self) {
        self.redraw_count += 1;
    }

    fn schedule_after(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.timers.schedule(self.now, delay, kind)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }

    fn scroll_to_offset(&mut self, offset: usize) {
        self.scroll_requests.push(offset);
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    fn line_metrics(&self, line: usize) -> LineMetrics {
        LineMetrics::uniform(line, self.line_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_queue_orders_by_deadline_then_schedule_order() {
        let mut queue = TimerQueue::new();
        let late = queue.schedule(Duration::ZERO, Duration::from_millis(50), TimerKind::Highlight);
        let a = queue.schedule(Duration::ZERO, Duration::from_millis(5), TimerKind::RevealTick);
        let b = queue.schedule(Duration::ZERO, Duration::from_millis(5), TimerKind::RevealTick);

        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(5)));
        assert_eq!(queue.pop_due(Duration::from_millis(4)), None);
        let now = Duration::from_millis(60);
        assert_eq!(queue.pop_due(now).map(|t| t.handle), Some(a));
        assert_eq!(queue.pop_due(now).map(|t| t.handle), Some(b));
        assert_eq!(queue.pop_due(now).map(|t| t.handle), Some(late));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_timer_queue_cancel() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(Duration::ZERO, Duration::from_millis(1), TimerKind::Highlight);
        assert!(queue.is_pending(handle));
        assert_eq!(queue.pending_of(TimerKind::Highlight), 1);
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert_eq!(queue.pop_due(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_uniform_metrics() {
        let metrics = LineMetrics::uniform(3, 10.0);
        assert_eq!(metrics.top, 30.0);
        assert_eq!(metrics.bottom, 40.0);
        assert!(metrics.contains_y(30.0));
        assert!(!metrics.contains_y(40.0));
    }
}
