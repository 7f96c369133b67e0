//! Debounced re-classification.
//!
//! A buffer mutation asks for one classification run after a fixed delay. While a run is
//! pending, further requests are dropped: a burst of edits produces exactly one trailing run, and
//! that run classifies whatever the buffer holds when it fires.

use crate::host::{Host, TimerHandle, TimerKind};
use std::time::Duration;
use tracing::debug;
use viewer_highlight::{LanguageProfile, Span};

/// Default debounce delay between a mutation and its classification run.
pub const DEFAULT_HIGHLIGHT_DELAY: Duration = Duration::from_millis(100);

/// Owns the current spans and the pending debounce timer.
#[derive(Debug, Clone)]
pub struct HighlightScheduler {
    delay: Duration,
    enabled: bool,
    pending: Option<TimerHandle>,
    spans: Vec<Span>,
    generation: u64,
}

impl HighlightScheduler {
    /// Create a scheduler with the given debounce delay.
    pub fn new(delay: Duration, enabled: bool) -> Self {
        Self {
            delay,
            enabled,
            pending: None,
            spans: Vec::new(),
            generation: 0,
        }
    }

    /// The debounce delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether classification is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a run is scheduled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Current spans, grouped by rule in profile order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Number of completed classification runs.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Schedule a run unless one is already pending. Returns `true` if a timer was scheduled.
    pub fn request<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.enabled || self.pending.is_some() {
            return false;
        }
        self.pending = Some(host.schedule_after(self.delay, TimerKind::Highlight));
        true
    }

    /// Claim `handle` if it is the pending run. A `true` result means the caller must now run.
    pub fn take_if_pending(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Cancel the pending run, if any.
    pub fn cancel<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(handle) = self.pending.take() {
            host.cancel(handle);
        }
    }

    /// Replace all spans by classifying the whole of `text`.
    pub fn run(&mut self, profile: &LanguageProfile, text: &str) {
        if !self.enabled {
            return;
        }
        self.spans = profile.classify(text);
        self.generation += 1;
        debug!(
            generation = self.generation,
            spans = self.spans.len(),
            language = profile.language().map_or("none", |l| l.name()),
            "highlight run"
        );
    }

    /// Drop all spans.
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Turn classification on or off. Disabling cancels the pending run and clears spans; the
    /// caller runs classification after enabling.
    pub fn set_enabled<H: Host + ?Sized>(&mut self, enabled: bool, host: &mut H) {
        self.enabled = enabled;
        if !enabled {
            self.cancel(host);
            self.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::VirtualHost;
    use viewer_highlight::Category;

    fn numbers() -> LanguageProfile {
        LanguageProfile::builder(None)
            .rule(Category::Number, r"\d+")
            .build()
            .unwrap()
    }

    #[test]
    fn test_requests_coalesce_while_pending() {
        let mut host = VirtualHost::new(1.0, 10.0);
        let mut scheduler = HighlightScheduler::new(DEFAULT_HIGHLIGHT_DELAY, true);

        assert!(scheduler.request(&mut host));
        assert!(!scheduler.request(&mut host));
        assert_eq!(host.timers().pending_of(TimerKind::Highlight), 1);
    }

    #[test]
    fn test_stale_handle_is_not_claimed() {
        let mut host = VirtualHost::new(1.0, 10.0);
        let mut scheduler = HighlightScheduler::new(DEFAULT_HIGHLIGHT_DELAY, true);
        scheduler.request(&mut host);
        assert!(!scheduler.take_if_pending(TimerHandle(999)));
        assert!(scheduler.is_pending());
    }

    #[test]
    fn test_disable_cancels_and_clears() {
        let mut host = VirtualHost::new(1.0, 10.0);
        let mut scheduler = HighlightScheduler::new(DEFAULT_HIGHLIGHT_DELAY, true);
        scheduler.run(&numbers(), "a 1 b 22");
        assert_eq!(scheduler.spans().len(), 2);
        assert_eq!(scheduler.generation(), 1);

        scheduler.request(&mut host);
        scheduler.set_enabled(false, &mut host);
        assert!(scheduler.spans().is_empty());
        assert!(host.timers().is_empty());

        scheduler.run(&numbers(), "1");
        assert_eq!(scheduler.generation(), 1);
        assert!(!scheduler.request(&mut host));
    }
}
