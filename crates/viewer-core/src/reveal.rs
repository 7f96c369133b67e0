//! Character-by-character reveal animation.
//!
//! The scheduler only tracks the target text, the reveal position, and the pending tick. The
//! viewer applies each step to its buffer.

use crate::host::{Host, TimerHandle, TimerKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Preset delays between revealed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingSpeed {
    /// 50 ms per character.
    Slow,
    /// 20 ms per character.
    #[default]
    Medium,
    /// 5 ms per character.
    Fast,
}

impl TypingSpeed {
    /// Delay per character in milliseconds.
    pub fn millis(self) -> u64 {
        match self {
            TypingSpeed::Slow => 50,
            TypingSpeed::Medium => 20,
            TypingSpeed::Fast => 5,
        }
    }

    /// Delay per character.
    pub fn delay(self) -> Duration {
        Duration::from_millis(self.millis())
    }
}

impl From<TypingSpeed> for Duration {
    fn from(speed: TypingSpeed) -> Self {
        speed.delay()
    }
}

/// Outcome of a reveal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// One more character is visible; another tick is scheduled.
    Advanced,
    /// The whole target is visible and the scheduler is idle.
    Finished,
}

/// Reveal state: idle, or revealing `target` up to `position` characters.
#[derive(Debug, Clone, Default)]
pub struct RevealScheduler {
    target: String,
    target_chars: usize,
    /// Characters currently shown.
    position: usize,
    /// Byte length of the shown prefix.
    shown_bytes: usize,
    delay: Duration,
    pending: Option<TimerHandle>,
}

impl RevealScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reveal is in progress.
    pub fn is_revealing(&self) -> bool {
        self.pending.is_some()
    }

    /// Characters revealed so far, while revealing.
    pub fn cursor(&self) -> Option<usize> {
        self.is_revealing().then_some(self.position)
    }

    /// The full target text of the current or last reveal.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The revealed prefix of the target.
    pub fn visible_text(&self) -> &str {
        self.target.get(..self.shown_bytes).unwrap_or(&self.target)
    }

    /// Start revealing `target`, cancelling any reveal in progress.
    ///
    /// An empty target finishes immediately.
    pub fn start<H: Host + ?Sized>(
        &mut self,
        target: String,
        delay: Duration,
        host: &mut H,
    ) -> RevealStep {
        self.cancel(host);
        self.target_chars = target.chars().count();
        self.target = target;
        self.position = 0;
        self.shown_bytes = 0;
        self.delay = delay;

        if self.target_chars == 0 {
            return RevealStep::Finished;
        }
        self.pending = Some(host.schedule_after(delay, TimerKind::RevealTick));
        RevealStep::Advanced
    }

    /// Handle a timer. Returns `None` if `handle` is not the pending tick.
    pub fn tick<H: Host + ?Sized>(&mut self, handle: TimerHandle, host: &mut H) -> Option<RevealStep> {
        if self.pending != Some(handle) {
            return None;
        }
        self.pending = None;

        let next = self.target[self.shown_bytes..].chars().next()?;
        self.shown_bytes += next.len_utf8();
        self.position += 1;
        trace!(position = self.position, total = self.target_chars, "reveal tick");

        if self.position >= self.target_chars {
            return Some(RevealStep::Finished);
        }
        self.pending = Some(host.schedule_after(self.delay, TimerKind::RevealTick));
        Some(RevealStep::Advanced)
    }

    /// Stop the reveal, showing the whole target. Returns `false` if nothing was revealing.
    pub fn stop<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.is_revealing() {
            return false;
        }
        self.cancel(host);
        self.position = self.target_chars;
        self.shown_bytes = self.target.len();
        true
    }

    /// Cancel the pending tick without changing the revealed prefix.
    pub fn cancel<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(handle) = self.pending.take() {
            host.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::VirtualHost;

    fn fire(reveal: &mut RevealScheduler, host: &mut VirtualHost) -> Option<RevealStep> {
        let timer = host.timers().clone().pop_due(std::time::Duration::MAX)?;
        host.cancel(timer.handle);
        reveal.tick(timer.handle, host)
    }

    #[test]
    fn test_speed_presets() {
        assert_eq!(TypingSpeed::Slow.delay(), Duration::from_millis(50));
        assert_eq!(Duration::from(TypingSpeed::Fast), Duration::from_millis(5));
        assert_eq!(TypingSpeed::default(), TypingSpeed::Medium);
    }

    #[test]
    fn test_reveals_one_char_per_tick() {
        let mut host = VirtualHost::new(1.0, 10.0);
        let mut reveal = RevealScheduler::new();
        assert_eq!(
            reveal.start("a你c".to_string(), TypingSpeed::Fast.delay(), &mut host),
            RevealStep::Advanced
        );
        assert_eq!(reveal.visible_text(), "");
        assert_eq!(reveal.cursor(), Some(0));

        assert_eq!(fire(&mut reveal, &mut host), Some(RevealStep::Advanced));
        assert_eq!(reveal.visible_text(), "a");
        assert_eq!(fire(&mut reveal, &mut host), Some(RevealStep::Advanced));
        assert_eq!(reveal.visible_text(), "a你");
        assert_eq!(fire(&mut reveal, &mut host), Some(RevealStep::Finished));
        assert_eq!(reveal.visible_text(), "a你c");
        assert!(!reveal.is_revealing());
        assert!(host.timers().is_empty());
    }

    #[test]
    fn test_empty_target_finishes_immediately() {
        let mut host = VirtualHost::new(1.0, 10.0);
        let mut reveal = RevealScheduler::new();
        assert_eq!(
            reveal.start(String::new(), TypingSpeed::Fast.delay(), &mut host),
            RevealStep::Finished
        );
        assert!(!reveal.is_revealing());
        assert!(host.timers().is_empty());
    }

    #[test]
    fn test_restart_cancels_pending_tick() {
        let mut host = VirtualHost::new(1.0, 10.0);
        let mut reveal = RevealScheduler::new();
        reveal.start("abc".to_string(), TypingSpeed::Fast.delay(), &mut host);
        let stale = host.timers().clone().pop_due(Duration::MAX).unwrap().handle;

        reveal.start("xy".to_string(), TypingSpeed::Fast.delay(), &mut host);
        assert_eq!(host.timers().len(), 1);
        assert_eq!(reveal.tick(stale, &mut host), None);
        assert_eq!(reveal.visible_text(), "");
    }

    #[test]
    fn test_stop_shows_everything() {
        let mut host = VirtualHost::new(1.0, 10.0);
        let mut reveal = RevealScheduler::new();
        reveal.start("abc".to_string(), TypingSpeed::Fast.delay(), &mut host);
        fire(&mut reveal, &mut host);
        assert!(reveal.stop(&mut host));
        assert_eq!(reveal.visible_text(), "abc");
        assert!(host.timers().is_empty());
        assert!(!reveal.stop(&mut host));
    }
}
