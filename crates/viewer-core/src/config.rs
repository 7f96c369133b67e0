//! Viewer configuration.

use crate::error::ViewerError;
use crate::highlight::DEFAULT_HIGHLIGHT_DELAY;
use crate::reveal::TypingSpeed;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default language identifier.
pub const DEFAULT_LANGUAGE: &str = "java";

/// Default gutter padding on each side of the line numbers, in host pixels.
pub const DEFAULT_LINE_NUMBER_PADDING: f32 = 10.0;

/// Everything a host can tune on a [`CodeViewer`](crate::CodeViewer).
///
/// Missing fields take their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Language identifier or alias; unknown identifiers disable classification.
    pub language: String,
    /// Syntax classification on/off.
    pub highlighting: bool,
    /// Fold detection on/off.
    pub folding: bool,
    /// Selected-line highlighting on/off.
    pub line_highlighting: bool,
    /// Whether the host draws a line-number gutter.
    pub show_line_numbers: bool,
    /// Gutter padding on each side of the line numbers.
    pub line_number_padding: f32,
    /// Debounce delay between a mutation and re-classification.
    pub highlight_debounce_ms: u64,
    /// Whether [`CodeViewer::set_code`](crate::CodeViewer::set_code) animates.
    pub typing_animation: bool,
    /// Delay per revealed character.
    pub typing_speed_ms: u64,
    /// Case sensitivity of searches.
    pub case_sensitive_search: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            highlighting: true,
            folding: true,
            line_highlighting: true,
            show_line_numbers: true,
            line_number_padding: DEFAULT_LINE_NUMBER_PADDING,
            highlight_debounce_ms: DEFAULT_HIGHLIGHT_DELAY.as_millis() as u64,
            typing_animation: false,
            typing_speed_ms: TypingSpeed::default().millis(),
            case_sensitive_search: true,
        }
    }
}

impl ViewerConfig {
    /// Debounce delay as a [`Duration`].
    pub fn highlight_delay(&self) -> Duration {
        Duration::from_millis(self.highlight_debounce_ms)
    }

    /// Reveal delay per character as a [`Duration`].
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_speed_ms)
    }

    /// Use a preset typing speed.
    pub fn with_typing_speed(mut self, speed: TypingSpeed) -> Self {
        self.typing_speed_ms = speed.millis();
        self
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.typing_speed_ms == 0 {
            return Err(ViewerError::InvalidConfig {
                field: "typing_speed_ms",
                message: "must be at least 1".to_string(),
            });
        }
        if !self.line_number_padding.is_finite() || self.line_number_padding < 0.0 {
            return Err(ViewerError::InvalidConfig {
                field: "line_number_padding",
                message: format!("must be a non-negative number, got {}", self.line_number_padding),
            });
        }
        Ok(())
    }
}
