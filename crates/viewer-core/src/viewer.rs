//! The viewer facade: one owned state struct driven by host calls and host-delivered timers.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use viewer_core::{CodeViewer, VirtualHost, ViewerConfig};
//!
//! let mut host = VirtualHost::new(16.0, 480.0);
//! let mut viewer = CodeViewer::new(ViewerConfig::default()).unwrap();
//!
//! viewer.set_text("class A {\n  int x = 1;\n}", &mut host);
//! assert_eq!(viewer.line_index().line_count(), 3);
//!
//! // Classification is debounced.
//! assert!(viewer.spans().is_empty());
//! host.advance(&mut viewer, Duration::from_millis(100));
//! assert!(!viewer.spans().is_empty());
//! ```

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::folding::FoldingManager;
use crate::highlight::HighlightScheduler;
use crate::host::{Host, TimerHandle};
use crate::line_index::LineIndex;
use crate::reveal::{RevealScheduler, RevealStep};
use crate::search::{SearchOptions, SearchState};
use crate::viewport::{self, Hit, TextGeometry, ViewportRange};
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use viewer_highlight::{
    LanguageId, LanguageProfile, PatternRegistry, Span, StyledRun, flatten_spans,
};
use viewer_lang::LanguageConfig;

/// A code viewer: buffer snapshot plus every piece of state derived from it.
///
/// All mutation goes through `&mut self`, and every method that may schedule, cancel, scroll, or
/// repaint takes the host explicitly.
#[derive(Debug)]
pub struct CodeViewer {
    config: ViewerConfig,
    registry: Arc<PatternRegistry>,
    profile: Arc<LanguageProfile>,
    language_config: LanguageConfig,
    text: String,
    line_index: LineIndex,
    folds: FoldingManager,
    highlight: HighlightScheduler,
    reveal: RevealScheduler,
    search: Option<SearchState>,
    selected_line: Option<usize>,
    version: u64,
}

impl CodeViewer {
    /// Create a viewer with the built-in pattern tables.
    pub fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        let registry = PatternRegistry::builtin()?;
        Self::with_registry(config, Arc::new(registry))
    }

    /// Create a viewer sharing an existing registry.
    pub fn with_registry(
        config: ViewerConfig,
        registry: Arc<PatternRegistry>,
    ) -> Result<Self, ViewerError> {
        config.validate()?;
        let profile = registry.profile_for(&config.language);
        let language_config = LanguageConfig::for_language(profile.language());
        let highlight = HighlightScheduler::new(config.highlight_delay(), config.highlighting);
        Ok(Self {
            config,
            registry,
            profile,
            language_config,
            text: String::new(),
            line_index: LineIndex::new(),
            folds: FoldingManager::new(),
            highlight,
            reveal: RevealScheduler::new(),
            search: None,
            selected_line: None,
            version: 0,
        })
    }

    // Buffer

    /// Replace the buffer. Derived line and fold state is rebuilt before this returns;
    /// classification follows after the debounce delay.
    ///
    /// A reveal in progress is cancelled.
    pub fn set_text<H: Host + ?Sized>(&mut self, text: impl Into<String>, host: &mut H) {
        self.reveal.cancel(host);
        self.replace_buffer(text.into());
        self.highlight.request(host);
        host.request_redraw();
    }

    /// Show `text` the way the configuration asks: revealed if the typing animation is on,
    /// otherwise all at once and classified immediately.
    pub fn set_code<H: Host + ?Sized>(&mut self, text: impl Into<String>, host: &mut H) {
        if self.config.typing_animation {
            let delay = self.config.typing_delay();
            self.start_reveal(text, delay, host);
            return;
        }
        self.reveal.cancel(host);
        self.replace_buffer(text.into());
        self.highlight.cancel(host);
        self.highlight.run(&self.profile, &self.text);
        host.request_redraw();
    }

    fn replace_buffer(&mut self, text: String) {
        self.text = text;
        self.line_index = LineIndex::rebuild(&self.text);
        if self.config.folding {
            self.redetect_folds();
        }
        if let Some(line) = self.selected_line
            && line >= self.line_index.line_count()
        {
            self.selected_line = None;
        }
        self.version += 1;
    }

    fn redetect_folds(&mut self) {
        let lines: Vec<&str> = self.text.split('\n').collect();
        self.folds.redetect(&lines, &self.language_config);
        trace!(regions = self.folds.regions().len(), "folds detected");
    }

    /// The current buffer snapshot.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines of the buffer, without their newlines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Incremented on every buffer replacement.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The line-start index of the current buffer.
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// The configuration in effect (language and toggles track the setters).
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    // Classification

    /// Switch language. Spans and folds are recomputed immediately; unknown identifiers install
    /// the empty profile.
    pub fn set_language<H: Host + ?Sized>(&mut self, language: &str, host: &mut H) {
        self.profile = self.registry.profile_for(language);
        self.language_config = LanguageConfig::for_language(self.profile.language());
        self.config.language = language.to_string();
        debug!(
            requested = language,
            resolved = self.profile.language().map_or("none", LanguageId::name),
            "language switched"
        );

        self.highlight.cancel(host);
        self.highlight.clear();
        if !self.reveal.is_revealing() {
            self.highlight.run(&self.profile, &self.text);
        }
        if self.config.folding {
            self.redetect_folds();
        }
        host.request_redraw();
    }

    /// The active language, if the identifier resolved to one.
    pub fn language(&self) -> Option<LanguageId> {
        self.profile.language()
    }

    /// The active profile.
    pub fn profile(&self) -> &LanguageProfile {
        &self.profile
    }

    /// Turn classification on (runs immediately) or off (cancels and clears spans).
    pub fn set_highlighting_enabled<H: Host + ?Sized>(&mut self, enabled: bool, host: &mut H) {
        self.config.highlighting = enabled;
        self.highlight.set_enabled(enabled, host);
        if enabled && !self.reveal.is_revealing() {
            self.highlight.run(&self.profile, &self.text);
        }
        host.request_redraw();
    }

    /// Spans from the last classification run, grouped by rule in profile order.
    ///
    /// After a mutation these describe the previous buffer until the debounced run fires.
    pub fn spans(&self) -> &[Span] {
        self.highlight.spans()
    }

    /// Spans resolved into non-overlapping runs, clamped to the current buffer.
    pub fn styled_runs(&self) -> Vec<StyledRun> {
        flatten_spans(self.highlight.spans(), self.line_index.char_count())
    }

    /// Classify an arbitrary text with the active profile. Does not touch viewer state.
    pub fn spans_for(&self, text: &str) -> Vec<Span> {
        self.profile.classify(text)
    }

    /// Number of completed classification runs.
    pub fn highlight_generation(&self) -> u64 {
        self.highlight.generation()
    }

    /// Whether a debounced classification run is pending.
    pub fn is_highlight_pending(&self) -> bool {
        self.highlight.is_pending()
    }

    // Folding

    /// Turn folding on (re-detects) or off (drops regions and collapsed state).
    pub fn set_folding_enabled<H: Host + ?Sized>(&mut self, enabled: bool, host: &mut H) {
        self.config.folding = enabled;
        if enabled {
            self.redetect_folds();
        } else {
            self.folds.clear();
        }
        host.request_redraw();
    }

    /// Toggle the fold whose header is `line`. Returns `false` if folding is off or there is
    /// no such region.
    pub fn toggle_fold<H: Host + ?Sized>(&mut self, line: usize, host: &mut H) -> bool {
        if !self.config.folding || !self.folds.toggle(line) {
            return false;
        }
        host.request_redraw();
        true
    }

    /// Collapse every region.
    pub fn collapse_all_folds<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.folds.collapse_all();
        host.request_redraw();
    }

    /// Expand every region.
    pub fn expand_all_folds<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.folds.expand_all();
        host.request_redraw();
    }

    /// Fold regions and their collapsed state.
    pub fn folds(&self) -> &FoldingManager {
        &self.folds
    }

    // Search

    /// Search the buffer. Returns the match count; an empty query clears the search.
    ///
    /// With matches, the first one becomes current and the host is asked to scroll to it.
    pub fn search<H: Host + ?Sized>(&mut self, query: &str, host: &mut H) -> usize {
        if query.is_empty() {
            self.clear_search(host);
            return 0;
        }
        let options = SearchOptions {
            case_sensitive: self.config.case_sensitive_search,
        };
        let state = SearchState::new(&self.text, query, options);
        let count = state.match_count();
        debug!(query, count, "search");
        self.search = Some(state);
        self.reveal_current_match(host);
        count
    }

    /// Move to the next match, wrapping. Returns `false` if there are no matches.
    pub fn find_next<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let moved = self.search.as_mut().is_some_and(SearchState::next_match);
        if moved {
            self.reveal_current_match(host);
        }
        moved
    }

    /// Move to the previous match, wrapping. Returns `false` if there are no matches.
    pub fn find_previous<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let moved = self
            .search
            .as_mut()
            .is_some_and(SearchState::previous_match);
        if moved {
            self.reveal_current_match(host);
        }
        moved
    }

    fn reveal_current_match<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(range) = self.search_highlight() {
            host.scroll_to_offset(range.start);
        }
        host.request_redraw();
    }

    /// Drop the search state.
    pub fn clear_search<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.search.take().is_some() {
            host.request_redraw();
        }
    }

    /// The current search, if any.
    pub fn search_state(&self) -> Option<&SearchState> {
        self.search.as_ref()
    }

    /// Range of the current match, clamped to the buffer.
    pub fn search_highlight(&self) -> Option<Range<usize>> {
        self.search
            .as_ref()?
            .current_highlight(self.line_index.char_count())
    }

    // Viewport and pointer

    /// Lines intersecting the host's viewport right now.
    pub fn visible_line_range<H: Host + ?Sized>(&self, host: &H) -> ViewportRange {
        viewport::visible_line_range(host, self.line_index.line_count())
    }

    /// Gutter width for the current line count; 0 when line numbers are hidden.
    pub fn gutter_width(&self, digit_width: f32) -> f32 {
        if !self.config.show_line_numbers {
            return 0.0;
        }
        viewport::gutter_width(
            self.line_index.line_count(),
            digit_width,
            self.config.line_number_padding,
        )
    }

    /// Resolve a pointer position without changing state.
    pub fn hit_test<H: Host + ?Sized>(
        &self,
        x: f32,
        y: f32,
        geometry: &TextGeometry,
        host: &H,
    ) -> Hit {
        viewport::hit_test(host, &self.line_index, &self.text, geometry, x, y)
    }

    /// Handle a pointer release.
    ///
    /// In the gutter, toggles the fold starting at that line when there is one; otherwise (and
    /// anywhere in the text) selects the line.
    pub fn pointer_up<H: Host + ?Sized>(
        &mut self,
        x: f32,
        y: f32,
        geometry: &TextGeometry,
        host: &mut H,
    ) -> Hit {
        let hit = self.hit_test(x, y, geometry, host);
        if let Hit::Gutter { line } = hit
            && self.toggle_fold(line, host)
        {
            return hit;
        }
        self.selected_line = Some(hit.line());
        host.request_redraw();
        hit
    }

    /// The selected line, regardless of whether it is drawn.
    pub fn selected_line(&self) -> Option<usize> {
        self.selected_line
    }

    /// The selected line if selected-line highlighting is on.
    pub fn highlighted_line(&self) -> Option<usize> {
        self.selected_line
            .filter(|_| self.config.line_highlighting)
    }

    /// Turn selected-line highlighting on or off.
    pub fn set_line_highlighting_enabled<H: Host + ?Sized>(&mut self, enabled: bool, host: &mut H) {
        self.config.line_highlighting = enabled;
        host.request_redraw();
    }

    // Reveal

    /// Reveal `text` one character per `speed` tick, starting from an empty buffer.
    ///
    /// Restarts if a reveal is in progress. Classification is suppressed until the reveal
    /// finishes, then runs exactly once.
    pub fn start_reveal<H: Host + ?Sized>(
        &mut self,
        text: impl Into<String>,
        speed: impl Into<Duration>,
        host: &mut H,
    ) {
        let delay = speed.into();
        self.highlight.cancel(host);
        self.highlight.clear();
        let step = self.reveal.start(text.into(), delay, host);
        debug!(
            chars = self.reveal.target().chars().count(),
            delay_ms = delay.as_millis() as u64,
            "reveal started"
        );
        self.replace_buffer(String::new());
        if step == RevealStep::Finished {
            self.finish_reveal();
        }
        host.request_redraw();
    }

    /// Stop a reveal in progress and show the whole target. Returns `false` if idle.
    pub fn stop_reveal<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.reveal.stop(host) {
            return false;
        }
        self.replace_buffer(self.reveal.target().to_string());
        self.finish_reveal();
        host.request_redraw();
        true
    }

    fn finish_reveal(&mut self) {
        debug!(chars = self.line_index.char_count(), "reveal finished");
        self.highlight.run(&self.profile, &self.text);
    }

    /// Whether a reveal is in progress.
    pub fn is_revealing(&self) -> bool {
        self.reveal.is_revealing()
    }

    /// Number of characters revealed so far, while revealing.
    pub fn reveal_cursor(&self) -> Option<usize> {
        self.reveal.cursor()
    }

    // Timers and teardown

    /// Deliver an expired timer. Handles the viewer is not waiting for are ignored.
    pub fn on_timer<H: Host + ?Sized>(&mut self, handle: TimerHandle, host: &mut H) {
        if self.highlight.take_if_pending(handle) {
            if !self.reveal.is_revealing() {
                self.highlight.run(&self.profile, &self.text);
            }
            host.request_redraw();
            return;
        }

        if let Some(step) = self.reveal.tick(handle, host) {
            self.replace_buffer(self.reveal.visible_text().to_string());
            if step == RevealStep::Finished {
                self.finish_reveal();
            }
            host.request_redraw();
            return;
        }

        trace!(handle = handle.0, "stale timer ignored");
    }

    /// Cancel every pending timer. The viewer stays usable.
    pub fn detach<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.highlight.cancel(host);
        self.reveal.cancel(host);
    }
}
