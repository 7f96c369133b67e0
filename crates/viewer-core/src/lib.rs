#![warn(missing_docs)]
//! Viewer Core - headless text analysis and viewport engine for code viewers
//!
//! # Overview
//!
//! `viewer-core` owns one text snapshot and everything derived from it: the line-start index, the
//! foldable regions, the classified spans, the search results, and the reveal animation state. It
//! draws nothing. A host surface implements [`Host`] to provide timers, scrolling, and line
//! geometry, and reads the derived state back to paint.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  CodeViewer facade + Host seam              │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Highlight / Reveal schedulers (timers)     │  ← Debounce & animation
//! ├─────────────────────────────────────────────┤
//! │  Viewport mapper    │  Search engine        │  ← On-demand queries
//! ├─────────────────────────────────────────────┤
//! │  Fold detector      │  Line index           │  ← Derived per mutation
//! ├─────────────────────────────────────────────┤
//! │  Pattern registry (viewer-highlight)        │  ← Classification
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Data Flow
//!
//! buffer mutation → line index rebuilt → folds re-detected → classification debounced → host
//! redraw. Search and viewport queries read the current state and never mutate the buffer.
//!
//! # Module Description
//!
//! - [`line_index`] - line-start offsets
//! - [`folding`] - delimiter-stack fold detection and fold state
//! - [`search`] - overlapping literal search with cyclic navigation
//! - [`highlight`] - debounced classification
//! - [`reveal`] - character-by-character reveal
//! - [`viewport`] - pixel ↔ line/offset mapping and hit testing
//! - [`host`] - the host trait, timer bookkeeping, and a virtual-clock host
//!
//! # Unicode Support
//!
//! - Every public offset is a character (Unicode scalar) offset
//! - Hit testing measures CJK double-width characters and snaps to grapheme clusters

mod config;
mod error;
pub mod folding;
pub mod highlight;
pub mod host;
pub mod line_index;
pub mod reveal;
pub mod search;
pub mod text;
mod viewer;
pub mod viewport;

pub use config::{DEFAULT_LANGUAGE, DEFAULT_LINE_NUMBER_PADDING, ViewerConfig};
pub use error::ViewerError;
pub use folding::{FoldRegion, FoldingManager, detect_regions};
pub use highlight::{DEFAULT_HIGHLIGHT_DELAY, HighlightScheduler};
pub use host::{Host, LineMetrics, Timer, TimerHandle, TimerKind, TimerQueue, VirtualHost};
pub use line_index::LineIndex;
pub use reveal::{RevealScheduler, RevealStep, TypingSpeed};
pub use search::{SearchMatch, SearchOptions, SearchState, find_all_overlapping};
pub use viewer::CodeViewer;
pub use viewport::{Hit, TextGeometry, ViewportRange, gutter_width, hit_test, line_at_y};

pub use viewer_highlight::{
    Category, LanguageId, LanguageProfile, PatternRegistry, Span, StyledRun, flatten_spans,
};
