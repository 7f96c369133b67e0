#![warn(missing_docs)]
//! `viewer-highlight` - regex pattern registry for the code viewer engine.
//!
//! # Overview
//!
//! A [`LanguageProfile`] is an immutable, ordered list of `category -> matcher` rules. Classifying
//! a text runs every rule over the whole text and emits one [`Span`] per match, rule by rule.
//! Spans of different categories may overlap; [`flatten_spans`] resolves them with
//! last-write-wins, which is what renderers consume.
//!
//! [`PatternRegistry::builtin`] compiles the tables for every built-in language once. Lookups by
//! an unknown identifier return an empty profile rather than failing.
//!
//! All offsets are character offsets.

mod error;
mod profile;
mod registry;
mod span;

pub use error::RegistryError;
pub use profile::{LanguageProfile, PatternRule, ProfileBuilder};
pub use registry::{PatternRegistry, builtin_profile};
pub use span::{CharIndex, Span, StyledRun, flatten_spans};
pub use viewer_lang::{Category, LanguageId};
